//! File header management: allocating and releasing a file's data sectors and
//! moving the header between memory and its sector.
//!
//! Every file has exactly one header, stored in a sector of its own. The header
//! maps each `SECTOR_SIZE` chunk of the file to a data sector through a table of
//! `NUM_DIRECT` direct pointers. There are no indirect blocks, which caps every file
//! at `MAX_FILE_SIZE` bytes.

use core::fmt::Write;

use log::debug;

use crate::config::*;
use crate::structs::FileHeader;
use crate::synch_disk::SynchDisk;
use crate::{BitMap, BlockDevice, Error, Result};

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHeader {
    /// An empty header with no data sectors.
    pub const fn new() -> Self {
        Self {
            num_bytes: 0,
            num_sectors: 0,
            data_sectors: [0; NUM_DIRECT],
        }
    }

    /// Initializes a fresh header for a file of `file_size` bytes, claiming its data
    /// sectors from `free_map` in ascending order.
    pub fn allocate(&mut self, free_map: &mut BitMap, file_size: usize) -> Result<()> {
        let num_sectors = file_size.div_ceil(SECTOR_SIZE);
        if num_sectors > NUM_DIRECT {
            return Err(Error::FileTooLarge);
        }
        if free_map.num_clear() < num_sectors {
            return Err(Error::OutOfSpace);
        }

        self.num_bytes = file_size as i32;
        self.num_sectors = num_sectors as i32;
        for slot in self.data_sectors.iter_mut().take(num_sectors) {
            // Enough clear bits were counted above.
            *slot = free_map.find().ok_or(Error::OutOfSpace)? as i32;
        }
        Ok(())
    }

    /// Grows a file of `file_size` bytes by `increment` bytes.
    ///
    /// The space left in the last sector is taken to be `SECTOR_SIZE - (offset + 1)`,
    /// which always keeps one byte of slack: growing to exactly fill a sector claims
    /// a further sector. Neither the header nor `free_map` is modified unless the
    /// growth succeeds.
    pub fn allocate_incremental(
        &mut self,
        free_map: &mut BitMap,
        file_size: usize,
        increment: usize,
    ) -> Result<()> {
        if self.num_sectors > MAX_FILE_SECTORS {
            return Err(Error::FileTooLarge);
        }

        let sector_size = SECTOR_SIZE as i64;
        let old_sectors = self.num_sectors as i64;
        // Appending to an empty file needs its first sector before anything else.
        let first = i64::from(file_size == 0 && increment > 0 && old_sectors == 0);
        let num_sectors = old_sectors + first;

        let size = file_size as i64;
        let offset = size % sector_size;
        let overflow = increment as i64 - (sector_size - (offset + 1));
        let mut more_sectors = if overflow <= 0 {
            0
        } else {
            (overflow + sector_size - 1) / sector_size
        };
        // A full last sector has no spare room at all.
        let needed = (size + increment as i64 + sector_size - 1) / sector_size - num_sectors;
        more_sectors = more_sectors.max(needed);

        if num_sectors + more_sectors > MAX_FILE_SECTORS as i64 {
            debug!(
                "growing by {} sectors exceeds the direct sector limit",
                first + more_sectors
            );
            return Err(Error::FileTooLarge);
        }
        if (free_map.num_clear() as i64) < first + more_sectors {
            return Err(Error::OutOfSpace);
        }
        let mut data_sectors = self.data_sectors;
        for i in old_sectors..num_sectors + more_sectors {
            data_sectors[i as usize] = free_map.find().ok_or(Error::OutOfSpace)? as i32;
        }

        self.num_bytes = (size + increment as i64) as i32;
        self.num_sectors = (num_sectors + more_sectors) as i32;
        self.data_sectors = data_sectors;
        Ok(())
    }

    /// Returns every data sector to `free_map`.
    /// A data sector that is not marked means the map is corrupt.
    pub fn deallocate(&self, free_map: &mut BitMap) {
        for &sector in self.sectors() {
            assert!(free_map.test(sector as u32), "data sector {} ought to be marked", sector);
            free_map.clear(sector as u32);
        }
    }

    pub fn fetch_from<D: BlockDevice>(&mut self, disk: &SynchDisk<D>, sector: u32) {
        let mut buf = [0u8; SECTOR_SIZE];
        disk.read_sector(sector, &mut buf);
        *self = unsafe { core::ptr::read_unaligned(buf.as_ptr() as *const FileHeader) };
    }

    pub fn write_back<D: BlockDevice>(&self, disk: &SynchDisk<D>, sector: u32) {
        let mut buf = [0u8; SECTOR_SIZE];
        unsafe {
            core::ptr::write_unaligned(buf.as_mut_ptr() as *mut FileHeader, *self);
        }
        disk.write_sector(sector, &buf);
    }

    /// Reads the header stored at `sector`.
    pub fn read<D: BlockDevice>(disk: &SynchDisk<D>, sector: u32) -> Self {
        let mut hdr = Self::new();
        hdr.fetch_from(disk, sector);
        hdr
    }

    /// Translates a byte offset within the file to the sector holding it.
    pub fn byte_to_sector(&self, offset: usize) -> u32 {
        let index = offset / SECTOR_SIZE;
        assert!(
            index < self.num_sectors.max(0) as usize,
            "offset {} is past the file's {} sectors",
            offset,
            self.num_sectors
        );
        self.data_sectors[index] as u32
    }

    pub fn file_length(&self) -> usize {
        self.num_bytes.max(0) as usize
    }

    pub fn num_sectors(&self) -> usize {
        self.num_sectors.clamp(0, MAX_FILE_SECTORS) as usize
    }

    /// The data sectors currently in use, in file order.
    pub fn sectors(&self) -> &[i32] {
        &self.data_sectors[..self.num_sectors()]
    }

    /// Renders the header and the file's contents. Unprintable bytes appear as `\xx`.
    pub fn dump<D: BlockDevice>(&self, disk: &SynchDisk<D>) -> String {
        let mut out = String::new();
        let _ = write!(out, "FileHeader contents.  File size: {}.  File blocks:\n", self.num_bytes);
        for sector in self.sectors() {
            let _ = write!(out, "{} ", sector);
        }
        out.push_str("\nFile contents:\n");

        let mut remaining = self.file_length();
        let mut data = [0u8; SECTOR_SIZE];
        for &sector in self.sectors() {
            disk.read_sector(sector as u32, &mut data);
            for &byte in data.iter().take(remaining.min(SECTOR_SIZE)) {
                if (0x20..=0x7e).contains(&byte) {
                    out.push(byte as char);
                } else {
                    let _ = write!(out, "\\{:x}", byte);
                }
            }
            remaining = remaining.saturating_sub(SECTOR_SIZE);
            out.push('\n');
        }
        out
    }
}
