//! Open files: random-access byte streams over a file header's sectors.
//!
//! An `OpenFile` never changes the size of its file. Reads and writes are clamped to
//! the current length; growing a file goes through `FileSystem::extend`, which owns
//! the free map.

use alloc::sync::Arc;

use log::trace;

use crate::config::SECTOR_SIZE;
use crate::structs::FileHeader;
use crate::synch_disk::SynchDisk;
use crate::BlockDevice;

pub struct OpenFile<D: BlockDevice> {
    disk: Arc<SynchDisk<D>>,
    hdr: FileHeader,
    sector: u32,
    seek_position: usize,
}

impl<D: BlockDevice> OpenFile<D> {
    /// Opens the file whose header lives at `sector`, bringing the header into memory.
    pub fn new(disk: Arc<SynchDisk<D>>, sector: u32) -> Self {
        let hdr = FileHeader::read(&disk, sector);
        Self {
            disk,
            hdr,
            sector,
            seek_position: 0,
        }
    }

    pub fn seek(&mut self, position: usize) {
        self.seek_position = position;
    }

    pub fn position(&self) -> usize {
        self.seek_position
    }

    /// Reads from the current position and advances it by the number of bytes read.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let result = self.read_at(buf, self.seek_position);
        self.seek_position += result;
        result
    }

    /// Writes at the current position and advances it by the number of bytes written.
    pub fn write(&mut self, buf: &[u8]) -> usize {
        let result = self.write_at(buf, self.seek_position);
        self.seek_position += result;
        result
    }

    /// Reads up to `buf.len()` bytes starting at `position`.
    /// Returns the number of bytes actually read, which is short only at end of file.
    pub fn read_at(&self, buf: &mut [u8], position: usize) -> usize {
        let file_length = self.hdr.file_length();
        if buf.is_empty() || position >= file_length {
            return 0;
        }
        let num_bytes = buf.len().min(file_length - position);
        trace!("reading {} bytes at {} from file at sector {}", num_bytes, position, self.sector);

        let first_sector = position / SECTOR_SIZE;
        let last_sector = (position + num_bytes - 1) / SECTOR_SIZE;
        let mut sector_buf = [0u8; SECTOR_SIZE];
        let mut copied = 0;
        for i in first_sector..=last_sector {
            self.disk.read_sector(self.hdr.byte_to_sector(i * SECTOR_SIZE), &mut sector_buf);
            let start = if i == first_sector { position % SECTOR_SIZE } else { 0 };
            let len = (SECTOR_SIZE - start).min(num_bytes - copied);
            buf[copied..copied + len].copy_from_slice(&sector_buf[start..start + len]);
            copied += len;
        }
        num_bytes
    }

    /// Writes up to `buf.len()` bytes starting at `position`, never past the end of file.
    /// Partially covered sectors are read first so their other bytes survive.
    pub fn write_at(&self, buf: &[u8], position: usize) -> usize {
        let file_length = self.hdr.file_length();
        if buf.is_empty() || position >= file_length {
            return 0;
        }
        let num_bytes = buf.len().min(file_length - position);
        trace!("writing {} bytes at {} to file at sector {}", num_bytes, position, self.sector);

        let first_sector = position / SECTOR_SIZE;
        let last_sector = (position + num_bytes - 1) / SECTOR_SIZE;
        let mut sector_buf = [0u8; SECTOR_SIZE];
        let mut copied = 0;
        for i in first_sector..=last_sector {
            let sector = self.hdr.byte_to_sector(i * SECTOR_SIZE);
            let start = if i == first_sector { position % SECTOR_SIZE } else { 0 };
            let len = (SECTOR_SIZE - start).min(num_bytes - copied);
            if len < SECTOR_SIZE {
                self.disk.read_sector(sector, &mut sector_buf);
            }
            sector_buf[start..start + len].copy_from_slice(&buf[copied..copied + len]);
            self.disk.write_sector(sector, &sector_buf);
            copied += len;
        }
        num_bytes
    }

    pub fn length(&self) -> usize {
        self.hdr.file_length()
    }

    /// Sector holding this file's header.
    pub fn sector(&self) -> u32 {
        self.sector
    }

    pub fn header(&self) -> &FileHeader {
        &self.hdr
    }

    /// Re-reads the header, picking up changes written through another handle.
    pub fn reload(&mut self) {
        self.hdr.fetch_from(&self.disk, self.sector);
    }

    pub(crate) fn disk(&self) -> &Arc<SynchDisk<D>> {
        &self.disk
    }
}
