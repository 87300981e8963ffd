//! Concrete block devices: a disk image backed by a host file, and a RAM disk.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use log::debug;

use crate::config::*;
use crate::{BlockDevice, Error, Result};

/// A disk image stored in a host file.
/// The file starts with `DISK_MAGIC`, followed by the sectors in order.
pub struct FileDisk {
    inner: Mutex<File>,
    num_sectors: usize,
}

impl FileDisk {
    /// Opens the image at `path`, creating a zero-filled one if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let num_sectors = NUM_SECTORS;
        let disk_size = (DISK_MAGIC_SIZE + num_sectors * SECTOR_SIZE) as u64;

        if path.exists() {
            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .map_err(|_| Error::IoError)?;
            let mut magic = [0u8; DISK_MAGIC_SIZE];
            file.read_exact(&mut magic).map_err(|_| Error::InvalidDisk)?;
            if u32::from_ne_bytes(magic) != DISK_MAGIC {
                return Err(Error::InvalidDisk);
            }
            let len = file.metadata().map_err(|_| Error::IoError)?.len();
            if len < disk_size {
                return Err(Error::InvalidDisk);
            }
            debug!("opened disk image {}", path.display());
            Ok(Self { inner: Mutex::new(file), num_sectors })
        } else {
            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .map_err(|_| Error::IoError)?;
            file.write_all(&DISK_MAGIC.to_ne_bytes()).map_err(|_| Error::WriteError)?;
            file.set_len(disk_size).map_err(|_| Error::IoError)?;
            debug!("created disk image {}", path.display());
            Ok(Self { inner: Mutex::new(file), num_sectors })
        }
    }

    fn offset_of(sector: u32) -> u64 {
        (DISK_MAGIC_SIZE + sector as usize * SECTOR_SIZE) as u64
    }
}

impl BlockDevice for FileDisk {
    fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    fn read_sector(&self, sector: u32, buf: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        if sector as usize >= self.num_sectors {
            return Err(Error::InvalidSector);
        }
        let mut file = self.inner.lock().map_err(|_| Error::IoError)?;
        file.seek(SeekFrom::Start(Self::offset_of(sector))).map_err(|_| Error::IoError)?;
        file.read_exact(buf).map_err(|_| Error::ReadError)
    }

    fn write_sector(&self, sector: u32, buf: &[u8; SECTOR_SIZE]) -> Result<()> {
        if sector as usize >= self.num_sectors {
            return Err(Error::InvalidSector);
        }
        let mut file = self.inner.lock().map_err(|_| Error::IoError)?;
        file.seek(SeekFrom::Start(Self::offset_of(sector))).map_err(|_| Error::IoError)?;
        file.write_all(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&self) -> Result<()> {
        let mut file = self.inner.lock().map_err(|_| Error::IoError)?;
        file.flush().map_err(|_| Error::IoError)?;
        file.sync_data().map_err(|_| Error::IoError)
    }
}

pub struct RamDisk {
    inner: Mutex<Vec<u8>>,
    num_sectors: usize,
}

impl RamDisk {
    /// Creates a zeroed RAM disk with the specified number of sectors.
    pub fn new(num_sectors: usize) -> Self {
        Self {
            inner: Mutex::new(vec![0u8; num_sectors * SECTOR_SIZE]),
            num_sectors,
        }
    }

    /// Copy of the raw sector contents, for comparing disk states.
    pub fn snapshot(&self) -> Vec<u8> {
        match self.inner.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for RamDisk {
    fn default() -> Self {
        Self::new(NUM_SECTORS)
    }
}

impl BlockDevice for RamDisk {
    fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    fn read_sector(&self, sector: u32, buf: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        if sector as usize >= self.num_sectors {
            return Err(Error::InvalidSector);
        }
        let start = sector as usize * SECTOR_SIZE;
        let data = self.inner.lock().map_err(|_| Error::IoError)?;
        buf.copy_from_slice(&data[start..start + SECTOR_SIZE]);
        Ok(())
    }

    fn write_sector(&self, sector: u32, buf: &[u8; SECTOR_SIZE]) -> Result<()> {
        if sector as usize >= self.num_sectors {
            return Err(Error::InvalidSector);
        }
        let start = sector as usize * SECTOR_SIZE;
        let mut data = self.inner.lock().map_err(|_| Error::IoError)?;
        data[start..start + SECTOR_SIZE].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Nothing is buffered in a RAM disk.
        Ok(())
    }
}
