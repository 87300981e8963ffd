//! Synchronous access to a block device.
//!
//! The device accepts a single request at a time. A request holds the disk lock
//! from the moment it is issued until the device reports completion, so callers
//! on different threads are served one after another and each one only returns
//! once its own sector transfer is done.

use core::sync::atomic::{AtomicU64, Ordering};

use log::trace;
use spin::{Mutex, MutexGuard};

use crate::config::SECTOR_SIZE;
use crate::BlockDevice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStats {
    pub reads: u64,
    pub writes: u64,
}

pub struct SynchDisk<D: BlockDevice> {
    device: Mutex<D>,
    num_sectors: usize,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl<D: BlockDevice> SynchDisk<D> {
    pub fn new(device: D) -> Self {
        let num_sectors = device.num_sectors();
        Self {
            device: Mutex::new(device),
            num_sectors,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    pub fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    /// Reads a sector, returning only once the data has been transferred.
    /// Out-of-range sectors and device failures are fatal.
    pub fn read_sector(&self, sector: u32, buf: &mut [u8; SECTOR_SIZE]) {
        assert!((sector as usize) < self.num_sectors, "read of sector {} out of range", sector);
        let device = self.device.lock();
        trace!("reading sector {}", sector);
        if let Err(e) = device.read_sector(sector, buf) {
            panic!("disk read of sector {} failed: {}", sector, e);
        }
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Writes a sector, returning only once the data has been transferred.
    pub fn write_sector(&self, sector: u32, buf: &[u8; SECTOR_SIZE]) {
        assert!((sector as usize) < self.num_sectors, "write of sector {} out of range", sector);
        let device = self.device.lock();
        trace!("writing sector {}", sector);
        if let Err(e) = device.write_sector(sector, buf) {
            panic!("disk write of sector {} failed: {}", sector, e);
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush(&self) {
        if let Err(e) = self.device.lock().flush() {
            panic!("disk flush failed: {}", e);
        }
    }

    pub fn stats(&self) -> DiskStats {
        DiskStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }

    /// Locks the device for direct inspection. No request can be issued while the guard lives.
    pub fn device(&self) -> MutexGuard<'_, D> {
        self.device.lock()
    }

    pub fn into_inner(self) -> D {
        self.device.into_inner()
    }
}
