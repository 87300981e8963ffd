use crate::config::SECTOR_SIZE;
use crate::error::Result;

pub trait BlockDevice: Send + Sync {
    /// Returns the number of sectors on the device.
    fn num_sectors(&self) -> usize;

    /// Reads one whole sector into `buf`.
    fn read_sector(&self, sector: u32, buf: &mut [u8; SECTOR_SIZE]) -> Result<()>;

    /// Writes one whole sector from `buf`.
    fn write_sector(&self, sector: u32, buf: &[u8; SECTOR_SIZE]) -> Result<()>;

    /// Flushes anything the device buffers so that completed writes are persisted.
    fn flush(&self) -> Result<()>;
}
