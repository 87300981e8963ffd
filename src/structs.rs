//! On-disk records. All fields are plain integers or bytes, so any bit pattern read
//! back from a sector is a valid value.

use crate::config::*;

/// Inode analogue: where on disk the file's data lives.
/// Sized to fill exactly one sector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub num_bytes: i32,                 // Length of the file in bytes
    pub num_sectors: i32,               // Number of data sectors in use
    pub data_sectors: [i32; NUM_DIRECT], // Sector number of each data block
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory = 0,
    File = 1,
}

impl EntryKind {
    pub fn from_raw(raw: i32) -> Self {
        if raw == EntryKind::Directory as i32 {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub in_use: i32,
    pub sector: i32,                          // Sector holding this entry's file header
    pub name: [u8; FILE_NAME_MAX_LEN + 1],    // NUL terminated
    pub kind: i32,                            // Raw `EntryKind`
    pub path: [u8; FILE_PATH_MAX_LEN + 1],    // Absolute path, NUL terminated
}

/// Working directory: the sector of its header and its absolute path.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurDirRecord {
    pub sector: i32,
    pub path: [u8; FILE_PATH_MAX_LEN],
}

const _: () = assert!(core::mem::size_of::<FileHeader>() == SECTOR_SIZE);
const _: () = assert!(core::mem::size_of::<DirectoryEntry>() == 68);
const _: () = assert!(core::mem::size_of::<CurDirRecord>() == 44);

/// Copies `src` into a fixed NUL padded buffer, truncating if needed.
pub(crate) fn fill_bytes<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut arr = [0u8; N];
    let len = src.len().min(N);
    arr[..len].copy_from_slice(&src[..len]);
    arr
}

/// The bytes of a NUL terminated field, up to the first NUL.
pub(crate) fn trim_zero(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&c| c == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

impl DirectoryEntry {
    pub const NULL: Self = Self {
        in_use: 0,
        sector: 0,
        name: [0; FILE_NAME_MAX_LEN + 1],
        kind: EntryKind::File as i32,
        path: [0; FILE_PATH_MAX_LEN + 1],
    };

    pub fn is_in_use(&self) -> bool {
        self.in_use != 0
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_raw(self.kind)
    }

    pub fn name(&self) -> String {
        String::from_utf8_lossy(trim_zero(&self.name)).into_owned()
    }

    pub fn path(&self) -> String {
        String::from_utf8_lossy(trim_zero(&self.path)).into_owned()
    }

    /// Compares at most `FILE_NAME_MAX_LEN` bytes, like the fixed-width name field does.
    pub fn name_eq(&self, name: &[u8]) -> bool {
        let stored = trim_zero(&self.name[..FILE_NAME_MAX_LEN]);
        let query = trim_zero(&name[..name.len().min(FILE_NAME_MAX_LEN)]);
        stored == query
    }
}

impl CurDirRecord {
    pub fn root() -> Self {
        Self {
            sector: DIRECTORY_SECTOR as i32,
            path: fill_bytes(ROOT_PATH.as_bytes()),
        }
    }

    pub fn new(sector: u32, path: &str) -> Self {
        Self {
            sector: sector as i32,
            path: fill_bytes(path.as_bytes()),
        }
    }

    pub fn path(&self) -> String {
        String::from_utf8_lossy(trim_zero(&self.path)).into_owned()
    }
}
