//! Gluon is a small teaching file system over a simulated sector disk.
//! No permissions, timestamps, or indirect blocks; every file has at most 30 data sectors.
//!
//! Gluon's on-disk layout:
//! - Sector 0: Free map file header
//! - Sector 1: Root directory file header
//! - Sector 2: Current directory record file header
//! - Remaining sectors: handed out by the free map to headers and data
//!
//! Gluon's layers (from bottom to top):
//! 1. Block Device: Raw sector storage.                        | User implemented (`FileDisk` and `RamDisk` provided)
//! 2. SynchDisk: One request at a time, panics on device errors.| Fs implemented
//! 3. BitMap/FileHeader: Sector allocation and file layout.     | Fs implemented
//! 4. OpenFile: Byte streams over a header's sectors.           | Fs implemented
//! 5. Directory/Path: Fixed tables of named entries.            | Fs implemented
//! 6. FileSystem: Create, open, remove, change directory.       | Callers serialize access (`&mut self`)

#![allow(unused)]

extern crate alloc;

mod config;
mod block_dev;
mod synch_disk;
mod disk;
mod structs;
mod bitmap;
mod header;
mod file;
mod directory;
mod cur_dir;
pub mod path;
mod fs;
mod error;

pub use block_dev::BlockDevice;
pub use synch_disk::{DiskStats, SynchDisk};
pub use disk::{FileDisk, RamDisk};
pub use config::*;
pub use structs::*;
pub use bitmap::BitMap;
pub use file::OpenFile;
pub use directory::Directory;
pub use fs::FileSystem;
pub use error::FsError as Error;
pub use error::Result;
