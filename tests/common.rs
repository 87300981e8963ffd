//! Common utilities for tests

#![allow(unused)]

use std::sync::Arc;

use gluon::{FileSystem, RamDisk, SynchDisk};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

/// Sectors still free right after a format: three header sectors, one for the free map,
/// six for the root table, and one for the current directory record are taken.
pub const FREE_AFTER_FORMAT: usize = gluon::NUM_SECTORS - 11;

/// A freshly formatted file system on a ram disk.
pub fn fresh_fs() -> (Arc<SynchDisk<RamDisk>>, FileSystem<RamDisk>) {
    let disk = Arc::new(SynchDisk::new(RamDisk::default()));
    let fs = FileSystem::format(Arc::clone(&disk)).unwrap();
    (disk, fs)
}

pub fn snapshot(disk: &SynchDisk<RamDisk>) -> Vec<u8> {
    disk.device().snapshot()
}

pub fn read_all(file: &gluon::OpenFile<RamDisk>) -> Vec<u8> {
    let mut buf = vec![0u8; file.length()];
    assert_eq!(file.read_at(&mut buf, 0), file.length());
    buf
}
