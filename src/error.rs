use core::fmt;

/// Recoverable failures. Corruption of on-disk invariants is not represented here,
/// it panics instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    IoError,
    ReadError,
    WriteError,
    InvalidDisk,
    InvalidSector,
    NotFormatted,
    OutOfSpace,
    DirectoryFull,
    FileTooLarge,
    NotFound,
    AlreadyExists,
    NotDirectory,
    NotEmpty,
    InvalidFileName,
    InvalidPath,
    PathTooLong,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FsError::IoError => "i/o error",
            FsError::ReadError => "short read from device",
            FsError::WriteError => "short write to device",
            FsError::InvalidDisk => "not a disk image",
            FsError::InvalidSector => "sector out of range",
            FsError::NotFormatted => "disk is not formatted",
            FsError::OutOfSpace => "no free sectors",
            FsError::DirectoryFull => "directory is full",
            FsError::FileTooLarge => "file would exceed the direct sector limit",
            FsError::NotFound => "no such file or directory",
            FsError::AlreadyExists => "file exists",
            FsError::NotDirectory => "not a directory",
            FsError::NotEmpty => "directory not empty",
            FsError::InvalidFileName => "invalid file name",
            FsError::InvalidPath => "invalid path",
            FsError::PathTooLong => "path too long",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for FsError {}

pub type Result<T> = core::result::Result<T, FsError>;
