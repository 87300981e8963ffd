pub const SECTOR_SIZE: usize = 128;
pub const SECTORS_PER_TRACK: usize = 32;
pub const NUM_TRACKS: usize = 32;
pub const NUM_SECTORS: usize = SECTORS_PER_TRACK * NUM_TRACKS;

// Placed in front of a disk image file so that an arbitrary host file is not mistaken for a disk.
pub const DISK_MAGIC: u32 = 0x456789ab;
pub const DISK_MAGIC_SIZE: usize = 4;

pub const NUM_DIRECT: usize = 30; // Direct sector pointers in a file header, no indirection
pub const MAX_FILE_SECTORS: i32 = NUM_DIRECT as i32;
pub const MAX_FILE_SIZE: usize = NUM_DIRECT * SECTOR_SIZE;

pub const FILE_NAME_MAX_LEN: usize = 9;
pub const FILE_PATH_MAX_LEN: usize = 40;
pub const PATH_SEPARATOR: char = '/';
pub const ROOT_PATH: &str = "/";

// Well-known header sectors, located without a directory lookup.
pub const FREE_MAP_SECTOR: u32 = 0;
pub const DIRECTORY_SECTOR: u32 = 1;
pub const CUR_DIR_SECTOR: u32 = 2;

pub const NUM_DIR_ENTRIES: usize = 10;
pub const DIR_ENTRY_SIZE: usize = core::mem::size_of::<crate::structs::DirectoryEntry>();
pub const FREE_MAP_FILE_SIZE: usize = crate::bitmap::BitMap::file_size(NUM_SECTORS);
pub const DIRECTORY_FILE_SIZE: usize = DIR_ENTRY_SIZE * NUM_DIR_ENTRIES;
pub const CUR_DIR_FILE_SIZE: usize = core::mem::size_of::<crate::structs::CurDirRecord>();
