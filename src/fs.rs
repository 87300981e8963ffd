use alloc::sync::Arc;

use log::debug;

use crate::config::*;
use crate::structs::*;
use crate::synch_disk::{DiskStats, SynchDisk};
use crate::{path, BitMap, BlockDevice, Directory, Error, OpenFile, Result};

/// A mounted file system.
///
/// The free map, the root directory and the current directory record are files
/// whose headers sit in well-known sectors. They stay open for as long as the file
/// system is mounted, together with a stream onto the current directory's table.
///
/// Operations that change the directory tree or the free map work on in-memory
/// copies and write them back only once every step has succeeded; on failure the
/// copies are dropped and the disk is left as it was.
pub struct FileSystem<D: BlockDevice> {
    disk: Arc<SynchDisk<D>>,
    free_map_file: OpenFile<D>,
    directory_file: OpenFile<D>,
    cur_dir_file: OpenFile<D>,
    cur_directory_file: OpenFile<D>,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Lays out an empty file system: a free map, an empty root directory, and a
    /// current directory record pointing at the root.
    pub fn format(disk: Arc<SynchDisk<D>>) -> Result<Self> {
        if disk.num_sectors() < NUM_SECTORS {
            return Err(Error::InvalidDisk);
        }
        debug!("formatting the file system");

        let mut free_map = BitMap::new(NUM_SECTORS);
        let directory = Directory::new(NUM_DIR_ENTRIES);
        let mut map_hdr = FileHeader::new();
        let mut dir_hdr = FileHeader::new();
        let mut cur_dir_hdr = FileHeader::new();

        // Claim the header sectors first so nothing else grabs them.
        free_map.mark(FREE_MAP_SECTOR);
        free_map.mark(DIRECTORY_SECTOR);
        free_map.mark(CUR_DIR_SECTOR);

        map_hdr.allocate(&mut free_map, FREE_MAP_FILE_SIZE)?;
        dir_hdr.allocate(&mut free_map, DIRECTORY_FILE_SIZE)?;
        cur_dir_hdr.allocate(&mut free_map, CUR_DIR_FILE_SIZE)?;

        // Headers must be on disk before the files can be opened.
        map_hdr.write_back(&disk, FREE_MAP_SECTOR);
        dir_hdr.write_back(&disk, DIRECTORY_SECTOR);
        cur_dir_hdr.write_back(&disk, CUR_DIR_SECTOR);

        let free_map_file = OpenFile::new(Arc::clone(&disk), FREE_MAP_SECTOR);
        let directory_file = OpenFile::new(Arc::clone(&disk), DIRECTORY_SECTOR);
        let cur_dir_file = OpenFile::new(Arc::clone(&disk), CUR_DIR_SECTOR);

        free_map.write_back(&free_map_file);
        directory.write_back(&directory_file);
        let cur_dir = CurDirRecord::root();
        cur_dir.write_back(&cur_dir_file);
        let cur_directory_file = OpenFile::new(Arc::clone(&disk), cur_dir.sector as u32);

        debug!("{}", free_map);
        Ok(Self {
            disk,
            free_map_file,
            directory_file,
            cur_dir_file,
            cur_directory_file,
        })
    }

    /// Opens the well-known files of an already formatted disk and restores the
    /// current directory from its record.
    pub fn mount(disk: Arc<SynchDisk<D>>) -> Result<Self> {
        if disk.num_sectors() < NUM_SECTORS {
            return Err(Error::InvalidDisk);
        }
        let free_map_file = OpenFile::new(Arc::clone(&disk), FREE_MAP_SECTOR);
        let directory_file = OpenFile::new(Arc::clone(&disk), DIRECTORY_SECTOR);
        let cur_dir_file = OpenFile::new(Arc::clone(&disk), CUR_DIR_SECTOR);
        if free_map_file.length() != FREE_MAP_FILE_SIZE
            || directory_file.length() != DIRECTORY_FILE_SIZE
            || cur_dir_file.length() != CUR_DIR_FILE_SIZE
        {
            return Err(Error::NotFormatted);
        }

        let cur_dir = CurDirRecord::read_from(&cur_dir_file);
        if cur_dir.sector < 0 || cur_dir.sector as usize >= NUM_SECTORS {
            return Err(Error::NotFormatted);
        }
        debug!("mounted, current directory {}", cur_dir.path());
        let cur_directory_file = OpenFile::new(Arc::clone(&disk), cur_dir.sector as u32);

        Ok(Self {
            disk,
            free_map_file,
            directory_file,
            cur_dir_file,
            cur_directory_file,
        })
    }

    /// Flushes the device and releases the well-known files.
    pub fn unmount(self) {
        self.disk.flush();
    }

    /// Finds the directory that holds the last component of `path`.
    /// Returns the sector of that directory's header and the final name.
    fn resolve<'p>(&self, path: &'p str) -> Result<(u32, &'p str)> {
        let (parents, name) = path::split(path)?;
        let (mut sector, mut directory) = if path::is_absolute(path) {
            (DIRECTORY_SECTOR, Directory::read_from(&self.directory_file))
        } else {
            (
                self.cur_directory_file.sector(),
                Directory::read_from(&self.cur_directory_file),
            )
        };

        for component in parents {
            sector = match (directory.find(component), directory.get_type(component)) {
                (Some(sector), Some(EntryKind::Directory)) => sector,
                (Some(_), _) => {
                    debug!("resolving {}: {} is not a directory", path, component);
                    return Err(Error::NotDirectory);
                }
                (None, _) => {
                    debug!("resolving {}: {} not found", path, component);
                    return Err(Error::NotFound);
                }
            };
            let file = OpenFile::new(Arc::clone(&self.disk), sector);
            directory = Directory::read_from(&file);
        }
        Ok((sector, name))
    }

    fn open_directory(&self, sector: u32) -> (OpenFile<D>, Directory) {
        let file = OpenFile::new(Arc::clone(&self.disk), sector);
        let directory = Directory::read_from(&file);
        (file, directory)
    }

    /// A fresh in-memory copy of the free map.
    pub fn free_map(&self) -> BitMap {
        let mut free_map = BitMap::new(NUM_SECTORS);
        free_map.fetch_from(&self.free_map_file);
        free_map
    }

    /// Creates a file of `initial_size` bytes.
    ///
    /// Fails if the name already exists in its directory, there is no sector for the
    /// header, the directory is full, or there is no room for the data blocks.
    pub fn create(&mut self, path: &str, initial_size: usize) -> Result<()> {
        debug!("creating file {}, size {}", path, initial_size);
        self.create_entry(path, initial_size, EntryKind::File)
    }

    /// Creates an empty directory.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        debug!("creating directory {}", path);
        self.create_entry(path, DIRECTORY_FILE_SIZE, EntryKind::Directory)
    }

    fn create_entry(&mut self, path: &str, size: usize, kind: EntryKind) -> Result<()> {
        let (dir_sector, name) = self.resolve(path)?;
        let (dir_file, mut directory) = self.open_directory(dir_sector);
        if directory.find(name).is_some() {
            debug!("{} already exists", path);
            return Err(Error::AlreadyExists);
        }

        let mut free_map = self.free_map();
        let Some(sector) = free_map.find() else {
            debug!("no free sector for the header of {}", path);
            return Err(Error::OutOfSpace);
        };
        let full_path = path::to_absolute(&self.pwd(), path)?;
        if !directory.add_entry(name, &full_path, sector, kind) {
            debug!("no free entry for {}", path);
            return Err(Error::DirectoryFull);
        }
        let mut hdr = FileHeader::new();
        if let Err(e) = hdr.allocate(&mut free_map, size) {
            debug!("no room for the data of {}: {}", path, e);
            return Err(e);
        }

        // Everything worked, flush all changes back to disk.
        hdr.write_back(&self.disk, sector);
        if kind == EntryKind::Directory {
            let new_dir_file = OpenFile::new(Arc::clone(&self.disk), sector);
            Directory::new(NUM_DIR_ENTRIES).write_back(&new_dir_file);
        }
        directory.write_back(&dir_file);
        free_map.write_back(&self.free_map_file);
        Ok(())
    }

    /// Opens a file or directory for reading and writing.
    pub fn open(&self, path: &str) -> Result<OpenFile<D>> {
        debug!("opening {}", path);
        let (dir_sector, name) = self.resolve(path)?;
        let (_, directory) = self.open_directory(dir_sector);
        let sector = directory.find(name).ok_or(Error::NotFound)?;
        Ok(OpenFile::new(Arc::clone(&self.disk), sector))
    }

    /// Deletes a file or directory, returning its header and data sectors to the free map.
    ///
    /// A non-empty directory is only removed with `cascade`, in which case every entry
    /// in it is removed first, depth first and in slot order.
    pub fn remove(&mut self, path: &str, cascade: bool) -> Result<()> {
        debug!("removing {}{}", path, if cascade { " recursively" } else { "" });
        let (dir_sector, name) = self.resolve(path)?;
        let (dir_file, mut directory) = self.open_directory(dir_sector);
        let entry = *directory.entry(name).ok_or(Error::NotFound)?;
        let sector = entry.sector as u32;

        if entry.kind() == EntryKind::Directory {
            let (_, target) = self.open_directory(sector);
            if !target.is_empty() {
                if !cascade {
                    debug!("{} is not empty", path);
                    return Err(Error::NotEmpty);
                }
                for child in target.entries() {
                    self.remove(&child.path(), true)?;
                }
            }
        }

        let hdr = FileHeader::read(&self.disk, sector);
        let mut free_map = self.free_map();
        hdr.deallocate(&mut free_map);
        free_map.clear(sector);
        directory.remove(name);

        free_map.write_back(&self.free_map_file);
        directory.write_back(&dir_file);

        if entry.kind() == EntryKind::Directory && path::is_within(&self.pwd(), &entry.path()) {
            debug!("current directory {} was removed, returning to /", self.pwd());
            self.set_current(DIRECTORY_SECTOR, ROOT_PATH);
        }
        Ok(())
    }

    /// Makes `path` the current directory. Fails if it is missing or is a file.
    pub fn change_dir(&mut self, path: &str) -> Result<()> {
        debug!("changing directory to {}", path);
        if path::is_absolute(path) && path::components(path)?.is_empty() {
            self.set_current(DIRECTORY_SECTOR, ROOT_PATH);
            return Ok(());
        }

        let (dir_sector, name) = self.resolve(path)?;
        let (_, directory) = self.open_directory(dir_sector);
        let sector = match (directory.find(name), directory.get_type(name)) {
            (Some(sector), Some(EntryKind::Directory)) => sector,
            (Some(_), _) => return Err(Error::NotDirectory),
            (None, _) => return Err(Error::NotFound),
        };
        let full_path = path::to_absolute(&self.pwd(), path)?;
        self.set_current(sector, &full_path);
        Ok(())
    }

    fn set_current(&mut self, sector: u32, path: &str) {
        CurDirRecord::new(sector, path).write_back(&self.cur_dir_file);
        self.cur_directory_file = OpenFile::new(Arc::clone(&self.disk), sector);
    }

    /// Absolute path of the current directory.
    pub fn pwd(&self) -> String {
        CurDirRecord::read_from(&self.cur_dir_file).path()
    }

    /// Names in the current directory, in slot order.
    pub fn list(&self) -> Vec<String> {
        Directory::read_from(&self.cur_directory_file).list()
    }

    /// Everything about the file system: the free map and root directory headers,
    /// the free map itself, and every root entry with its contents.
    pub fn print(&self) -> String {
        let mut out = String::from("Bit map file header:");
        out.push_str(&FileHeader::read(&self.disk, FREE_MAP_SECTOR).dump(&self.disk));
        out.push_str("\nDirectory file header:");
        out.push_str(&FileHeader::read(&self.disk, DIRECTORY_SECTOR).dump(&self.disk));
        out.push_str(&format!("{}\n", self.free_map()));
        out.push_str(&Directory::read_from(&self.directory_file).print(&self.disk));
        out
    }

    /// Dumps one entry: its header and contents, and for a directory its table too.
    /// `/` dumps the whole file system.
    pub fn cat(&self, path: &str) -> Result<String> {
        debug!("cat {}", path);
        if path::is_absolute(path) && path::components(path)?.is_empty() {
            return Ok(self.print());
        }
        let (dir_sector, name) = self.resolve(path)?;
        let (_, directory) = self.open_directory(dir_sector);
        let mut out = directory.cat(&self.disk, name).ok_or(Error::NotFound)?;
        if let Some(entry) = directory.entry(name) {
            if entry.kind() == EntryKind::Directory {
                let (_, table) = self.open_directory(entry.sector as u32);
                out.push_str(&table.print(&self.disk));
            }
        }
        Ok(out)
    }

    /// Grows `file` by `increment` bytes, then persists its header and the free map.
    pub fn extend(&mut self, file: &mut OpenFile<D>, increment: usize) -> Result<()> {
        assert!(Arc::ptr_eq(file.disk(), &self.disk), "file belongs to another disk");
        if increment == 0 {
            return Ok(());
        }
        // Another handle may have grown the file since this one was opened.
        file.reload();
        let mut free_map = self.free_map();
        let mut hdr = *file.header();
        if let Err(e) = hdr.allocate_incremental(&mut free_map, hdr.file_length(), increment) {
            debug!("growing file at sector {} by {} failed: {}", file.sector(), increment, e);
            return Err(e);
        }
        hdr.write_back(&self.disk, file.sector());
        free_map.write_back(&self.free_map_file);
        file.reload();
        Ok(())
    }

    /// Writes `data` at `position`, growing the file first if the write runs past its end.
    pub fn write_at(
        &mut self,
        file: &mut OpenFile<D>,
        data: &[u8],
        position: usize,
    ) -> Result<usize> {
        file.reload();
        let end = position + data.len();
        if end > file.length() {
            self.extend(file, end - file.length())?;
        }
        Ok(file.write_at(data, position))
    }

    /// Appends `data` to the end of `file`.
    pub fn append(&mut self, file: &mut OpenFile<D>, data: &[u8]) -> Result<usize> {
        file.reload();
        let position = file.length();
        self.write_at(file, data, position)
    }

    pub fn disk(&self) -> Arc<SynchDisk<D>> {
        Arc::clone(&self.disk)
    }

    pub fn stats(&self) -> DiskStats {
        self.disk.stats()
    }
}
