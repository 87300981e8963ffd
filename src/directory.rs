//! Directories: fixed-size tables of `<name, header sector>` entries.
//!
//! A table is itself stored as an ordinary file. It is read and written in one
//! piece at offset 0, and it never grows: once every slot is in use no more
//! entries can be added. Callers provide mutual exclusion.

use core::fmt::Write;

use crate::config::*;
use crate::structs::*;
use crate::synch_disk::SynchDisk;
use crate::{BlockDevice, FileHeader, OpenFile};

#[derive(Debug, Clone)]
pub struct Directory {
    table: Vec<DirectoryEntry>,
}

impl Directory {
    /// An empty directory with room for `size` entries.
    pub fn new(size: usize) -> Self {
        Self {
            table: vec![DirectoryEntry::NULL; size],
        }
    }

    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    pub fn fetch_from<D: BlockDevice>(&mut self, file: &OpenFile<D>) {
        let mut buf = vec![0u8; self.table.len() * DIR_ENTRY_SIZE];
        let read = file.read_at(&mut buf, 0);
        assert_eq!(read, buf.len(), "directory file is shorter than its table");
        for (entry, bytes) in self.table.iter_mut().zip(buf.chunks_exact(DIR_ENTRY_SIZE)) {
            *entry = unsafe { core::ptr::read_unaligned(bytes.as_ptr() as *const DirectoryEntry) };
        }
    }

    pub fn write_back<D: BlockDevice>(&self, file: &OpenFile<D>) {
        let mut buf = vec![0u8; self.table.len() * DIR_ENTRY_SIZE];
        for (entry, bytes) in self.table.iter().zip(buf.chunks_exact_mut(DIR_ENTRY_SIZE)) {
            unsafe {
                core::ptr::write_unaligned(bytes.as_mut_ptr() as *mut DirectoryEntry, *entry);
            }
        }
        let written = file.write_at(&buf, 0);
        assert_eq!(written, buf.len(), "directory file is shorter than its table");
    }

    /// Reads the directory stored in `file`.
    pub fn read_from<D: BlockDevice>(file: &OpenFile<D>) -> Self {
        let mut dir = Self::new(NUM_DIR_ENTRIES);
        dir.fetch_from(file);
        dir
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        self.table
            .iter()
            .position(|entry| entry.is_in_use() && entry.name_eq(name.as_bytes()))
    }

    /// Sector of the header for `name`, if present.
    pub fn find(&self, name: &str) -> Option<u32> {
        self.find_index(name).map(|i| self.table[i].sector as u32)
    }

    pub fn get_type(&self, name: &str) -> Option<EntryKind> {
        self.find_index(name).map(|i| self.table[i].kind())
    }

    /// The in-use entry for `name`.
    pub fn entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.find_index(name).map(|i| &self.table[i])
    }

    /// Adds a plain file entry whose path is just its name.
    pub fn add(&mut self, name: &str, new_sector: u32) -> bool {
        self.add_entry(name, name, new_sector, EntryKind::File)
    }

    /// Claims the first free slot for `name`.
    /// Fails if the name is already present or the table is full.
    pub fn add_entry(&mut self, name: &str, path: &str, new_sector: u32, kind: EntryKind) -> bool {
        if self.find_index(name).is_some() {
            return false;
        }
        match self.table.iter_mut().find(|entry| !entry.is_in_use()) {
            Some(slot) => {
                slot.in_use = 1;
                slot.sector = new_sector as i32;
                slot.name = fill_bytes(&name.as_bytes()[..name.len().min(FILE_NAME_MAX_LEN)]);
                slot.path = fill_bytes(&path.as_bytes()[..path.len().min(FILE_PATH_MAX_LEN)]);
                slot.kind = kind as i32;
                true
            }
            None => false,
        }
    }

    /// Marks the entry for `name` free. Only the flag is cleared.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.find_index(name) {
            Some(i) => {
                self.table[i].in_use = 0;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.iter().all(|entry| !entry.is_in_use())
    }

    pub fn is_full(&self) -> bool {
        self.table.iter().all(|entry| entry.is_in_use())
    }

    /// In-use entries in slot order.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.table.iter().filter(|entry| entry.is_in_use())
    }

    /// Names of the in-use entries in slot order.
    pub fn list(&self) -> Vec<String> {
        self.entries().map(|entry| entry.name()).collect()
    }

    /// Every entry with its header and contents. For debugging.
    pub fn print<D: BlockDevice>(&self, disk: &SynchDisk<D>) -> String {
        let mut out = String::from("\nDirectory contents:\n");
        for entry in self.entries() {
            describe(&mut out, entry);
            out.push_str(&FileHeader::read(disk, entry.sector as u32).dump(disk));
        }
        out.push('\n');
        out
    }

    /// The entry for `name` with its header and contents, or `None` if absent.
    pub fn cat<D: BlockDevice>(&self, disk: &SynchDisk<D>, name: &str) -> Option<String> {
        let entry = self.entry(name)?;
        let mut out = String::from("File contents:\n");
        describe(&mut out, entry);
        out.push_str(&FileHeader::read(disk, entry.sector as u32).dump(disk));
        out.push('\n');
        Some(out)
    }
}

fn describe(out: &mut String, entry: &DirectoryEntry) {
    let kind = match entry.kind() {
        EntryKind::Directory => "Directory",
        EntryKind::File => "File",
    };
    let _ = writeln!(
        out,
        "Name: {}, Path: {}, Sector: {}, Type: {}",
        entry.name(),
        entry.path(),
        entry.sector,
        kind
    );
}
