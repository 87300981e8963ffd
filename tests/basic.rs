#![allow(unused)]

use std::sync::Arc;

mod common;

use common::{fresh_fs, read_all, snapshot, FREE_AFTER_FORMAT};
use gluon::*;

#[test]
fn test_format() {
    let (disk, fs) = fresh_fs();
    assert_eq!(fs.free_map().num_clear(), FREE_AFTER_FORMAT);
    assert!(fs.list().is_empty());
    assert_eq!(fs.pwd(), "/");
    let map = fs.free_map();
    for sector in 0..11 {
        assert!(map.test(sector), "sector {} should be in use", sector);
    }
    assert!(!map.test(11));
    log!("{}", fs.print());
}

#[test]
fn test_mount_blank_disk() {
    let disk = Arc::new(SynchDisk::new(RamDisk::default()));
    assert_eq!(FileSystem::mount(disk).err(), Some(Error::NotFormatted));
}

#[test]
fn test_mount_small_disk() {
    let disk = Arc::new(SynchDisk::new(RamDisk::new(64)));
    assert_eq!(FileSystem::format(Arc::clone(&disk)).err(), Some(Error::InvalidDisk));
    assert_eq!(FileSystem::mount(disk).err(), Some(Error::InvalidDisk));
}

#[test]
fn test_create_remove() {
    let (disk, mut fs) = fresh_fs();
    fs.create("a", 200).unwrap();
    // One header sector and two data sectors.
    assert_eq!(fs.free_map().num_clear(), FREE_AFTER_FORMAT - 3);
    assert_eq!(fs.list(), vec!["a"]);

    let file = fs.open("a").unwrap();
    assert_eq!(file.length(), 200);
    assert_eq!(file.header().num_sectors(), 2);

    fs.remove("a", false).unwrap();
    assert_eq!(fs.free_map().num_clear(), FREE_AFTER_FORMAT);
    assert!(fs.list().is_empty());
    assert_eq!(fs.open("a").err(), Some(Error::NotFound));
    assert_eq!(fs.remove("a", false), Err(Error::NotFound));
}

#[test]
fn test_create_duplicate() {
    let (disk, mut fs) = fresh_fs();
    fs.create("a", 200).unwrap();
    let before = snapshot(&disk);
    assert_eq!(fs.create("a", 50), Err(Error::AlreadyExists));
    assert_eq!(fs.create("/a", 0), Err(Error::AlreadyExists));
    assert_eq!(fs.mkdir("a"), Err(Error::AlreadyExists));
    assert_eq!(snapshot(&disk), before);
}

#[test]
fn test_invalid_names() {
    let (disk, mut fs) = fresh_fs();
    let before = snapshot(&disk);
    assert_eq!(fs.create("/abcdefghij", 0), Err(Error::InvalidFileName));
    assert_eq!(fs.create("/", 0), Err(Error::InvalidPath));
    assert_eq!(fs.create("", 0), Err(Error::InvalidPath));
    assert_eq!(fs.remove("/", true), Err(Error::InvalidPath));
    assert_eq!(snapshot(&disk), before);

    // Nine characters is the longest name that fits.
    fs.create("/abcdefghi", 0).unwrap();
    assert_eq!(fs.list(), vec!["abcdefghi"]);
}

#[test]
fn test_directory_full() {
    let (disk, mut fs) = fresh_fs();
    for i in 0..NUM_DIR_ENTRIES {
        fs.create(&format!("f{}", i), 0).unwrap();
    }
    let before = snapshot(&disk);
    assert_eq!(fs.create("extra", 0), Err(Error::DirectoryFull));
    assert_eq!(fs.mkdir("extra"), Err(Error::DirectoryFull));
    assert_eq!(snapshot(&disk), before);

    // A freed slot is reused in place.
    fs.remove("f3", false).unwrap();
    fs.create("extra", 0).unwrap();
    assert_eq!(fs.list()[3], "extra");
}

#[test]
fn test_too_large() {
    let (disk, mut fs) = fresh_fs();
    let before = snapshot(&disk);
    assert_eq!(fs.create("big", MAX_FILE_SIZE + 1), Err(Error::FileTooLarge));
    assert_eq!(snapshot(&disk), before);
    fs.create("big", MAX_FILE_SIZE).unwrap();
    assert_eq!(fs.free_map().num_clear(), FREE_AFTER_FORMAT - 1 - NUM_DIRECT);
}

#[test]
fn test_out_of_space() {
    let (disk, mut fs) = fresh_fs();
    let mut failed = None;
    'outer: for d in 0..4 {
        let dir = format!("/d{}", d);
        fs.mkdir(&dir).unwrap();
        for f in 0..NUM_DIR_ENTRIES {
            let path = format!("{}/f{}", dir, f);
            let before = snapshot(&disk);
            match fs.create(&path, MAX_FILE_SIZE) {
                Ok(()) => {}
                Err(e) => {
                    assert_eq!(e, Error::OutOfSpace);
                    assert_eq!(snapshot(&disk), before);
                    failed = Some(path);
                    break 'outer;
                }
            }
        }
    }
    assert_eq!(failed.as_deref(), Some("/d3/f1"));

    let left = fs.free_map().num_clear();
    assert_eq!(left, 24);
    fs.create("/d3/fill", (left - 1) * SECTOR_SIZE).unwrap();
    assert_eq!(fs.free_map().num_clear(), 0);
    assert_eq!(fs.create("/d3/x", 0), Err(Error::OutOfSpace));
    assert_eq!(fs.mkdir("/d3/y"), Err(Error::OutOfSpace));

    fs.remove("/d0", true).unwrap();
    fs.remove("/d1", true).unwrap();
    fs.remove("/d2", true).unwrap();
    fs.remove("/d3", true).unwrap();
    assert_eq!(fs.free_map().num_clear(), FREE_AFTER_FORMAT);
}

#[test]
fn test_open_read_write() {
    let (disk, mut fs) = fresh_fs();
    fs.create("data", 300).unwrap();
    let mut file = fs.open("data").unwrap();
    let content: Vec<u8> = (0..300).map(|i| (i % 251) as u8).collect();
    assert_eq!(file.write(&content[..100]), 100);
    assert_eq!(file.write(&content[100..]), 200);
    assert_eq!(file.position(), 300);
    // Writes never grow the file through the stream alone.
    assert_eq!(file.write(b"more"), 0);

    let reopened = fs.open("/data").unwrap();
    assert_eq!(read_all(&reopened), content);

    let mut buf = [0u8; 50];
    assert_eq!(reopened.read_at(&mut buf, 280), 20);
    assert_eq!(&buf[..20], &content[280..]);
    assert_eq!(reopened.read_at(&mut buf, 300), 0);

    let mut reader = fs.open("data").unwrap();
    reader.seek(250);
    assert_eq!(reader.read(&mut buf), 50);
    assert_eq!(&buf[..], &content[250..]);
    assert_eq!(reader.position(), 300);
    assert_eq!(reader.read(&mut buf), 0);

    // A partial-sector write keeps its neighbours.
    assert_eq!(file.write_at(b"xy", 127), 2);
    let after = read_all(&reopened);
    assert_eq!(&after[127..129], b"xy");
    assert_eq!(&after[..127], &content[..127]);
    assert_eq!(&after[129..], &content[129..]);
}

#[test]
fn test_mount_persists() {
    let (disk, mut fs) = fresh_fs();
    fs.mkdir("sub").unwrap();
    fs.change_dir("sub").unwrap();
    fs.create("f", 40).unwrap();
    fs.open("f").unwrap().write_at(b"persisted", 0);
    let free = fs.free_map().num_clear();
    fs.unmount();

    let fs = FileSystem::mount(Arc::clone(&disk)).unwrap();
    assert_eq!(fs.pwd(), "/sub");
    assert_eq!(fs.list(), vec!["f"]);
    assert_eq!(fs.free_map().num_clear(), free);
    let file = fs.open("/sub/f").unwrap();
    let mut buf = [0u8; 9];
    file.read_at(&mut buf, 0);
    assert_eq!(&buf, b"persisted");
}

#[test]
fn test_cat_print() {
    let (disk, mut fs) = fresh_fs();
    fs.create("hello", 5).unwrap();
    fs.open("hello").unwrap().write_at(b"hello", 0);
    fs.mkdir("dir").unwrap();
    fs.create("/dir/inner", 0).unwrap();

    let out = fs.cat("hello").unwrap();
    log!("{}", out);
    assert!(out.contains("Name: hello, Path: /hello"));
    assert!(out.contains("Type: File"));
    assert!(out.contains("File size: 5."));
    assert!(out.contains("hello\n"));

    let out = fs.cat("/dir").unwrap();
    assert!(out.contains("Type: Directory"));
    assert!(out.contains("Name: inner, Path: /dir/inner"));

    assert_eq!(fs.cat("/").unwrap(), fs.print());
    let out = fs.print();
    assert!(out.starts_with("Bit map file header:"));
    assert!(out.contains("Directory file header:"));
    assert!(out.contains("Name: dir, Path: /dir"));
    assert_eq!(fs.cat("/missing").err(), Some(Error::NotFound));
}
