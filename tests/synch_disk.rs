#![allow(unused)]

mod common;

use std::sync::Arc;
use std::thread;

use gluon::*;
use rand::Rng;

#[test]
fn test_stats() {
    let disk = SynchDisk::new(RamDisk::new(16));
    let mut buf = [0u8; SECTOR_SIZE];
    disk.write_sector(3, &[9u8; SECTOR_SIZE]);
    disk.read_sector(3, &mut buf);
    disk.read_sector(4, &mut buf);
    assert_eq!(disk.stats(), DiskStats { reads: 2, writes: 1 });
    assert_eq!(buf, [0u8; SECTOR_SIZE]);
}

#[test]
fn test_into_inner() {
    let disk = SynchDisk::new(RamDisk::new(4));
    disk.write_sector(1, &[0xabu8; SECTOR_SIZE]);
    let raw = disk.into_inner().snapshot();
    assert_eq!(raw.len(), 4 * SECTOR_SIZE);
    assert!(raw[SECTOR_SIZE..2 * SECTOR_SIZE].iter().all(|&b| b == 0xab));
    assert!(raw[..SECTOR_SIZE].iter().all(|&b| b == 0));
}

#[test]
#[should_panic]
fn test_out_of_range() {
    let disk = SynchDisk::new(RamDisk::new(16));
    let mut buf = [0u8; SECTOR_SIZE];
    disk.read_sector(16, &mut buf);
}

#[test]
fn test_concurrent_requests() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 200;
    let disk = Arc::new(SynchDisk::new(RamDisk::new(THREADS * 4)));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let disk = Arc::clone(&disk);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let mut buf = [0u8; SECTOR_SIZE];
                for round in 0..ROUNDS {
                    // Each thread owns four sectors; a sector always holds one repeated byte.
                    let sector = (t * 4 + rng.gen_range(0..4)) as u32;
                    let value = (round % 256) as u8;
                    disk.write_sector(sector, &[value; SECTOR_SIZE]);
                    disk.read_sector(sector, &mut buf);
                    assert!(buf.iter().all(|&b| b == value), "torn sector {}", sector);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = disk.stats();
    assert_eq!(stats.reads, (THREADS * ROUNDS) as u64);
    assert_eq!(stats.writes, (THREADS * ROUNDS) as u64);
    log!("{:?}", stats);
}

#[test]
fn test_shared_between_file_systems() {
    let disk = Arc::new(SynchDisk::new(RamDisk::default()));
    let mut writer = FileSystem::format(Arc::clone(&disk)).unwrap();
    writer.create("shared", 4).unwrap();
    writer.open("shared").unwrap().write_at(b"ping", 0);

    // A second mount sees the same sectors.
    let reader = FileSystem::mount(Arc::clone(&disk)).unwrap();
    let file = reader.open("shared").unwrap();
    let mut buf = [0u8; 4];
    file.read_at(&mut buf, 0);
    assert_eq!(&buf, b"ping");
}
