//! Free sector map.
//! One bit per sector, a set bit means the sector is allocated. The map is kept in
//! memory while an operation runs and is only written back to its file once the
//! operation has succeeded.

use core::fmt;

use crate::config::*;
use crate::{BlockDevice, OpenFile};

const BITS_IN_BYTE: usize = 8;
const BITS_IN_WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMap {
    num_bits: usize,
    map: Vec<u32>,
}

impl BitMap {
    /// A map of `num_bits` bits, all clear.
    pub fn new(num_bits: usize) -> Self {
        let num_words = num_bits.div_ceil(BITS_IN_WORD);
        Self {
            num_bits,
            map: vec![0; num_words],
        }
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    fn locate(&self, which: u32) -> (usize, u32) {
        let which = which as usize;
        assert!(which < self.num_bits, "bit {} out of range", which);
        (which / BITS_IN_WORD, 1u32 << (which % BITS_IN_WORD))
    }

    pub fn mark(&mut self, which: u32) {
        let (word, mask) = self.locate(which);
        self.map[word] |= mask;
    }

    pub fn clear(&mut self, which: u32) {
        let (word, mask) = self.locate(which);
        self.map[word] &= !mask;
    }

    pub fn test(&self, which: u32) -> bool {
        let (word, mask) = self.locate(which);
        self.map[word] & mask != 0
    }

    /// Claims the first clear bit in ascending order and returns its index.
    pub fn find(&mut self) -> Option<u32> {
        let (word, bits) = self
            .map
            .iter()
            .enumerate()
            .find(|(_, bits)| **bits != u32::MAX)?;
        let which = word * BITS_IN_WORD + bits.trailing_ones() as usize;
        if which >= self.num_bits {
            return None;
        }
        self.map[word] |= 1 << (which % BITS_IN_WORD);
        Some(which as u32)
    }

    pub fn num_clear(&self) -> usize {
        (0..self.num_bits as u32).filter(|&i| !self.test(i)).count()
    }

    /// Loads the map from the start of `file`.
    pub fn fetch_from<D: BlockDevice>(&mut self, file: &OpenFile<D>) {
        let mut buf = vec![0u8; self.map.len() * 4];
        let read = file.read_at(&mut buf, 0);
        assert_eq!(read, buf.len(), "free map file is shorter than the map");
        for (word, bytes) in self.map.iter_mut().zip(buf.chunks_exact(4)) {
            *word = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
    }

    /// Stores the map at the start of `file`.
    pub fn write_back<D: BlockDevice>(&self, file: &OpenFile<D>) {
        let buf: Vec<u8> = self.map.iter().flat_map(|w| w.to_ne_bytes()).collect();
        let written = file.write_at(&buf, 0);
        assert_eq!(written, buf.len(), "free map file is shorter than the map");
    }

    /// Size in bytes of the file needed to persist a map of `num_bits` bits.
    pub const fn file_size(num_bits: usize) -> usize {
        num_bits / BITS_IN_BYTE
    }
}

impl fmt::Display for BitMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap set:")?;
        for i in 0..self.num_bits as u32 {
            if self.test(i) {
                write!(f, " {}", i)?;
            }
        }
        Ok(())
    }
}
