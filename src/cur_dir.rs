use crate::config::CUR_DIR_FILE_SIZE;
use crate::structs::CurDirRecord;
use crate::{BlockDevice, OpenFile};

impl CurDirRecord {
    pub fn fetch_from<D: BlockDevice>(&mut self, file: &OpenFile<D>) {
        let mut buf = [0u8; CUR_DIR_FILE_SIZE];
        let read = file.read_at(&mut buf, 0);
        assert_eq!(read, CUR_DIR_FILE_SIZE, "current directory file is truncated");
        *self = unsafe { core::ptr::read_unaligned(buf.as_ptr() as *const CurDirRecord) };
    }

    pub fn write_back<D: BlockDevice>(&self, file: &OpenFile<D>) {
        let mut buf = [0u8; CUR_DIR_FILE_SIZE];
        unsafe {
            core::ptr::write_unaligned(buf.as_mut_ptr() as *mut CurDirRecord, *self);
        }
        let written = file.write_at(&buf, 0);
        assert_eq!(written, CUR_DIR_FILE_SIZE, "current directory file is truncated");
    }

    pub fn read_from<D: BlockDevice>(file: &OpenFile<D>) -> Self {
        let mut record = Self::root();
        record.fetch_from(file);
        record
    }
}
