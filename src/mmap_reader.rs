use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

/// Files above this size are mapped instead of read.
pub const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

pub struct MmapFileReader {
    _file: File,
    mmap: Mmap,
}

impl MmapFileReader {
    pub fn new<P: AsRef<Path>>(file_path: P) -> std::io::Result<Self> {
        let file = File::open(file_path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(MmapFileReader { _file: file, mmap })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// Bytes of an input document, either read into memory or mapped from disk.
pub enum DocumentBytes {
    Read(Vec<u8>),
    Mapped(MmapFileReader),
}

impl DocumentBytes {
    pub fn is_mapped(&self) -> bool {
        matches!(self, DocumentBytes::Mapped(_))
    }
}

impl Deref for DocumentBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            DocumentBytes::Read(bytes) => bytes,
            DocumentBytes::Mapped(reader) => reader.as_slice(),
        }
    }
}

/// Open a document for reading, mapping it when it is larger than [`MMAP_THRESHOLD`].
pub fn read_document<P: AsRef<Path>>(file_path: P) -> std::io::Result<DocumentBytes> {
    read_with_threshold(file_path.as_ref(), MMAP_THRESHOLD)
}

fn read_with_threshold(path: &Path, threshold: u64) -> std::io::Result<DocumentBytes> {
    if std::fs::metadata(path)?.len() > threshold {
        Ok(DocumentBytes::Mapped(MmapFileReader::new(path)?))
    } else {
        Ok(DocumentBytes::Read(std::fs::read(path)?))
    }
}
