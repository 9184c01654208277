//! Container format detection from magic bytes.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ReadError, ReadResult};

/// HDF4 magic number at offset 0.
const HDF4_MAGIC: [u8; 4] = [0x0E, 0x03, 0x13, 0x01];

/// HDF5 superblock signature. May sit at offset 0, 512, 1024, ... because
/// a user block can precede it.
const HDF5_MAGIC: [u8; 8] = [0x89, b'H', b'D', b'F', 0x0D, 0x0A, 0x1A, 0x0A];

/// How far into the file to search for a displaced HDF5 superblock.
const MAX_SUPERBLOCK_SEARCH: usize = 64 * 1024;

/// Container format of a product input file.
///
/// netCDF-4 and HDF-EOS5 are both HDF5 containers and indistinguishable at
/// the magic-byte level; the dataset paths in the product definition are
/// what differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// HDF4 / HDF-EOS2 (MODIS, AIRS, ...)
    Hdf4,
    /// HDF5 family: plain HDF5, netCDF-4, HDF-EOS5
    Hdf5,
    /// netCDF classic (CDF-1/2/5)
    NetCdfClassic,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Hdf4 => write!(f, "HDF4"),
            FileFormat::Hdf5 => write!(f, "HDF5/netCDF-4"),
            FileFormat::NetCdfClassic => write!(f, "netCDF classic"),
        }
    }
}

/// Detect the container format of a file from its magic bytes.
pub fn detect_format(path: &Path) -> ReadResult<FileFormat> {
    let mut file = File::open(path)?;
    let mut head = vec![0u8; MAX_SUPERBLOCK_SEARCH];
    let n = read_up_to(&mut file, &mut head)?;
    head.truncate(n);

    classify_bytes(&head)
        .ok_or_else(|| ReadError::UnknownFormat(path.display().to_string()))
}

/// Classify already-read leading bytes. Split out for testability.
pub(crate) fn classify_bytes(head: &[u8]) -> Option<FileFormat> {
    if head.len() >= 4 && head[0..4] == HDF4_MAGIC {
        return Some(FileFormat::Hdf4);
    }

    if head.len() >= 4 && head[0..3] == *b"CDF" && matches!(head[3], 1 | 2 | 5) {
        return Some(FileFormat::NetCdfClassic);
    }

    // HDF5 superblock at doubling offsets: 0, 512, 1024, 2048, ...
    let mut offset = 0usize;
    loop {
        if offset + HDF5_MAGIC.len() <= head.len() {
            if head[offset..offset + HDF5_MAGIC.len()] == HDF5_MAGIC {
                return Some(FileFormat::Hdf5);
            }
        } else {
            break;
        }
        offset = if offset == 0 { 512 } else { offset * 2 };
    }

    None
}

/// Read as many bytes as available, up to the buffer size.
fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
