//! Region scanner
//!
//! Finds the first stored record by sliding a record-sized window over the
//! region one byte at a time. Saves move the cursor by single bytes, so a
//! stride of one record would miss blocks at unaligned offsets.

use terrarium_hal::ByteStorage;

use crate::record::Record;

/// A record found in the region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit<B> {
    /// Offset of the block from the region start
    pub offset: usize,
    /// Raw block contents, marker included
    pub bytes: B,
}

/// Search `region_size` bytes from `region_start` for a block carrying
/// `R`'s marker
///
/// Offsets `0..=region_size - R::SIZE` are tried in order and the first hit
/// wins. The marker is read before the rest of the block. A device read
/// fault at a candidate offset counts as "no record here".
pub fn find_record<S, R>(
    storage: &mut S,
    region_start: usize,
    region_size: usize,
) -> Option<ScanHit<R::Bytes>>
where
    S: ByteStorage,
    R: Record,
{
    if region_size < R::SIZE {
        return None;
    }

    let marker_offset = R::marker_offset();

    for offset in 0..=region_size - R::SIZE {
        let base = region_start + offset;

        if !marker_at(storage, base + marker_offset, R::MARKER) {
            continue;
        }

        let mut bytes = R::Bytes::default();
        if read_block(storage, base, bytes.as_mut()) && R::has_marker(bytes.as_ref()) {
            return Some(ScanHit { offset, bytes });
        }
    }

    None
}

fn marker_at<S: ByteStorage>(storage: &mut S, address: usize, marker: &[u8]) -> bool {
    marker
        .iter()
        .enumerate()
        .all(|(i, &expected)| storage.read_byte(address + i) == Ok(expected))
}

fn read_block<S: ByteStorage>(storage: &mut S, address: usize, buf: &mut [u8]) -> bool {
    for (i, slot) in buf.iter_mut().enumerate() {
        match storage.read_byte(address + i) {
            Ok(value) => *slot = value,
            Err(_) => return false,
        }
    }
    true
}
