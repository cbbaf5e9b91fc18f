//! Persisted record layout
//!
//! A record is a fixed-size block of bytes: data fields first, then a short
//! marker that identifies a valid block when the region is scanned. The
//! marker is a validity tag only. It does not detect corrupted field bytes.

/// A fixed-size block that can be stored in the settings region
///
/// `Bytes` must be a plain byte array (`[u8; N]`); [`Record::SIZE`] is
/// derived from its size.
pub trait Record {
    /// Encoded form of the record
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default + Clone;

    /// Marker stored in the last `MARKER.len()` bytes of every block
    const MARKER: &'static [u8];

    /// Stored size in bytes, marker included
    const SIZE: usize = core::mem::size_of::<Self::Bytes>();

    /// Encode into the stored layout, marker included
    fn to_bytes(&self) -> Self::Bytes;

    /// Decode from the stored layout
    ///
    /// The marker bytes are not inspected; callers check them with
    /// [`Record::has_marker`] first.
    fn from_bytes(bytes: &Self::Bytes) -> Self;

    /// Check whether a block ends with this record's marker
    fn has_marker(block: &[u8]) -> bool {
        block.len() == Self::SIZE && block.ends_with(Self::MARKER)
    }

    /// Offset of the marker within a block
    fn marker_offset() -> usize {
        Self::SIZE - Self::MARKER.len()
    }
}
