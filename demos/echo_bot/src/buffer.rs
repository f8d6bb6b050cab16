//! Buffer allocation and fill helpers backing the `/buffer` command.
//!
//! Pure, stateless utilities: the command handler owns all user-facing
//! validation and formatting.

use thiserror::Error;

/// Errors from the fill helper's bounds checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The starting offset lies past the end of the buffer.
    #[error("offset {offset} is out of bounds for a {len}-byte buffer")]
    OffsetOutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Buffer length.
        len: usize,
    },

    /// The requested region extends past the end of the buffer.
    #[error("length {length} from offset {offset} exceeds the {len}-byte buffer")]
    LengthOutOfBounds {
        /// Requested region length.
        length: usize,
        /// Requested offset.
        offset: usize,
        /// Buffer length.
        len: usize,
    },
}

/// Allocates a zero-initialized buffer of the given size.
pub fn allocate_buffer(size: usize) -> Vec<u8> {
    vec![0u8; size]
}

/// Fills `length` bytes of `buf` starting at `offset` with `value`.
///
/// A `length` of `None` fills to the end of the buffer.
pub fn fill_buffer(
    buf: &mut [u8],
    value: u8,
    offset: usize,
    length: Option<usize>,
) -> Result<(), BufferError> {
    if offset > buf.len() {
        return Err(BufferError::OffsetOutOfBounds {
            offset,
            len: buf.len(),
        });
    }

    let length = length.unwrap_or(buf.len() - offset);
    if offset + length > buf.len() {
        return Err(BufferError::LengthOutOfBounds {
            length,
            offset,
            len: buf.len(),
        });
    }

    buf[offset..offset + length].fill(value);
    Ok(())
}

/// Formats the first `count` bytes of a buffer as lowercase hex.
pub fn hex_preview(buf: &[u8], count: usize) -> String {
    buf.iter()
        .take(count)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_zeroed() {
        let buf = allocate_buffer(4);
        assert_eq!(buf, vec![0, 0, 0, 0]);
    }

    #[test]
    fn fill_whole_buffer() {
        let mut buf = allocate_buffer(4);
        fill_buffer(&mut buf, 0xAA, 0, None).unwrap();
        assert_eq!(buf, vec![0xAA; 4]);
    }

    #[test]
    fn fill_a_region() {
        let mut buf = allocate_buffer(5);
        fill_buffer(&mut buf, 0xFF, 1, Some(2)).unwrap();
        assert_eq!(buf, vec![0x00, 0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn offset_past_the_end_is_rejected() {
        let mut buf = allocate_buffer(3);
        let err = fill_buffer(&mut buf, 0xAA, 4, None).unwrap_err();
        assert_eq!(err, BufferError::OffsetOutOfBounds { offset: 4, len: 3 });
    }

    #[test]
    fn length_past_the_end_is_rejected() {
        let mut buf = allocate_buffer(3);
        let err = fill_buffer(&mut buf, 0xAA, 1, Some(5)).unwrap_err();
        assert_eq!(
            err,
            BufferError::LengthOutOfBounds {
                length: 5,
                offset: 1,
                len: 3
            }
        );
    }

    #[test]
    fn hex_preview_truncates() {
        let buf = vec![0xAA, 0xBB, 0xCC];
        assert_eq!(hex_preview(&buf, 2), "aabb");
        assert_eq!(hex_preview(&buf, 10), "aabbcc");
    }
}
