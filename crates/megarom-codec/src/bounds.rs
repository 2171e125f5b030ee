//! Range validation used before every buffer access
//!
//! Codecs never index a ROM buffer with a range they computed themselves.
//! They ask [`validate_range`] for it, and slice with the range it returns.

use crate::error::BoundsError;
use std::ops::Range;

/// Validate that `offset..offset + length` lies inside a buffer of `size` bytes
///
/// Returns the checked range on success. Zero-length ranges are accepted
/// anywhere up to and including `size`.
pub fn validate_range(offset: usize, length: usize, size: usize) -> Result<Range<usize>, BoundsError> {
    let end = offset
        .checked_add(length)
        .ok_or(BoundsError::Overflow { offset, length })?;

    if end > size {
        return Err(BoundsError::OutOfRange {
            offset,
            length,
            size,
        });
    }

    Ok(offset..end)
}

/// Borrow `length` bytes at `offset` from `data` after validating the range
pub fn checked_slice(data: &[u8], offset: usize, length: usize) -> Result<&[u8], BoundsError> {
    let range = validate_range(offset, length, data.len())?;
    Ok(&data[range])
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_range_inside_buffer() {
        assert_eq!(validate_range(0, 16, 16).unwrap(), 0..16);
        assert_eq!(validate_range(4, 4, 16).unwrap(), 4..8);
        assert_eq!(validate_range(16, 0, 16).unwrap(), 16..16);
    }

    #[test]
    fn test_range_past_end() {
        assert_eq!(
            validate_range(10, 7, 16),
            Err(BoundsError::OutOfRange {
                offset: 10,
                length: 7,
                size: 16
            })
        );
        assert!(validate_range(17, 0, 16).is_err());
    }

    #[test]
    fn test_range_overflow() {
        assert_eq!(
            validate_range(usize::MAX, 2, 16),
            Err(BoundsError::Overflow {
                offset: usize::MAX,
                length: 2
            })
        );
    }

    #[test]
    fn test_checked_slice() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(checked_slice(&data, 1, 2).unwrap(), &[2, 3]);
        assert!(checked_slice(&data, 3, 2).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Accepted ranges always fit the buffer, rejected ones never do
            #[test]
            fn range_never_exceeds_buffer(
                offset in any::<usize>(),
                length in any::<usize>(),
                size in 0usize..1_000_000
            ) {
                match validate_range(offset, length, size) {
                    Ok(range) => {
                        prop_assert!(range.end <= size);
                        prop_assert_eq!(range.start, offset);
                        prop_assert_eq!(range.len(), length);
                    }
                    Err(_) => {
                        prop_assert!(offset.checked_add(length).is_none_or(|end| end > size));
                    }
                }
            }
        }
    }
}
