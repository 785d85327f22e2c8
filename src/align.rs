/// Rounds `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two. The addition wraps on overflow, so
/// callers that cannot rule out addresses near `usize::MAX` should use
/// [`checked_align_up`] instead.
///
/// # Examples
///
/// ```rust
/// use scratchpad::align_to;
///
/// assert_eq!(align_to!(13usize, 8), 16);
/// assert_eq!(align_to!(16usize, 16), 16);
/// assert_eq!(align_to!(17usize, 1), 17);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    ($value).wrapping_add(($alignment) - 1) & !(($alignment) - 1)
  };
}

/// Checked variant of [`align_to!`]. Returns `None` if rounding up would
/// overflow `usize`.
#[inline]
pub fn checked_align_up(
  value: usize,
  alignment: usize,
) -> Option<usize> {
  debug_assert!(alignment.is_power_of_two());

  let mask = alignment - 1;
  Some(value.checked_add(mask)? & !mask)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_to() {
    for alignment in [1usize, 2, 4, 8, 16, 64, 4096] {
      for i in 0..10 {
        let sizes = (alignment * i + 1)..=(alignment * (i + 1));

        for size in sizes {
          assert_eq!(alignment * (i + 1), align_to!(size, alignment));
        }
      }
    }
  }

  #[test]
  fn test_aligned_values_are_unchanged() {
    assert_eq!(align_to!(0usize, 16), 0);
    assert_eq!(align_to!(32usize, 16), 32);
    assert_eq!(checked_align_up(4096, 4096), Some(4096));
  }

  #[test]
  fn test_checked_align_up_overflow() {
    assert_eq!(checked_align_up(usize::MAX, 1), Some(usize::MAX));
    assert_eq!(checked_align_up(usize::MAX - 3, 8), None);
    assert_eq!(checked_align_up(13, 8), Some(16));
  }
}
