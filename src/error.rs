//! Arena error types.

/// Errors reported by arena construction and allocation.
///
/// [`ZeroCapacity`](ArenaError::ZeroCapacity) and
/// [`InvalidAlignment`](ArenaError::InvalidAlignment) form the
/// invalid-argument class, see [`ArenaError::is_invalid_argument`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
  /// The region handed to the arena is empty.
  #[error("invalid argument: arena capacity must be greater than zero")]
  ZeroCapacity,

  /// The requested alignment is not a power of two.
  #[error("invalid argument: alignment {alignment} is not a power of two")]
  InvalidAlignment {
    /// The rejected alignment.
    alignment: usize,
  },

  /// The allocation would run past the end of the region.
  ///
  /// The arena is left exactly as it was before the failing call.
  #[error("out of memory: requested {requested} bytes, {available} bytes left")]
  OutOfMemory {
    /// Bytes needed, including alignment padding. `usize::MAX` if the size
    /// computation itself overflowed.
    requested: usize,
    /// Bytes left before the call.
    available: usize,
  },

  /// The system allocator refused to hand out an owned block.
  #[error("failed to acquire {size} bytes aligned to {alignment} from the system allocator")]
  AcquireFailed {
    /// Requested block size.
    size: usize,
    /// Requested base alignment.
    alignment: usize,
  },
}

impl ArenaError {
  /// Returns `true` for errors caused by an invalid caller-supplied argument.
  pub fn is_invalid_argument(&self) -> bool {
    matches!(self, Self::ZeroCapacity | Self::InvalidAlignment { .. })
  }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArenaError>;
