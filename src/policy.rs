//! Compile-time arena policies.
//!
//! Each policy is an uninhabited tag type carrying an associated `const`.
//! [`Arena`](crate::Arena) branches on those constants, so for any given
//! instantiation the disabled branch is dead code and disappears.
//!
//! ```text
//!   BoundsCheck                 ZeroMemory
//!   ├── EnableBoundsCheck       ├── Zeroed          (construct / reset / alloc)
//!   └── DisableBoundsCheck      └── Uninitialized   (stale bytes are kept)
//! ```

mod sealed {
  pub trait Sealed {}
}

/// Whether every allocation validates capacity before advancing the cursor.
pub trait BoundsCheck: sealed::Sealed + 'static {
  /// `true` if overflowing allocations are detected and reported.
  const ENABLED: bool;
}

/// Whether arena bytes are zero-filled on construction, reset and allocation.
pub trait ZeroMemory: sealed::Sealed + 'static {
  /// `true` if the arena guarantees zeroed memory.
  const ZEROED: bool;
}

/// Capacity overflow is reported as [`ArenaError::OutOfMemory`](crate::ArenaError::OutOfMemory).
#[derive(Debug)]
pub enum EnableBoundsCheck {}

/// No capacity check on the hot path.
///
/// Exceeding capacity is undefined behavior, caught only by debug assertions.
/// Arenas with this policy can only be built through `unsafe` constructors.
#[derive(Debug)]
pub enum DisableBoundsCheck {}

/// Memory is zero-filled at construction, at reset and for every allocation.
#[derive(Debug)]
pub enum Zeroed {}

/// Memory is handed out as-is. Views may observe bytes left behind by earlier
/// allocations.
#[derive(Debug)]
pub enum Uninitialized {}

impl sealed::Sealed for EnableBoundsCheck {}
impl sealed::Sealed for DisableBoundsCheck {}
impl sealed::Sealed for Zeroed {}
impl sealed::Sealed for Uninitialized {}

impl BoundsCheck for EnableBoundsCheck {
  const ENABLED: bool = true;
}

impl BoundsCheck for DisableBoundsCheck {
  const ENABLED: bool = false;
}

impl ZeroMemory for Zeroed {
  const ZEROED: bool = true;
}

impl ZeroMemory for Uninitialized {
  const ZEROED: bool = false;
}
