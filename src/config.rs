//! Sizing for owned arenas.

use serde::{Deserialize, Serialize};

use crate::{ArenaError, DEFAULT_ALIGNMENT, Result};

/// Configuration for a [`NativeArena`](crate::NativeArena).
///
/// Both values are fixed once the arena is built. `alignment` is the base
/// alignment of the owned block; allocations asking for more than this still
/// land on correctly aligned addresses, but the padding they need then
/// depends on where the system allocator placed the block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
  /// Size of the region in bytes. Must be non-zero.
  pub capacity: usize,

  /// Base alignment of the region. Must be a power of two.
  pub alignment: usize,
}

impl ArenaConfig {
  /// Default capacity: 64 KiB.
  pub const DEFAULT_CAPACITY: usize = 64 * 1024;

  /// Create a config for `capacity` bytes at the default base alignment.
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      alignment: DEFAULT_ALIGNMENT,
    }
  }

  /// Replace the base alignment.
  pub fn with_alignment(
    mut self,
    alignment: usize,
  ) -> Self {
    self.alignment = alignment;
    self
  }

  /// Check both fields.
  pub fn validate(&self) -> Result<()> {
    if self.capacity == 0 {
      return Err(ArenaError::ZeroCapacity);
    }

    if !self.alignment.is_power_of_two() {
      return Err(ArenaError::InvalidAlignment {
        alignment: self.alignment,
      });
    }

    Ok(())
  }
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_CAPACITY)
  }
}
