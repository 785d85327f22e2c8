use std::{ops::Deref, ptr, ptr::NonNull};

use libc::{c_void, posix_memalign};

use crate::{
  Arena, ArenaConfig, ArenaError, Result,
  policy::{BoundsCheck, DisableBoundsCheck, EnableBoundsCheck, ZeroMemory, Zeroed},
};

/// A heap block owned by the arena machinery.
///
/// Acquired with `posix_memalign(3)` and returned with `free(3)` exactly once,
/// when the block is dropped. The block is zero-filled on acquisition, so every
/// byte is initialized no matter which [`ZeroMemory`] policy later runs over it.
#[derive(Debug)]
pub struct NativeBlock {
  ptr: NonNull<u8>,
  size: usize,
  alignment: usize,
}

// SAFETY: the block is uniquely owned and carries no thread-local state.
unsafe impl Send for NativeBlock {}

impl NativeBlock {
  /// Acquires `config.capacity` bytes aligned to `config.alignment`.
  ///
  /// Alignments below the pointer size are raised to it, as `posix_memalign`
  /// requires.
  pub fn acquire(config: &ArenaConfig) -> Result<Self> {
    config.validate()?;

    let size = config.capacity;
    let alignment = config.alignment.max(size_of::<*mut c_void>());
    let mut raw: *mut c_void = ptr::null_mut();

    let status = unsafe { posix_memalign(&mut raw, alignment, size) };
    let ptr = match NonNull::new(raw.cast::<u8>()) {
      Some(ptr) if status == 0 => ptr,
      _ => {
        log::debug!("posix_memalign({alignment}, {size}) failed with status {status}");
        return Err(ArenaError::AcquireFailed { size, alignment });
      }
    };

    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };

    log::debug!("acquired {size} byte block at {ptr:?} (alignment {alignment})");

    Ok(Self { ptr, size, alignment })
  }

  /// Address of the first byte.
  pub fn as_ptr(&self) -> *const u8 {
    self.ptr.as_ptr()
  }

  /// Size in bytes.
  pub fn len(&self) -> usize {
    self.size
  }

  /// Always `false`: empty blocks are rejected on acquisition.
  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// Base alignment actually requested from the system.
  pub fn alignment(&self) -> usize {
    self.alignment
  }
}

impl Drop for NativeBlock {
  fn drop(&mut self) {
    log::debug!("releasing {} byte block at {:?}", self.size, self.ptr);

    unsafe { libc::free(self.ptr.as_ptr().cast::<c_void>()) };
  }
}

/// An [`Arena`] over a [`NativeBlock`] it owns.
///
/// Dropping the `NativeArena` releases the block, on every exit path. The inner
/// arena is reachable through `Deref`; only shared access is handed out, so it
/// can never be swapped away from the block it points into.
///
/// ```rust
/// use scratchpad::NativeArena;
///
/// let mut arena: NativeArena = NativeArena::new(4096)?;
///
/// let header = arena.alloc_with(0xCAFEu32)?;
/// let body = arena.alloc_slice::<u8>(128)?;
/// assert_eq!(*header, 0xCAFE);
/// assert_eq!(body.len(), 128);
/// drop((header, body));
///
/// arena.reset();
/// assert_eq!(arena.bytes_left(), 4096);
/// # Ok::<(), scratchpad::ArenaError>(())
/// ```
pub struct NativeArena<B: BoundsCheck = EnableBoundsCheck, Z: ZeroMemory = Zeroed> {
  // Declared before `block` so it is dropped first.
  arena: Arena<'static, B, Z>,
  block: NativeBlock,
}

impl<Z: ZeroMemory> NativeArena<EnableBoundsCheck, Z> {
  /// Acquires `capacity` bytes at the default base alignment.
  pub fn new(capacity: usize) -> Result<Self> {
    Self::with_config(&ArenaConfig::new(capacity))
  }

  /// Acquires a block sized and aligned as `config` says.
  pub fn with_config(config: &ArenaConfig) -> Result<Self> {
    unsafe { Self::build(config) }
  }
}

impl<Z: ZeroMemory> NativeArena<DisableBoundsCheck, Z> {
  /// Unchecked counterpart of [`NativeArena::new`].
  ///
  /// # Safety
  ///
  /// Same contract as [`Arena::new_unchecked`].
  pub unsafe fn new_unchecked(capacity: usize) -> Result<Self> {
    unsafe { Self::with_config_unchecked(&ArenaConfig::new(capacity)) }
  }

  /// Unchecked counterpart of [`NativeArena::with_config`].
  ///
  /// # Safety
  ///
  /// Same contract as [`Arena::new_unchecked`].
  pub unsafe fn with_config_unchecked(config: &ArenaConfig) -> Result<Self> {
    unsafe { Self::build(config) }
  }
}

impl<B: BoundsCheck, Z: ZeroMemory> NativeArena<B, Z> {
  unsafe fn build(config: &ArenaConfig) -> Result<Self> {
    let block = NativeBlock::acquire(config)?;

    // The block lives on the heap, so moving it into `Self` keeps the address
    // stable, and it outlives the arena by field order.
    let arena = unsafe { Arena::from_raw_parts(block.ptr, block.size)? };

    Ok(Self { arena, block })
  }

  /// Rewinds the inner arena to its origin. See [`Arena::reset`].
  pub fn reset(&mut self) {
    self.arena.reset();
  }

  /// The owned block.
  pub fn block(&self) -> &NativeBlock {
    &self.block
  }
}

impl<B: BoundsCheck, Z: ZeroMemory> Deref for NativeArena<B, Z> {
  type Target = Arena<'static, B, Z>;

  fn deref(&self) -> &Self::Target {
    &self.arena
  }
}

impl<B: BoundsCheck, Z: ZeroMemory> std::fmt::Debug for NativeArena<B, Z> {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("NativeArena")
      .field("arena", &self.arena)
      .field("block", &self.block)
      .finish()
  }
}
