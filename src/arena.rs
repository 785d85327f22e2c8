use std::{
  cell::Cell,
  fmt,
  marker::PhantomData,
  ptr,
  ptr::NonNull,
  sync::atomic::{AtomicU64, Ordering},
};

use bytemuck::Pod;

use crate::{
  ArenaError, DEFAULT_ALIGNMENT, Result, align_to,
  align::checked_align_up,
  policy::{BoundsCheck, DisableBoundsCheck, EnableBoundsCheck, ZeroMemory, Zeroed},
  view::{Allocation, ArenaRef, ArenaSlice, Grant},
};

/// Source of arena ids. Views carry the id of the arena that granted them.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// A fixed-capacity bump arena over a byte region.
///
/// ```text
///   origin                     cursor                          origin + capacity
///   │                          │                                               │
///   ▼                          ▼                                               ▼
///   ┌──────┬──┬───────┬───┬────┬───────────────────────────────────────────────┐
///   │  A1  │//│  A2   │///│ A3 │                 free                          │
///   └──────┴──┴───────┴───┴────┴───────────────────────────────────────────────┘
///             ▲           ▲
///             └───────────┴── alignment padding
/// ```
///
/// Allocation only moves the cursor forward. [`free`](Self::free) moves it back
/// for the most recent allocation only; [`reset`](Self::reset) moves it back to
/// the origin.
///
/// Views borrow the arena, so `reset` (which takes `&mut self`) cannot be called
/// while any of them is still alive.
///
/// The arena is `Send` but not `Sync`: use one arena per thread.
pub struct Arena<'a, B: BoundsCheck = EnableBoundsCheck, Z: ZeroMemory = Zeroed> {
  id: u64,
  origin: NonNull<u8>,
  cursor: Cell<usize>,
  capacity: usize,
  _region: PhantomData<&'a mut [u8]>,
  _policy: PhantomData<fn() -> (B, Z)>,
}

// SAFETY: the arena has exclusive access to its region for `'a`, just like the
// `&'a mut [u8]` it is usually built from. Views borrow the arena, so none of
// them can outlive a move to another thread. `Cell` keeps the arena `!Sync`.
unsafe impl<B: BoundsCheck, Z: ZeroMemory> Send for Arena<'_, B, Z> {}

impl<'a, Z: ZeroMemory> Arena<'a, EnableBoundsCheck, Z> {
  /// Builds a bounds-checked arena over a borrowed region.
  ///
  /// Fails with [`ArenaError::ZeroCapacity`] if `region` is empty.
  pub fn new(region: &'a mut [u8]) -> Result<Self> {
    let capacity = region.len();

    unsafe { Self::from_raw_parts(NonNull::from(region).cast::<u8>(), capacity) }
  }
}

impl<'a, Z: ZeroMemory> Arena<'a, DisableBoundsCheck, Z> {
  /// Builds an arena that never checks capacity on allocation.
  ///
  /// # Safety
  ///
  /// The caller guarantees that no sequence of allocations on this arena ever
  /// needs more than `region.len()` bytes, padding included, and that every
  /// requested alignment is a power of two. Violations are undefined behavior
  /// in release builds and a panic in debug builds.
  pub unsafe fn new_unchecked(region: &'a mut [u8]) -> Result<Self> {
    let capacity = region.len();

    unsafe { Self::from_raw_parts(NonNull::from(region).cast::<u8>(), capacity) }
  }
}

impl<'a, B: BoundsCheck, Z: ZeroMemory> Arena<'a, B, Z> {
  /// Builds an arena over `capacity` bytes starting at `origin`.
  ///
  /// # Safety
  ///
  /// `origin` must be valid for reads and writes of `capacity` initialized
  /// bytes, and nothing else may access that memory for `'a`. With
  /// [`DisableBoundsCheck`] the contract of [`Arena::new_unchecked`] applies too.
  pub unsafe fn from_raw_parts(
    origin: NonNull<u8>,
    capacity: usize,
  ) -> Result<Self> {
    if capacity == 0 {
      return Err(ArenaError::ZeroCapacity);
    }

    if Z::ZEROED {
      unsafe { ptr::write_bytes(origin.as_ptr(), 0, capacity) };
    }

    log::debug!(
      "arena over {:?}: {} bytes, bounds check {}, zeroed {}",
      origin,
      capacity,
      B::ENABLED,
      Z::ZEROED
    );

    Ok(Self {
      id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
      origin,
      cursor: Cell::new(0),
      capacity,
      _region: PhantomData,
      _policy: PhantomData,
    })
  }

  /// Allocates one `T` at [`DEFAULT_ALIGNMENT`].
  #[inline]
  pub fn alloc<T: Pod>(&self) -> Result<ArenaRef<'_, T>> {
    self.alloc_aligned(DEFAULT_ALIGNMENT)
  }

  /// Allocates one `T` at `alignment`, raised to `align_of::<T>()` if smaller.
  #[inline]
  pub fn alloc_aligned<T: Pod>(
    &self,
    alignment: usize,
  ) -> Result<ArenaRef<'_, T>> {
    let alignment = Self::alignment_for::<T>(alignment)?;
    let (ptr, grant) = self.bump(1, size_of::<T>(), alignment, Z::ZEROED)?;

    Ok(unsafe { ArenaRef::from_raw(ptr.cast::<T>(), grant) })
  }

  /// Allocates one `T` initialized to `value`.
  #[inline]
  pub fn alloc_with<T: Pod>(
    &self,
    value: T,
  ) -> Result<ArenaRef<'_, T>> {
    let alignment = Self::alignment_for::<T>(DEFAULT_ALIGNMENT)?;
    let (ptr, grant) = self.bump(1, size_of::<T>(), alignment, false)?;
    let ptr = ptr.cast::<T>();

    unsafe {
      ptr.write(value);
      Ok(ArenaRef::from_raw(ptr, grant))
    }
  }

  /// Allocates `count` contiguous `T`s at [`DEFAULT_ALIGNMENT`].
  #[inline]
  pub fn alloc_slice<T: Pod>(
    &self,
    count: usize,
  ) -> Result<ArenaSlice<'_, T>> {
    self.alloc_slice_aligned(count, DEFAULT_ALIGNMENT)
  }

  /// Allocates `count` contiguous `T`s at `alignment`, raised to
  /// `align_of::<T>()` if smaller.
  #[inline]
  pub fn alloc_slice_aligned<T: Pod>(
    &self,
    count: usize,
    alignment: usize,
  ) -> Result<ArenaSlice<'_, T>> {
    let alignment = Self::alignment_for::<T>(alignment)?;
    let (ptr, grant) = self.bump(count, size_of::<T>(), alignment, Z::ZEROED)?;

    Ok(unsafe { ArenaSlice::from_raw(ptr.cast::<T>(), count, grant) })
  }

  /// Allocates `count` contiguous copies of `value`.
  pub fn alloc_slice_fill<T: Pod>(
    &self,
    count: usize,
    value: T,
  ) -> Result<ArenaSlice<'_, T>> {
    let alignment = Self::alignment_for::<T>(DEFAULT_ALIGNMENT)?;
    let (ptr, grant) = self.bump(count, size_of::<T>(), alignment, false)?;
    let ptr = ptr.cast::<T>();

    unsafe {
      for i in 0..count {
        ptr.add(i).write(value);
      }

      Ok(ArenaSlice::from_raw(ptr, count, grant))
    }
  }

  /// Allocates a copy of `values`.
  pub fn alloc_slice_copy<T: Pod>(
    &self,
    values: &[T],
  ) -> Result<ArenaSlice<'_, T>> {
    let alignment = Self::alignment_for::<T>(DEFAULT_ALIGNMENT)?;
    let (ptr, grant) = self.bump(values.len(), size_of::<T>(), alignment, false)?;
    let ptr = ptr.cast::<T>();

    unsafe {
      ptr::copy_nonoverlapping(values.as_ptr(), ptr.as_ptr(), values.len());
      Ok(ArenaSlice::from_raw(ptr, values.len(), grant))
    }
  }

  /// Gives back the space of `view` if it is the most recent live allocation
  /// of this arena.
  ///
  /// On success the cursor rewinds to where it stood before the view was
  /// allocated, alignment padding included, and the number of bytes reclaimed
  /// is returned. Freeing every view in reverse order therefore leaves the
  /// arena empty.
  ///
  /// Otherwise nothing happens and the view is handed back in `Err`, so it can
  /// be freed again once everything allocated after it is gone. Views handed
  /// out by another arena, including one nested inside this arena's memory,
  /// are always handed back. This is a stack discipline, not a general free: a
  /// view dropped without being freed in LIFO order stays reserved until
  /// [`reset`](Self::reset).
  pub fn free<V: Allocation>(
    &self,
    view: V,
  ) -> std::result::Result<usize, V> {
    let grant = view.grant();
    let cursor = self.cursor.get();
    let start = view.address().wrapping_sub(self.origin.as_ptr() as usize);

    if grant.arena == self.id && start <= cursor && cursor - start == view.byte_len() {
      self.cursor.set(grant.rewind);
      Ok(cursor - grant.rewind)
    } else {
      Err(view)
    }
  }

  /// Rewinds the cursor to the origin, zero-filling the region under [`Zeroed`].
  pub fn reset(&mut self) {
    log::trace!("arena reset: {} of {} bytes were in use", self.cursor.get(), self.capacity);

    if Z::ZEROED {
      unsafe { ptr::write_bytes(self.origin.as_ptr(), 0, self.capacity) };
    }

    self.cursor.set(0);
  }

  /// Bytes between the cursor and the end of the region.
  #[inline]
  pub fn bytes_left(&self) -> usize {
    self.capacity - self.cursor.get()
  }

  /// Bytes between the origin and the cursor, padding included.
  #[inline]
  pub fn bytes_used(&self) -> usize {
    self.cursor.get()
  }

  /// Size of the region.
  #[inline]
  pub fn total_bytes(&self) -> usize {
    self.capacity
  }

  /// `true` if nothing has been allocated since construction or the last reset.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.cursor.get() == 0
  }

  /// Address of the first byte of the region.
  pub fn as_ptr(&self) -> *const u8 {
    self.origin.as_ptr()
  }

  /// `true` if `view` lies inside this arena's region.
  pub fn contains<V: Allocation>(
    &self,
    view: &V,
  ) -> bool {
    let start = view.address().wrapping_sub(self.origin.as_ptr() as usize);

    start <= self.capacity && view.byte_len() <= self.capacity - start
  }

  fn alignment_for<T>(alignment: usize) -> Result<usize> {
    if B::ENABLED && !alignment.is_power_of_two() {
      return Err(ArenaError::InvalidAlignment { alignment });
    }
    debug_assert!(alignment.is_power_of_two(), "alignment {alignment} is not a power of two");

    Ok(alignment.max(align_of::<T>()))
  }

  /// Moves the cursor past `count * size` bytes aligned to `alignment` and
  /// returns the start of that range, with the grant that lets `free` undo it.
  #[inline]
  fn bump(
    &self,
    count: usize,
    size: usize,
    alignment: usize,
    zero: bool,
  ) -> Result<(NonNull<u8>, Grant)> {
    let base = self.origin.as_ptr() as usize;
    let cursor = self.cursor.get();

    let (start, end) = if B::ENABLED {
      let start = checked_align_up(base + cursor, alignment).map(|addr| addr - base);
      let end = start.zip(count.checked_mul(size)).and_then(|(start, len)| start.checked_add(len));

      match (start, end) {
        (Some(start), Some(end)) if end <= self.capacity => (start, end),
        (_, end) => {
          let requested = end.map_or(usize::MAX, |end| end - cursor);
          log::debug!(
            "arena allocation refused: {} bytes requested, {} left",
            requested,
            self.capacity - cursor
          );

          return Err(ArenaError::OutOfMemory {
            requested,
            available: self.capacity - cursor,
          });
        }
      }
    } else {
      let start = align_to!(base + cursor, alignment) - base;
      let end = start.wrapping_add(count.wrapping_mul(size));
      debug_assert!(
        start <= end && end <= self.capacity,
        "unchecked arena overflow: {} bytes requested, {} left",
        end.wrapping_sub(cursor),
        self.capacity - cursor
      );

      (start, end)
    };

    self.cursor.set(end);

    let ptr = unsafe { self.origin.add(start) };
    if zero {
      unsafe { ptr::write_bytes(ptr.as_ptr(), 0, end - start) };
    }

    let grant = Grant {
      arena: self.id,
      rewind: cursor,
    };

    Ok((ptr, grant))
  }
}

impl<B: BoundsCheck, Z: ZeroMemory> fmt::Debug for Arena<'_, B, Z> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Arena")
      .field("origin", &self.origin)
      .field("bytes_used", &self.bytes_used())
      .field("total_bytes", &self.capacity)
      .field("bounds_check", &B::ENABLED)
      .field("zeroed", &Z::ZEROED)
      .finish()
  }
}
