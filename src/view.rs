//! Typed views into arena memory.
//!
//! A view is a plain mutable borrow of the bytes the arena carved out. It owns
//! nothing: dropping it leaves the bytes reserved until the arena is reset, and
//! handing it back to [`Arena::free`](crate::Arena::free) is the only way to
//! give the space back early.

use std::{
  fmt,
  ops::{Deref, DerefMut},
  ptr::NonNull,
};

use bytemuck::Pod;

mod sealed {
  /// Which arena handed out a view, and where its cursor stood before the view
  /// was aligned.
  #[derive(Clone, Copy, Debug, PartialEq, Eq)]
  pub struct Grant {
    pub arena: u64,
    pub rewind: usize,
  }

  pub trait Sealed {
    fn grant(&self) -> Grant;
  }
}

pub(crate) use sealed::Grant;

/// Anything [`Arena::free`](crate::Arena::free) accepts.
pub trait Allocation: sealed::Sealed {
  /// Address of the first byte.
  fn address(&self) -> usize;

  /// Length of the view in bytes.
  fn byte_len(&self) -> usize;
}

/// A single value carved out of an arena.
pub struct ArenaRef<'a, T: Pod> {
  value: &'a mut T,
  grant: Grant,
}

impl<'a, T: Pod> ArenaRef<'a, T> {
  /// # Safety
  ///
  /// `ptr` must be aligned for `T`, point to `size_of::<T>()` initialized bytes
  /// and not be aliased for `'a`.
  pub(crate) unsafe fn from_raw(
    ptr: NonNull<T>,
    grant: Grant,
  ) -> Self {
    Self {
      value: unsafe { &mut *ptr.as_ptr() },
      grant,
    }
  }

  /// Raw pointer to the value.
  pub fn as_ptr(&self) -> *const T {
    &*self.value
  }

  /// The value's bytes.
  pub fn as_bytes(&self) -> &[u8] {
    bytemuck::bytes_of(&*self.value)
  }

  /// The value's bytes, mutably.
  pub fn as_bytes_mut(&mut self) -> &mut [u8] {
    bytemuck::bytes_of_mut(&mut *self.value)
  }

  /// Give up the view and keep a plain reference. The space can then only be
  /// reclaimed by resetting the arena.
  pub fn into_mut(self) -> &'a mut T {
    self.value
  }
}

impl<T: Pod> Deref for ArenaRef<'_, T> {
  type Target = T;

  fn deref(&self) -> &T {
    self.value
  }
}

impl<T: Pod> DerefMut for ArenaRef<'_, T> {
  fn deref_mut(&mut self) -> &mut T {
    self.value
  }
}

impl<T: Pod + fmt::Debug> fmt::Debug for ArenaRef<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("ArenaRef")
      .field("address", &self.as_ptr())
      .field("value", &*self.value)
      .finish()
  }
}

impl<T: Pod> sealed::Sealed for ArenaRef<'_, T> {
  fn grant(&self) -> Grant {
    self.grant
  }
}

impl<T: Pod> Allocation for ArenaRef<'_, T> {
  fn address(&self) -> usize {
    self.as_ptr() as usize
  }

  fn byte_len(&self) -> usize {
    size_of::<T>()
  }
}

/// A contiguous array carved out of an arena.
pub struct ArenaSlice<'a, T: Pod> {
  values: &'a mut [T],
  grant: Grant,
}

impl<'a, T: Pod> ArenaSlice<'a, T> {
  /// # Safety
  ///
  /// `ptr` must be aligned for `T`, point to `len * size_of::<T>()` initialized
  /// bytes and not be aliased for `'a`.
  pub(crate) unsafe fn from_raw(
    ptr: NonNull<T>,
    len: usize,
    grant: Grant,
  ) -> Self {
    Self {
      values: unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), len) },
      grant,
    }
  }

  /// The elements' bytes.
  pub fn as_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&*self.values)
  }

  /// The elements' bytes, mutably.
  pub fn as_bytes_mut(&mut self) -> &mut [u8] {
    bytemuck::cast_slice_mut(&mut *self.values)
  }

  /// Give up the view and keep a plain slice. The space can then only be
  /// reclaimed by resetting the arena.
  pub fn into_mut_slice(self) -> &'a mut [T] {
    self.values
  }
}

impl<T: Pod> Deref for ArenaSlice<'_, T> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.values
  }
}

impl<T: Pod> DerefMut for ArenaSlice<'_, T> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.values
  }
}

impl<T: Pod + fmt::Debug> fmt::Debug for ArenaSlice<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("ArenaSlice")
      .field("address", &self.values.as_ptr())
      .field("values", &&*self.values)
      .finish()
  }
}

impl<T: Pod> sealed::Sealed for ArenaSlice<'_, T> {
  fn grant(&self) -> Grant {
    self.grant
  }
}

impl<T: Pod> Allocation for ArenaSlice<'_, T> {
  fn address(&self) -> usize {
    self.values.as_ptr() as usize
  }

  fn byte_len(&self) -> usize {
    size_of_val(&*self.values)
  }
}
