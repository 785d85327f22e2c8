//! # scratchpad - Fixed-Capacity Arena Allocator
//!
//! This crate provides a **bump arena**: a fixed-size byte region from which
//! plain-data values and arrays are carved out by advancing a cursor, with no
//! per-object bookkeeping. It is meant for per-request or per-frame scratch
//! memory on paths that cannot afford the general-purpose heap.
//!
//! ## Overview
//!
//! ```text
//!   Arena Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         REGION (capacity bytes)                      │
//!   │                                                                      │
//!   │   ┌─────┬─┬─────┬─────┬──┬─────┬──────────────────────────────────┐  │
//!   │   │ A1  │ │ A2  │ A3  │  │ A4  │            Free Space            │  │
//!   │   └─────┴─┴─────┴─────┴──┴─────┴──────────────────────────────────┘  │
//!   │   ▲                            ▲                                  ▲  │
//!   │   │                            │                                  │  │
//!   │ origin                       cursor                  origin + capacity
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Allocate: align the cursor, bump it past the request.     O(1)
//!   Free:     rewind the cursor, but only for the last view.  O(1)
//!   Reset:    cursor = origin (and re-zero under `Zeroed`).   O(1) / O(n)
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   scratchpad
//!   ├── align      - Alignment helpers (align_to!, checked_align_up)
//!   ├── arena      - Arena over a borrowed region
//!   ├── config     - ArenaConfig for owned regions
//!   ├── error      - ArenaError
//!   ├── native     - NativeBlock / NativeArena, regions owned via libc
//!   ├── policy     - Bounds-check and zero-memory policy tags
//!   └── view       - ArenaRef / ArenaSlice typed views
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use scratchpad::{Arena, ArenaError};
//!
//! let mut buffer = [0u8; 1024];
//! let mut arena: Arena = Arena::new(&mut buffer)?;
//!
//! let mut ids = arena.alloc_slice::<u32>(8)?;
//! assert!(ids.iter().all(|&id| id == 0));
//! ids[0] = 42;
//!
//! let total = arena.alloc_with(0.5f64)?;
//! assert_eq!(*total, 0.5);
//!
//! // LIFO: `ids` is not the most recent view, so it is handed back.
//! let ids = arena.free(ids).unwrap_err();
//! assert_eq!(arena.free(total).ok(), Some(8));
//! // Any padding in front of `ids` goes back with it.
//! assert!(arena.free(ids).is_ok());
//! assert!(arena.is_empty());
//!
//! arena.reset();
//! assert_eq!(arena.bytes_left(), 1024);
//! # Ok::<(), ArenaError>(())
//! ```
//!
//! ## Policies
//!
//! Two orthogonal policies are picked as type parameters, so an instantiation
//! pays only for what it asked for:
//!
//! ```text
//!   Arena<'a, B, Z>
//!             │  └── ZeroMemory:  Zeroed (default) | Uninitialized
//!             └───── BoundsCheck: EnableBoundsCheck (default) | DisableBoundsCheck
//! ```
//!
//! With `DisableBoundsCheck` the capacity comparison is compiled out. Such an
//! arena can only be built through `unsafe` constructors: running past the end
//! is undefined behavior, caught by debug assertions only.
//!
//! ## Backing Store
//!
//! ```text
//!   Borrowed                               Owned
//!   ┌──────────────────────┐               ┌──────────────────────────────┐
//!   │ &mut [u8] / raw parts│               │ NativeArena                  │
//!   │ (stack, Vec, pool)   │               │ ├── Arena                    │
//!   └──────────┬───────────┘               │ └── NativeBlock              │
//!              │                           │     posix_memalign / free    │
//!              ▼                           └──────────────────────────────┘
//!            Arena<'a>                      released exactly once on drop
//! ```
//!
//! ## Limitations
//!
//! - **Single writer**: an arena is `Send` but not `Sync`; use one per thread
//! - **Stack-discipline free**: only the most recent view can be given back;
//!   anything else stays reserved until `reset`
//! - **No growth**: capacity is fixed at construction
//! - **Plain data only**: element types must be `bytemuck::Pod`
//! - **Unix-only owned regions**: `NativeBlock` relies on `libc`
//!
//! ## Safety
//!
//! Views are ordinary borrows of the arena, so the borrow checker rules out
//! use-after-reset and aliasing between live views. The unsafe surface is
//! limited to building an arena from raw parts or without bounds checks.

pub mod align;
mod arena;
mod config;
mod error;
mod native;
pub mod policy;
mod view;

pub use align::checked_align_up;
pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::{ArenaError, Result};
pub use native::{NativeArena, NativeBlock};
pub use policy::{BoundsCheck, DisableBoundsCheck, EnableBoundsCheck, Uninitialized, ZeroMemory, Zeroed};
pub use view::{Allocation, ArenaRef, ArenaSlice};

/// Alignment used when a call does not ask for one: 16 bytes, enough for any
/// scalar up to `u128` and for SSE vectors.
pub const DEFAULT_ALIGNMENT: usize = 16;
