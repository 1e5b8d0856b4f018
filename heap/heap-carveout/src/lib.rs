//! # Physical Carveout Heap
//!
//! An allocator over one fixed, contiguous physical memory range reserved
//! ahead of time ("carved out" of system RAM). Callers receive buffers
//! described as scatter lists of physically contiguous extents; the heap
//! guarantees that no buffer's prior contents ever leak to a later
//! allocation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Heap Façade (heap)                  │
//! │    • operation table: allocate / free /             │
//! │      map_into_caller_space / pool_size              │
//! │    • optional device map/unmap collaborator         │
//! └───────────┬──────────────────────────┬──────────────┘
//!             │                          │
//! ┌───────────▼──────────────┐ ┌─────────▼──────────────┐
//! │  Zero-Fill Guard (zero)  │ │ Buffer / Scatter List  │
//! │   • whole-region sweep   │ │        (buffer)        │
//! │     at creation          │ │  • extent sequence     │
//! │   • per-extent sweep     │ │  • owned by the caller │
//! │     on free              │ │    until freed         │
//! └───────────┬──────────────┘ └─────────┬──────────────┘
//!             │                          │
//! ┌───────────▼──────────────────────────▼──────────────┐
//! │               Region Pool (pool)                    │
//! │    • free-space index over [base, base + size)      │
//! │    • first-fit take, coalescing give                │
//! │    • one spin lock, linearizable mutations          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Creation zeroes the entire range once; every free zeroes exactly the
//! released extents before they rejoin the free index. Allocation therefore
//! never needs to zero; what it hands out is clean by construction.
//!
//! The heap is a passive library: no internal threads, no deferred work.
//! All operations complete synchronously, and freeing a large buffer blocks
//! for the duration of its scrub.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod buffer;
mod error;
mod heap;
mod pool;
mod zero;

pub use buffer::{Buffer, Extent};
pub use error::{DeviceMapError, HeapError};
pub use heap::{AllocFlags, CallerSpace, CarveoutHeap, DeviceMapper, Heap, create_carveout_heap};
pub use pool::{HeapRegion, RegionPool};
pub use zero::{PhysMapper, ZeroFill};
