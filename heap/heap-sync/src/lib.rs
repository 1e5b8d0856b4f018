//! # Allocator synchronization primitives
//!
//! The carveout heap is a passive library entered by arbitrary concurrent
//! callers; the only mutable shared state is the free-space index, and it is
//! guarded by the [`SpinLock`] defined here. Critical sections are short
//! (a bounded scan over a small range list), which is exactly the regime a
//! spin lock is suited for.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
