//! Buffer descriptors and their scatter lists.

use alloc::vec::Vec;
use core::mem;

use heap_addresses::PhysicalAddress;

/// One physically contiguous run of bytes: `(base, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Extent {
    base: PhysicalAddress,
    len: u64,
}

impl Extent {
    #[must_use]
    pub const fn new(base: PhysicalAddress, len: u64) -> Self {
        Self { base, len }
    }

    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.base
    }

    #[must_use]
    pub const fn len(self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// First address past the run.
    #[must_use]
    pub fn end(self) -> PhysicalAddress {
        self.base
            .checked_add(self.len)
            .expect("extent end overflows the address space")
    }

    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.base < other.end() && other.base < self.end()
    }
}

/// The unit handed to callers: an ordered scatter list of [`Extent`]s plus
/// the total allocation size.
///
/// The carveout pool always produces a single extent per buffer, but the
/// descriptor carries a sequence so scatter-gather consumers (and future
/// non-contiguous pools) need no contract change.
///
/// A `Buffer` is exclusively owned by the caller from allocation until it is
/// passed back to [`Heap::free`](crate::Heap::free), which consumes it, so a
/// second free does not compile. Extents are read-only; resizing in place is
/// unsupported, allocate a new buffer instead.
#[derive(Debug)]
#[must_use]
pub struct Buffer {
    /// Address-ordered, pairwise disjoint.
    extents: Vec<Extent>,
    /// Requested size rounded up to the pool's allocation alignment.
    size: u64,
    /// Base address of the owning region, used to catch cross-heap frees.
    owner: PhysicalAddress,
}

impl Buffer {
    pub(crate) fn from_extent(owner: PhysicalAddress, extent: Extent) -> Self {
        Self {
            extents: alloc::vec![extent],
            size: extent.len(),
            owner,
        }
    }

    /// Total size in bytes (the request rounded up to the pool alignment).
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// The scatter list, in address order.
    #[must_use]
    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    pub(crate) const fn owner(&self) -> PhysicalAddress {
        self.owner
    }

    /// Detach the scatter list for reclamation, leaving the descriptor
    /// empty so its `Drop` stays quiet.
    pub(crate) fn take_extents(&mut self) -> Vec<Extent> {
        mem::take(&mut self.extents)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        // Free-path reclamation detaches the extents first. A buffer dropped
        // with extents still attached was never freed: its physical range is
        // now unreachable and will never be zeroed or reused.
        if !self.extents.is_empty() {
            log::error!(
                "buffer of {} bytes at {} dropped without free; physical range leaked",
                self.size,
                self.extents[0].base()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_end_and_overlap() {
        let a = Extent::new(PhysicalAddress::new(0x1000), 0x1000);
        let b = Extent::new(PhysicalAddress::new(0x2000), 0x1000);
        let c = Extent::new(PhysicalAddress::new(0x1800), 0x100);

        assert_eq!(a.end(), PhysicalAddress::new(0x2000));
        assert!(!a.overlaps(b));
        assert!(!b.overlaps(a));
        assert!(a.overlaps(c));
        assert!(c.overlaps(a));
    }

    #[test]
    fn buffer_exposes_its_scatter_list() {
        let extent = Extent::new(PhysicalAddress::new(0x4000), 0x2000);
        let mut buffer = Buffer::from_extent(PhysicalAddress::new(0x4000), extent);

        assert_eq!(buffer.size(), 0x2000);
        assert_eq!(buffer.extents(), &[extent]);

        let detached = buffer.take_extents();
        assert_eq!(detached, alloc::vec![extent]);
        assert!(buffer.extents().is_empty());
    }
}
