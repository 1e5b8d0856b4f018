//! The heap façade: the operation table the generic heap framework drives,
//! plus the collaborator seams for device and caller-space mapping.

use alloc::boxed::Box;
use alloc::string::String;

use heap_addresses::{PAGE_SIZE, PhysicalAddress, is_aligned};

use crate::buffer::{Buffer, Extent};
use crate::error::{DeviceMapError, HeapError};
use crate::pool::{HeapRegion, RegionPool};
use crate::zero::{PhysMapper, ZeroFill};

bitflags::bitflags! {
    /// Allocation flags passed through the operation table.
    ///
    /// The carveout core accepts these and interprets none of them; policy
    /// decisions such as cached-vs-uncached mappings belong to the framework
    /// and mapping layers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AllocFlags: u32 {
        /// Caller asks for a CPU-cached mapping. Honored (or not) by the
        /// mapping layer.
        const CACHED = 1 << 0;
    }
}

/// Device-side map/unmap collaborator.
///
/// Bound at heap creation when the carveout serves a DMA-capable device;
/// absent otherwise, in which case the façade skips device interaction
/// entirely.
pub trait DeviceMapper: Send + Sync {
    /// Make the extents visible to the device.
    ///
    /// # Errors
    /// A refusal; the buffer stays allocated and unmapped.
    fn device_map(&self, extents: &[Extent]) -> Result<(), DeviceMapError>;

    /// Revoke the device's view of the extents.
    ///
    /// # Errors
    /// A refusal; on the free path the heap logs it and reclaims anyway.
    fn device_unmap(&self, extents: &[Extent]) -> Result<(), DeviceMapError>;
}

/// A caller address space accepting a buffer's extents.
///
/// The façade walks the scatter list in order and reports each extent with
/// its offset into the buffer; the target decides how (and where) to
/// establish the actual mapping.
pub trait CallerSpace {
    /// Map one extent at `offset` bytes into the buffer.
    ///
    /// # Errors
    /// Propagated to the `map_into_caller_space` caller unchanged.
    fn map_extent(&mut self, offset: u64, extent: Extent) -> Result<(), HeapError>;
}

/// The operation table a registered heap serves.
///
/// The framework holds heaps as trait objects and dispatches through this
/// table; nothing reaches into heap internals.
pub trait Heap: Send + Sync {
    /// Hand out a buffer of at least `size` bytes (rounded up to the heap's
    /// allocation alignment). Every byte of the returned buffer is zero.
    ///
    /// # Errors
    /// [`HeapError::OutOfSpace`] when no contiguous free extent fits;
    /// [`HeapError::InvalidConfiguration`] for a zero-size request.
    fn allocate(&self, size: u64, flags: AllocFlags) -> Result<Buffer, HeapError>;

    /// Take a buffer back: revoke any device mapping, scrub its extents,
    /// return the space to the pool. Consumes the buffer.
    fn free(&self, buffer: Buffer);

    /// Map a live buffer into `target`, device mapping first so the target
    /// observes device-coherent state.
    ///
    /// # Errors
    /// [`HeapError::DeviceMapFailure`] from the device collaborator, or
    /// whatever `target` returns; the buffer stays allocated either way.
    fn map_into_caller_space(
        &self,
        buffer: &Buffer,
        target: &mut dyn CallerSpace,
    ) -> Result<(), HeapError>;

    /// Total heap capacity in pages. Purely informational; reads only
    /// immutable state and takes no lock.
    fn pool_size(&self) -> u64;

    /// The heap's registration name.
    fn name(&self) -> &str;
}

/// A heap over one fixed, pre-reserved physical range.
pub struct CarveoutHeap<M> {
    name: String,
    pool: RegionPool,
    zero: ZeroFill<M>,
    device: Option<Box<dyn DeviceMapper>>,
}

/// Build a carveout heap over `[base, base + size)` and zero-fill the whole
/// range before returning.
///
/// `align` is the allocation granularity (a power of two); `device` binds
/// the optional DMA collaborator; `mapper` is how the heap reaches the
/// range's bytes for scrubbing.
///
/// # Errors
/// [`HeapError::InvalidConfiguration`] if `base` or `size` is not
/// page-aligned, `size` is zero, or `align` is not a power of two;
/// [`HeapError::OutOfMemory`] if index bookkeeping cannot be reserved. No
/// partial state survives a failure.
pub fn create_carveout_heap<M: PhysMapper>(
    base: PhysicalAddress,
    size: u64,
    align: u64,
    name: &str,
    device: Option<Box<dyn DeviceMapper>>,
    mapper: M,
) -> Result<CarveoutHeap<M>, HeapError> {
    if !base.is_aligned_to(PAGE_SIZE) {
        return Err(HeapError::InvalidConfiguration {
            reason: "region base is not page aligned",
        });
    }
    if !is_aligned(size, PAGE_SIZE) {
        return Err(HeapError::InvalidConfiguration {
            reason: "region size is not page aligned",
        });
    }
    let region = HeapRegion::new(base, size, align)?;
    let pool = RegionPool::new(region)?;

    // The security invariant starts here: the range is all-zero before the
    // first allocate can observe any of it.
    let zero = ZeroFill::new(mapper);
    zero.zero_range(base, size);

    log::info!(
        "carveout heap '{name}': {base}..{end}, {pages} pages, align {align:#x}",
        end = region.end(),
        pages = size / PAGE_SIZE,
    );

    Ok(CarveoutHeap {
        name: String::from(name),
        pool,
        zero,
        device,
    })
}

impl<M> CarveoutHeap<M> {
    /// The managed range.
    #[must_use]
    pub const fn region(&self) -> &HeapRegion {
        self.pool.region()
    }

    /// Currently unallocated bytes (observability; takes the pool lock).
    #[must_use]
    pub fn free_bytes(&self) -> u64 {
        self.pool.free_bytes()
    }
}

impl<M: PhysMapper + Send + Sync> Heap for CarveoutHeap<M> {
    fn allocate(&self, size: u64, flags: AllocFlags) -> Result<Buffer, HeapError> {
        // reserved; mapping policy is decided above this core
        let _ = flags;
        if size == 0 {
            return Err(HeapError::InvalidConfiguration {
                reason: "zero-size allocation",
            });
        }
        let extent = self.pool.take(size)?;
        log::debug!(
            "heap '{}': allocated {} bytes at {}",
            self.name,
            extent.len(),
            extent.base()
        );
        // No zeroing here. The extent is zero already: either untouched
        // since the creation sweep, or scrubbed on its way back in free().
        Ok(Buffer::from_extent(self.region().base(), extent))
    }

    fn free(&self, mut buffer: Buffer) {
        debug_assert_eq!(
            buffer.owner(),
            self.region().base(),
            "buffer freed into a heap that does not own it"
        );
        let extents = buffer.take_extents();

        // Revoke the device's view before the content is erased.
        if let Some(device) = self.device.as_deref() {
            if let Err(err) = device.device_unmap(&extents) {
                // Reclaiming the memory outranks a dangling device mapping;
                // absorb the failure.
                log::warn!("heap '{}': device unmap failed ({err}); reclaiming anyway", self.name);
            }
        }

        // Scrub before the extents become visible to take() again.
        self.zero.zero_extents(&extents);
        for extent in extents {
            self.pool.give(extent);
        }
    }

    fn map_into_caller_space(
        &self,
        buffer: &Buffer,
        target: &mut dyn CallerSpace,
    ) -> Result<(), HeapError> {
        if let Some(device) = self.device.as_deref() {
            device.device_map(buffer.extents())?;
        }
        let mut offset = 0u64;
        for extent in buffer.extents() {
            target.map_extent(offset, *extent)?;
            offset += extent.len();
        }
        Ok(())
    }

    fn pool_size(&self) -> u64 {
        self.region().size() / PAGE_SIZE
    }

    fn name(&self) -> &str {
        &self.name
    }
}
