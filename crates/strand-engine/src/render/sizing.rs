//! Size arithmetic for the wgpu buffer slab.

/// Smallest device buffer the binding allocates.
pub(crate) const MIN_CAPACITY: u64 = 256;

/// Length of an upload of `len` bytes once padded to `COPY_BUFFER_ALIGNMENT`.
pub(crate) fn padded_len(len: u64) -> u64 {
    len.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT
}

/// Capacity of the device buffer an upload of `padded` bytes must go to, or
/// `None` when the current allocation can take it in place.
///
/// A buffer still referenced by a queued draw is never written in place: the
/// queued draw must keep seeing the bytes it was issued with.
pub(crate) fn reallocation(current: Option<u64>, padded: u64, referenced: bool) -> Option<u64> {
    match current {
        Some(capacity) if capacity >= padded && !referenced => None,
        Some(capacity) if capacity >= padded => Some(capacity),
        _ => Some(padded.next_power_of_two().max(MIN_CAPACITY)),
    }
}

/// Whole elements of `components` 4-byte scalars in `len` bytes.
pub(crate) fn elements(len: u64, components: u32) -> u64 {
    match components {
        0 => 0,
        c => len / (4 * c as u64),
    }
}

/// Whether `first..first + count` lies within `available` elements.
pub(crate) fn range_fits(first: u32, count: u32, available: u64) -> bool {
    first as u64 + count as u64 <= available
}
