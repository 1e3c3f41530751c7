//! Reference-counted raw byte buffers.
//!
//! A [`Buffer`] either owns its allocation outright or adopts memory owned by
//! someone else, in which case a caller-supplied [`BufferRemover`] runs
//! exactly once when the last holder releases the buffer. Multiple arrays and
//! views may hold one buffer at the same time; clones are cheap handle copies.
//!
//! The buffer hands out bytes and raw pointers only; element-level access
//! and its exclusivity rules live on [`crate::buffer::typed::TypedArray`].
//! Writing through [`Buffer::as_mut_ptr`] is raw-pointer territory: the
//! writer must rule out overlapping access through every other holder.

use crate::mesh_error::MeshPlexError;
use log::trace;
use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::slice;
use std::sync::Arc;

/// Alignment of owned allocations. Large enough for every scalar kind, so an
/// owned buffer can be viewed under any of them.
const BUFFER_ALIGN: usize = 8;

/// Finalizer for adopted memory, invoked exactly once with the adopted
/// pointer and byte length when the last buffer holder drops.
pub type BufferRemover = Box<dyn FnOnce(*mut u8, usize) + Send>;

enum Release {
    /// Allocated by this crate; deallocated on last release.
    Owned,
    /// Borrowed from an external owner; release delegates to the remover.
    Adopted(Option<BufferRemover>),
}

struct RawRegion {
    ptr: NonNull<u8>,
    len: usize,
    release: Release,
}

// SAFETY: the region is a plain byte span. Mutation of the span is gated by
// the typed layer (exclusive holder, or an unsafe path whose caller rules
// out overlapping access), the remover is `Send`, and the remover is only
// invoked once, from the single thread that drops the last holder.
unsafe impl Send for RawRegion {}
unsafe impl Sync for RawRegion {}

impl Drop for RawRegion {
    fn drop(&mut self) {
        match &mut self.release {
            Release::Owned => {
                if self.len != 0 {
                    // SAFETY: identical to the layout used at allocation,
                    // which was validated there.
                    let layout =
                        unsafe { Layout::from_size_align_unchecked(self.len, BUFFER_ALIGN) };
                    unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
                }
            }
            Release::Adopted(remover) => {
                if let Some(remover) = remover.take() {
                    remover(self.ptr.as_ptr(), self.len);
                }
            }
        }
    }
}

/// Reference-counted byte span backing typed arrays.
#[derive(Clone)]
pub struct Buffer {
    region: Arc<RawRegion>,
}

impl Buffer {
    /// Allocate an exclusively-owned, zero-initialized buffer of `nbytes`.
    ///
    /// The allocation is aligned for every scalar kind. A zero-byte request
    /// allocates nothing.
    ///
    /// # Errors
    /// Returns `Err(InvalidSize)` if `nbytes` exceeds what a single
    /// allocation layout can describe.
    pub fn try_allocate(nbytes: usize) -> Result<Self, MeshPlexError> {
        if nbytes == 0 {
            return Ok(Self::empty());
        }
        let layout = Layout::from_size_align(nbytes, BUFFER_ALIGN)
            .map_err(|_| MeshPlexError::InvalidSize("byte size too large to allocate"))?;
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(ptr) else {
            alloc::handle_alloc_error(layout);
        };
        trace!("allocated owned buffer of {nbytes} bytes");
        Ok(Self {
            region: Arc::new(RawRegion {
                ptr,
                len: nbytes,
                release: Release::Owned,
            }),
        })
    }

    /// Adopt externally-owned memory without copying.
    ///
    /// The buffer never frees the memory itself; `remover` runs exactly once,
    /// with `(ptr, nbytes)`, when the last holder drops.
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes of `nbytes` bytes for the
    /// whole lifetime of the returned buffer and every clone of it, and must
    /// not be freed by anyone except `remover`.
    pub unsafe fn adopt(ptr: NonNull<u8>, nbytes: usize, remover: BufferRemover) -> Self {
        trace!("adopted external buffer of {nbytes} bytes");
        Self {
            region: Arc::new(RawRegion {
                ptr,
                len: nbytes,
                release: Release::Adopted(Some(remover)),
            }),
        }
    }

    /// Adopt a `Vec<u8>` without copying. The vector is dropped when the last
    /// buffer holder releases.
    pub fn from_vec(mut bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        let len = bytes.len();
        let cap = bytes.capacity();
        let ptr = bytes.as_mut_ptr();
        std::mem::forget(bytes);
        let remover: BufferRemover = Box::new(move |p, _nbytes| {
            // SAFETY: reconstitutes exactly the vector forgotten above.
            drop(unsafe { Vec::from_raw_parts(p, len, cap) });
        });
        // SAFETY: the forgotten vector keeps the allocation alive until the
        // remover reconstitutes and drops it.
        unsafe { Self::adopt(NonNull::new_unchecked(ptr), len, remover) }
    }

    fn empty() -> Self {
        Self {
            region: Arc::new(RawRegion {
                // Aligned dangling pointer so zero-length typed views of any
                // kind stay well-formed.
                ptr: NonNull::<u64>::dangling().cast(),
                len: 0,
                release: Release::Owned,
            }),
        }
    }

    /// Byte length of the span.
    #[inline]
    pub fn len(&self) -> usize {
        self.region.len
    }

    /// Whether the span is zero bytes long.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.region.len == 0
    }

    /// Read-only view of the whole span.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the region is valid for `len` bytes for the lifetime of
        // `self`.
        unsafe { slice::from_raw_parts(self.region.ptr.as_ptr(), self.region.len) }
    }

    /// Start address of the span.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.region.ptr.as_ptr()
    }

    /// Mutable start address of the span. Writing through this pointer
    /// requires ruling out overlapping access through every other holder.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.region.ptr.as_ptr()
    }

    /// Number of live holders of this buffer, including `self`.
    #[inline]
    pub fn holder_count(&self) -> usize {
        Arc::strong_count(&self.region)
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.region.len)
            .field("holders", &self.holder_count())
            .field(
                "adopted",
                &matches!(self.region.release, Release::Adopted(_)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn allocate_is_zeroed() {
        let buf = Buffer::try_allocate(64).unwrap();
        assert_eq!(buf.len(), 64);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_byte_allocation() {
        let buf = Buffer::try_allocate(0).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.as_slice(), &[] as &[u8]);
    }

    #[test]
    fn clone_bumps_holder_count() {
        let buf = Buffer::try_allocate(8).unwrap();
        assert_eq!(buf.holder_count(), 1);
        let other = buf.clone();
        assert_eq!(buf.holder_count(), 2);
        drop(other);
        assert_eq!(buf.holder_count(), 1);
    }

    #[test]
    fn from_vec_is_zero_copy() {
        let v = vec![1u8, 2, 3, 4];
        let addr = v.as_ptr() as usize;
        let buf = Buffer::from_vec(v);
        assert_eq!(buf.as_ptr() as usize, addr);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn remover_runs_exactly_once_on_last_release() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let mut backing = vec![0u8; 16];
        let ptr = NonNull::new(backing.as_mut_ptr()).unwrap();
        let buf = unsafe {
            Buffer::adopt(
                ptr,
                backing.len(),
                Box::new(|_, _| {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                }),
            )
        };
        let clone_a = buf.clone();
        let clone_b = clone_a.clone();
        drop(buf);
        drop(clone_a);
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
        drop(clone_b);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
