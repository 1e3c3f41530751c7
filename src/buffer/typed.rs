//! Shape-described typed views over raw buffers.
//!
//! A [`TypedArray<T>`] couples a [`Shape`], a [`Buffer`], and row-major
//! strides for one fixed scalar type. The construction invariant, checked at
//! every constructor, is that the buffer's byte length equals exactly the
//! byte count the shape and kind require, that the buffer start is aligned
//! for `T`, and that every byte is a valid `T` encoding. Cloning an array
//! aliases the same buffer.
//!
//! Safe mutation is reserved for an exclusive holder: the `_mut` accessors
//! return `None` (and [`TypedArray::try_fill`] errs) while clones or views
//! share the buffer. Aliased writers go through the unsafe
//! [`TypedArray::as_mut_slice_shared`] path and carry its contract.

use crate::buffer::buffer::{Buffer, BufferRemover};
use crate::buffer::scalar::PlexScalar;
use crate::buffer::shape::Shape;
use crate::mesh_error::MeshPlexError;
use std::mem;
use std::ptr::NonNull;
use std::slice;

/// Dense, row-major array of one scalar type over a shared buffer.
#[derive(Clone, Debug)]
pub struct TypedArray<T: PlexScalar> {
    shape: Shape,
    strides: Vec<usize>,
    len: usize,
    buffer: Buffer,
    _marker: std::marker::PhantomData<T>,
}

impl<T: PlexScalar> TypedArray<T> {
    /// Allocate a zero-initialized array of the given shape.
    pub fn try_zeroed(shape: Shape) -> Result<Self, MeshPlexError> {
        let len = shape.element_count()?;
        let nbytes = byte_size::<T>(len)?;
        let buffer = Buffer::try_allocate(nbytes)?;
        // Owned buffers are 8-aligned, so the alignment check cannot fire.
        Self::try_view(shape, buffer)
    }

    /// Allocate an array of the given shape with every element set to `value`.
    pub fn try_filled(shape: Shape, value: T) -> Result<Self, MeshPlexError> {
        let mut array = Self::try_zeroed(shape)?;
        // The buffer is fresh, so the fill cannot hit the sharing gate.
        array.try_fill(value)?;
        Ok(array)
    }

    /// Reinterpret an existing buffer under `shape`.
    ///
    /// # Errors
    /// `Err(ShapeMismatch)` if the buffer's byte size does not equal the
    /// shape's requirement exactly; `Err(MisalignedBuffer)` if the buffer
    /// start is not aligned for `T`; `Err(InvalidBitPattern)` if a byte is
    /// not a valid `T` encoding (`bool` buffers must hold only 0 and 1).
    pub fn try_view(shape: Shape, buffer: Buffer) -> Result<Self, MeshPlexError> {
        let len = shape.element_count()?;
        let expected = byte_size::<T>(len)?;
        if expected != buffer.len() {
            return Err(MeshPlexError::ShapeMismatch {
                expected,
                found: buffer.len(),
            });
        }
        // Empty slices still require an aligned pointer.
        let addr = buffer.as_ptr() as usize;
        if addr % mem::align_of::<T>() != 0 {
            return Err(MeshPlexError::MisalignedBuffer {
                kind: T::KIND,
                addr,
            });
        }
        T::validate_bytes(buffer.as_slice())?;
        let strides = shape.row_major_strides();
        Ok(Self {
            shape,
            strides,
            len,
            buffer,
            _marker: std::marker::PhantomData,
        })
    }

    /// Adopt a vector's storage without copying. The vector is dropped when
    /// the array and every view sharing its buffer are released.
    ///
    /// # Errors
    /// `Err(ShapeMismatch)` if the vector length differs from the shape's
    /// element count.
    pub fn from_vec(shape: Shape, mut values: Vec<T>) -> Result<Self, MeshPlexError> {
        let count = shape.element_count()?;
        if count != values.len() {
            return Err(MeshPlexError::ShapeMismatch {
                expected: byte_size::<T>(count)?,
                found: values.len() * mem::size_of::<T>(),
            });
        }
        if values.is_empty() {
            return Self::try_zeroed(shape);
        }
        let len = values.len();
        let cap = values.capacity();
        let ptr = values.as_mut_ptr();
        std::mem::forget(values);
        let remover: BufferRemover = Box::new(move |p, _nbytes| {
            // SAFETY: reconstitutes exactly the vector forgotten above.
            drop(unsafe { Vec::from_raw_parts(p.cast::<T>(), len, cap) });
        });
        // SAFETY: the forgotten vector keeps the allocation alive until the
        // remover reconstitutes it; Vec allocations are aligned for T.
        let buffer =
            unsafe { Buffer::adopt(NonNull::new_unchecked(ptr.cast()), len * mem::size_of::<T>(), remover) };
        Self::try_view(shape, buffer)
    }

    /// The array's shape.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Row-major element strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte size of the element storage.
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.buffer.len()
    }

    /// The backing buffer handle.
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Read-only view of all elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: byte length, alignment, and bit validity were checked at
        // construction.
        unsafe { slice::from_raw_parts(self.buffer.as_ptr().cast::<T>(), self.len) }
    }

    /// Mutable view of all elements in row-major order, or `None` while
    /// clones or views share the buffer.
    ///
    /// Holding `&mut self` on the only handle rules out a competing borrow,
    /// so the returned slice is exclusive. The aliased path is
    /// [`as_mut_slice_shared`](Self::as_mut_slice_shared).
    #[inline]
    pub fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        if self.buffer.holder_count() != 1 {
            return None;
        }
        // SAFETY: construction checks as in `as_slice`, and exclusivity was
        // just established through the holder count.
        Some(unsafe { slice::from_raw_parts_mut(self.buffer.as_mut_ptr().cast::<T>(), self.len) })
    }

    /// Mutable view of all elements through a handle whose buffer other
    /// handles may hold.
    ///
    /// # Safety
    /// For the lifetime of the returned slice, no other access to the
    /// buffer's bytes may happen through any handle, on this or any other
    /// thread. For `bool` arrays the caller must also write only 0 or 1
    /// bytes.
    #[inline]
    pub unsafe fn as_mut_slice_shared(&mut self) -> &mut [T] {
        // SAFETY: construction checks as in `as_slice`; exclusivity of
        // access is the caller's contract.
        unsafe { slice::from_raw_parts_mut(self.buffer.as_mut_ptr().cast::<T>(), self.len) }
    }

    /// Write `value` to every element. O(element count).
    ///
    /// # Errors
    /// `Err(SharedBuffer)` while other handles hold the buffer; the array is
    /// untouched.
    pub fn try_fill(&mut self, value: T) -> Result<(), MeshPlexError> {
        let holders = self.buffer.holder_count();
        match self.as_mut_slice() {
            Some(slice) => {
                slice.fill(value);
                Ok(())
            }
            None => Err(MeshPlexError::SharedBuffer { holders }),
        }
    }

    /// Flat offset of a multi-index, or `None` if the index is out of range
    /// or has the wrong rank.
    pub fn offset_of(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.rank() {
            return None;
        }
        let mut offset = 0usize;
        for ((&i, &extent), &stride) in index
            .iter()
            .zip(self.shape.extents())
            .zip(self.strides.iter())
        {
            if i >= extent {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.offset_of(index).map(|o| &self.as_slice()[o])
    }

    /// Mutable element at a multi-index; `None` for a bad index or a shared
    /// buffer.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let offset = self.offset_of(index)?;
        Some(&mut self.as_mut_slice()?[offset])
    }

    /// Contiguous row `i` of a rank-2 array.
    pub fn row(&self, i: usize) -> Option<&[T]> {
        if self.shape.rank() != 2 || i >= self.shape.extents()[0] {
            return None;
        }
        let width = self.shape.extents()[1];
        Some(&self.as_slice()[i * width..(i + 1) * width])
    }

    /// Mutable contiguous row `i` of a rank-2 array; `None` for a bad index
    /// or a shared buffer.
    pub fn row_mut(&mut self, i: usize) -> Option<&mut [T]> {
        if self.shape.rank() != 2 || i >= self.shape.extents()[0] {
            return None;
        }
        let width = self.shape.extents()[1];
        Some(&mut self.as_mut_slice()?[i * width..(i + 1) * width])
    }
}

fn byte_size<T>(count: usize) -> Result<usize, MeshPlexError> {
    count
        .checked_mul(mem::size_of::<T>())
        .ok_or(MeshPlexError::InvalidSize("byte size overflows usize"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_has_default_elements() {
        let a = TypedArray::<f64>::try_zeroed(Shape::from([2, 3])).unwrap();
        assert_eq!(a.len(), 6);
        assert_eq!(a.nbytes(), 48);
        assert!(a.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(a.strides(), &[3, 1]);
    }

    #[test]
    fn filled_sets_every_element() {
        let a = TypedArray::<i32>::try_filled(Shape::scalar(5), -7).unwrap();
        assert_eq!(a.as_slice(), &[-7; 5]);
    }

    #[test]
    fn view_requires_exact_byte_size() {
        let buffer = Buffer::try_allocate(24).unwrap();
        assert!(matches!(
            TypedArray::<f64>::try_view(Shape::from([2, 2]), buffer.clone()),
            Err(MeshPlexError::ShapeMismatch {
                expected: 32,
                found: 24,
            })
        ));
        let ok = TypedArray::<f64>::try_view(Shape::from([3]), buffer).unwrap();
        assert_eq!(ok.len(), 3);
    }

    #[test]
    fn from_vec_aliases_the_vector_storage() {
        let v = vec![1i64, 2, 3, 4, 5, 6];
        let addr = v.as_ptr() as usize;
        let a = TypedArray::<i64>::from_vec(Shape::from([2, 3]), v).unwrap();
        assert_eq!(a.buffer().as_ptr() as usize, addr);
        assert_eq!(a.row(1).unwrap(), &[4, 5, 6]);
    }

    #[test]
    fn from_vec_length_mismatch() {
        assert!(matches!(
            TypedArray::<u8>::from_vec(Shape::from([4]), vec![1, 2, 3]),
            Err(MeshPlexError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn clone_aliases_storage() {
        let mut a = TypedArray::<u16>::try_zeroed(Shape::scalar(4)).unwrap();
        a.as_mut_slice().unwrap()[2] = 9;
        let b = a.clone();
        assert_eq!(a.buffer().holder_count(), 2);
        assert_eq!(b.as_slice(), &[0, 0, 9, 0]);
        // Aliased writers take the shared path; the peer observes the write.
        (unsafe { a.as_mut_slice_shared() })[0] = 4;
        assert_eq!(b.as_slice(), &[4, 0, 9, 0]);
    }

    #[test]
    fn shared_handles_refuse_safe_mutation() {
        let mut a = TypedArray::<u16>::try_zeroed(Shape::scalar(4)).unwrap();
        let b = a.clone();
        assert!(a.as_mut_slice().is_none());
        assert!(a.get_mut(&[1]).is_none());
        assert_eq!(
            a.try_fill(3),
            Err(MeshPlexError::SharedBuffer { holders: 2 })
        );
        assert_eq!(b.as_slice(), &[0; 4]);
        // Dropping the last other holder restores the safe path.
        drop(b);
        a.as_mut_slice().unwrap()[2] = 9;
        assert_eq!(a.as_slice(), &[0, 0, 9, 0]);
    }

    #[test]
    fn bool_views_validate_every_byte() {
        let bad = Buffer::from_vec(vec![0u8, 1, 2, 1]);
        assert_eq!(
            TypedArray::<bool>::try_view(Shape::from([4]), bad).unwrap_err(),
            MeshPlexError::InvalidBitPattern {
                kind: crate::buffer::scalar::ScalarKind::Bool,
                offset: 2,
                byte: 2,
            }
        );
        let good = Buffer::from_vec(vec![0u8, 1, 0, 1]);
        let a = TypedArray::<bool>::try_view(Shape::from([4]), good).unwrap();
        assert_eq!(a.as_slice(), &[false, true, false, true]);
    }

    #[test]
    fn multi_index_access() {
        let mut a = TypedArray::<f32>::try_zeroed(Shape::from([2, 2, 2])).unwrap();
        *a.get_mut(&[1, 0, 1]).unwrap() = 3.5;
        assert_eq!(a.offset_of(&[1, 0, 1]), Some(5));
        assert_eq!(a.get(&[1, 0, 1]), Some(&3.5));
        assert_eq!(a.get(&[1, 2, 0]), None);
        assert_eq!(a.get(&[1, 0]), None);
    }

    #[test]
    fn zero_extent_arrays_are_well_formed() {
        let a = TypedArray::<u64>::try_zeroed(Shape::from([0, 8])).unwrap();
        assert!(a.is_empty());
        assert_eq!(a.as_slice(), &[] as &[u64]);
        assert_eq!(a.row(0), None);
    }
}
