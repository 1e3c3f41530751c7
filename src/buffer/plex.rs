//! `ArrayPlex`: runtime-typed array, one tagged variant per scalar kind.
//!
//! The plex is what the mesh and dtype-flexible callers consume. It exposes
//! only shape-, kind-, and buffer-level operations; element arithmetic lives
//! on the concrete [`TypedArray`] reached through [`ArrayPlex::typed`].
//!
//! Every method here is one exhaustive match over the eleven kinds. That
//! match set is the crate's single extension point: a new scalar kind adds
//! one variant and the compiler points at every arm that must follow.

use crate::buffer::buffer::{Buffer, BufferRemover};
use crate::buffer::scalar::{PlexScalar, ScalarKind, ScalarValue};
use crate::buffer::shape::Shape;
use crate::buffer::typed::TypedArray;
use crate::mesh_error::MeshPlexError;
use std::ptr::NonNull;

/// Type-erased dense array holding exactly one concrete typed array, chosen
/// at construction by a runtime [`ScalarKind`] tag. The kind never changes
/// after construction.
#[derive(Clone, Debug)]
pub enum ArrayPlex {
    /// Boolean elements.
    Bool(TypedArray<bool>),
    /// Signed 8-bit elements.
    Int8(TypedArray<i8>),
    /// Signed 16-bit elements.
    Int16(TypedArray<i16>),
    /// Signed 32-bit elements.
    Int32(TypedArray<i32>),
    /// Signed 64-bit elements.
    Int64(TypedArray<i64>),
    /// Unsigned 8-bit elements.
    UInt8(TypedArray<u8>),
    /// Unsigned 16-bit elements.
    UInt16(TypedArray<u16>),
    /// Unsigned 32-bit elements.
    UInt32(TypedArray<u32>),
    /// Unsigned 64-bit elements.
    UInt64(TypedArray<u64>),
    /// Single-precision float elements.
    Float32(TypedArray<f32>),
    /// Double-precision float elements.
    Float64(TypedArray<f64>),
}

impl ArrayPlex {
    /// Construct a zero-initialized array of the given shape and kind.
    pub fn try_zeroed(shape: Shape, kind: ScalarKind) -> Result<Self, MeshPlexError> {
        match kind {
            ScalarKind::Bool => TypedArray::<bool>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::Int8 => TypedArray::<i8>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::Int16 => TypedArray::<i16>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::Int32 => TypedArray::<i32>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::Int64 => TypedArray::<i64>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::UInt8 => TypedArray::<u8>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::UInt16 => TypedArray::<u16>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::UInt32 => TypedArray::<u32>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::UInt64 => TypedArray::<u64>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::Float32 => TypedArray::<f32>::try_zeroed(shape).map(PlexScalar::wrap),
            ScalarKind::Float64 => TypedArray::<f64>::try_zeroed(shape).map(PlexScalar::wrap),
        }
    }

    /// Construct an array with every element set to `value`.
    ///
    /// # Errors
    /// `Err(TypeMismatch)` if the value's family is incompatible with `kind`.
    /// Nothing is constructed on failure.
    pub fn try_filled(
        shape: Shape,
        value: ScalarValue,
        kind: ScalarKind,
    ) -> Result<Self, MeshPlexError> {
        fn filled<T: PlexScalar>(
            shape: Shape,
            value: ScalarValue,
        ) -> Result<ArrayPlex, MeshPlexError> {
            // Family check first so a bad value never allocates.
            let element = T::try_from_value(value)?;
            TypedArray::<T>::try_filled(shape, element).map(T::wrap)
        }
        match kind {
            ScalarKind::Bool => filled::<bool>(shape, value),
            ScalarKind::Int8 => filled::<i8>(shape, value),
            ScalarKind::Int16 => filled::<i16>(shape, value),
            ScalarKind::Int32 => filled::<i32>(shape, value),
            ScalarKind::Int64 => filled::<i64>(shape, value),
            ScalarKind::UInt8 => filled::<u8>(shape, value),
            ScalarKind::UInt16 => filled::<u16>(shape, value),
            ScalarKind::UInt32 => filled::<u32>(shape, value),
            ScalarKind::UInt64 => filled::<u64>(shape, value),
            ScalarKind::Float32 => filled::<f32>(shape, value),
            ScalarKind::Float64 => filled::<f64>(shape, value),
        }
    }

    /// Reinterpret an existing buffer under (shape, kind).
    ///
    /// # Errors
    /// `Err(ShapeMismatch)` unless the buffer's byte size matches exactly;
    /// `Err(MisalignedBuffer)` if the buffer start is unaligned for `kind`;
    /// `Err(InvalidBitPattern)` if `kind` is `Bool` and a byte is neither 0
    /// nor 1.
    pub fn try_view(
        shape: Shape,
        kind: ScalarKind,
        buffer: Buffer,
    ) -> Result<Self, MeshPlexError> {
        match kind {
            ScalarKind::Bool => TypedArray::<bool>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::Int8 => TypedArray::<i8>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::Int16 => TypedArray::<i16>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::Int32 => TypedArray::<i32>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::Int64 => TypedArray::<i64>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::UInt8 => TypedArray::<u8>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::UInt16 => TypedArray::<u16>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::UInt32 => TypedArray::<u32>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::UInt64 => TypedArray::<u64>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::Float32 => TypedArray::<f32>::try_view(shape, buffer).map(PlexScalar::wrap),
            ScalarKind::Float64 => TypedArray::<f64>::try_view(shape, buffer).map(PlexScalar::wrap),
        }
    }

    /// Adopt a typed vector's storage without copying; shape and kind come
    /// from the element type and the caller's shape.
    pub fn from_vec<T: PlexScalar>(shape: Shape, values: Vec<T>) -> Result<Self, MeshPlexError> {
        TypedArray::from_vec(shape, values).map(T::wrap)
    }

    /// Adopt a foreign contiguous allocation of `nbytes` bytes without
    /// copying. `remover` runs exactly once when the plex and every derived
    /// view are released; on a rejected adoption it runs before this call
    /// returns, so the caller never double-frees.
    ///
    /// # Errors
    /// `Err(ShapeMismatch)` if `nbytes` differs from what (shape, kind)
    /// requires; `Err(MisalignedBuffer)` if `ptr` is unaligned for `kind`;
    /// `Err(InvalidBitPattern)` if `kind` is `Bool` and a byte is neither 0
    /// nor 1.
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes of `nbytes` initialized
    /// bytes until `remover` runs, and must be freed only by `remover`.
    pub unsafe fn try_adopt_raw(
        shape: Shape,
        kind: ScalarKind,
        ptr: NonNull<u8>,
        nbytes: usize,
        remover: BufferRemover,
    ) -> Result<Self, MeshPlexError> {
        // SAFETY: forwarded caller contract.
        let buffer = unsafe { Buffer::adopt(ptr, nbytes, remover) };
        Self::try_view(shape, kind, buffer)
    }

    /// The runtime scalar kind tag.
    pub fn kind(&self) -> ScalarKind {
        match self {
            ArrayPlex::Bool(_) => ScalarKind::Bool,
            ArrayPlex::Int8(_) => ScalarKind::Int8,
            ArrayPlex::Int16(_) => ScalarKind::Int16,
            ArrayPlex::Int32(_) => ScalarKind::Int32,
            ArrayPlex::Int64(_) => ScalarKind::Int64,
            ArrayPlex::UInt8(_) => ScalarKind::UInt8,
            ArrayPlex::UInt16(_) => ScalarKind::UInt16,
            ArrayPlex::UInt32(_) => ScalarKind::UInt32,
            ArrayPlex::UInt64(_) => ScalarKind::UInt64,
            ArrayPlex::Float32(_) => ScalarKind::Float32,
            ArrayPlex::Float64(_) => ScalarKind::Float64,
        }
    }

    /// The array's shape.
    pub fn shape(&self) -> &Shape {
        match self {
            ArrayPlex::Bool(a) => a.shape(),
            ArrayPlex::Int8(a) => a.shape(),
            ArrayPlex::Int16(a) => a.shape(),
            ArrayPlex::Int32(a) => a.shape(),
            ArrayPlex::Int64(a) => a.shape(),
            ArrayPlex::UInt8(a) => a.shape(),
            ArrayPlex::UInt16(a) => a.shape(),
            ArrayPlex::UInt32(a) => a.shape(),
            ArrayPlex::UInt64(a) => a.shape(),
            ArrayPlex::Float32(a) => a.shape(),
            ArrayPlex::Float64(a) => a.shape(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayPlex::Bool(a) => a.len(),
            ArrayPlex::Int8(a) => a.len(),
            ArrayPlex::Int16(a) => a.len(),
            ArrayPlex::Int32(a) => a.len(),
            ArrayPlex::Int64(a) => a.len(),
            ArrayPlex::UInt8(a) => a.len(),
            ArrayPlex::UInt16(a) => a.len(),
            ArrayPlex::UInt32(a) => a.len(),
            ArrayPlex::UInt64(a) => a.len(),
            ArrayPlex::Float32(a) => a.len(),
            ArrayPlex::Float64(a) => a.len(),
        }
    }

    /// Whether the array holds zero elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte size of the element storage.
    pub fn nbytes(&self) -> usize {
        self.buffer().len()
    }

    /// The backing buffer handle.
    pub fn buffer(&self) -> &Buffer {
        match self {
            ArrayPlex::Bool(a) => a.buffer(),
            ArrayPlex::Int8(a) => a.buffer(),
            ArrayPlex::Int16(a) => a.buffer(),
            ArrayPlex::Int32(a) => a.buffer(),
            ArrayPlex::Int64(a) => a.buffer(),
            ArrayPlex::UInt8(a) => a.buffer(),
            ArrayPlex::UInt16(a) => a.buffer(),
            ArrayPlex::UInt32(a) => a.buffer(),
            ArrayPlex::UInt64(a) => a.buffer(),
            ArrayPlex::Float32(a) => a.buffer(),
            ArrayPlex::Float64(a) => a.buffer(),
        }
    }

    /// Borrow the kind-specific array, if `T` matches the runtime tag.
    pub fn typed<T: PlexScalar>(&self) -> Option<&TypedArray<T>> {
        T::unwrap(self)
    }

    /// Mutably borrow the kind-specific array, if `T` matches the runtime tag.
    pub fn typed_mut<T: PlexScalar>(&mut self) -> Option<&mut TypedArray<T>> {
        T::unwrap_mut(self)
    }

    /// Write `value` to every element.
    ///
    /// # Errors
    /// `Err(TypeMismatch)` if the value's family is incompatible with the
    /// array's kind; `Err(SharedBuffer)` while other handles hold the
    /// buffer. The array is untouched on failure.
    pub fn try_fill(&mut self, value: ScalarValue) -> Result<(), MeshPlexError> {
        fn fill<T: PlexScalar>(
            array: &mut TypedArray<T>,
            value: ScalarValue,
        ) -> Result<(), MeshPlexError> {
            let element = T::try_from_value(value)?;
            array.try_fill(element)
        }
        match self {
            ArrayPlex::Bool(a) => fill(a, value),
            ArrayPlex::Int8(a) => fill(a, value),
            ArrayPlex::Int16(a) => fill(a, value),
            ArrayPlex::Int32(a) => fill(a, value),
            ArrayPlex::Int64(a) => fill(a, value),
            ArrayPlex::UInt8(a) => fill(a, value),
            ArrayPlex::UInt16(a) => fill(a, value),
            ArrayPlex::UInt32(a) => fill(a, value),
            ArrayPlex::UInt64(a) => fill(a, value),
            ArrayPlex::Float32(a) => fill(a, value),
            ArrayPlex::Float64(a) => fill(a, value),
        }
    }
}
