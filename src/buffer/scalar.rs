//! Scalar kind registry and the type-dispatch trait.
//!
//! [`ScalarKind`] is the closed, eleven-member enumeration of element types a
//! runtime-typed array can carry. Each kind has a fixed byte width and belongs
//! to exactly one of three fill-value families (boolean, integer, floating);
//! fill construction refuses to coerce across families.
//!
//! [`PlexScalar`] binds each concrete Rust scalar to its kind tag and its
//! [`ArrayPlex`] variant. Adding a kind means adding one enum variant, one
//! `impl_plex_scalar!` line, and one arm at each exhaustive match in
//! [`crate::buffer::plex`]; the compiler flags every site that needs it.

use crate::buffer::plex::ArrayPlex;
use crate::buffer::typed::TypedArray;
use crate::mesh_error::MeshPlexError;
use std::fmt;

/// Closed enumeration of the scalar kinds a typed array can hold.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ScalarKind {
    /// One-byte boolean, encoded as 0 or 1.
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// IEEE 754 single-precision float.
    Float32,
    /// IEEE 754 double-precision float.
    Float64,
}

/// Fill-value family of a scalar kind. Signed and unsigned integers are
/// distinct families for width bookkeeping but accept the same integer fill
/// values.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ScalarFamily {
    /// The lone `bool` kind.
    Boolean,
    /// The four signed integer kinds.
    SignedInteger,
    /// The four unsigned integer kinds.
    UnsignedInteger,
    /// The two floating-point kinds.
    Floating,
}

impl ScalarFamily {
    /// Whether two families accept the same fill values.
    #[inline]
    pub fn accepts(self, value: ScalarFamily) -> bool {
        use ScalarFamily::*;
        matches!(
            (self, value),
            (Boolean, Boolean)
                | (SignedInteger | UnsignedInteger, SignedInteger | UnsignedInteger)
                | (Floating, Floating)
        )
    }
}

impl fmt::Display for ScalarFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarFamily::Boolean => "boolean",
            ScalarFamily::SignedInteger => "signed-integer",
            ScalarFamily::UnsignedInteger => "unsigned-integer",
            ScalarFamily::Floating => "floating",
        };
        f.write_str(s)
    }
}

impl ScalarKind {
    /// All eleven kinds, in declaration order.
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Bool,
        ScalarKind::Int8,
        ScalarKind::Int16,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::UInt8,
        ScalarKind::UInt16,
        ScalarKind::UInt32,
        ScalarKind::UInt64,
        ScalarKind::Float32,
        ScalarKind::Float64,
    ];

    /// Fixed element width in bytes.
    pub const fn width(self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::Int8 | ScalarKind::UInt8 => 1,
            ScalarKind::Int16 | ScalarKind::UInt16 => 2,
            ScalarKind::Int32 | ScalarKind::UInt32 | ScalarKind::Float32 => 4,
            ScalarKind::Int64 | ScalarKind::UInt64 | ScalarKind::Float64 => 8,
        }
    }

    /// Family used for strict fill-value checking.
    pub const fn family(self) -> ScalarFamily {
        match self {
            ScalarKind::Bool => ScalarFamily::Boolean,
            ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64 => {
                ScalarFamily::SignedInteger
            }
            ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32 | ScalarKind::UInt64 => {
                ScalarFamily::UnsignedInteger
            }
            ScalarKind::Float32 | ScalarKind::Float64 => ScalarFamily::Floating,
        }
    }

    /// Stable string label for the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
        }
    }

    /// Parse a kind from its string label.
    ///
    /// # Errors
    /// Returns `Err(UnsupportedDataType)` for anything outside the
    /// eleven-member set.
    pub fn parse(name: &str) -> Result<Self, MeshPlexError> {
        match name {
            "bool" => Ok(ScalarKind::Bool),
            "int8" => Ok(ScalarKind::Int8),
            "int16" => Ok(ScalarKind::Int16),
            "int32" => Ok(ScalarKind::Int32),
            "int64" => Ok(ScalarKind::Int64),
            "uint8" => Ok(ScalarKind::UInt8),
            "uint16" => Ok(ScalarKind::UInt16),
            "uint32" => Ok(ScalarKind::UInt32),
            "uint64" => Ok(ScalarKind::UInt64),
            "float32" => Ok(ScalarKind::Float32),
            "float64" => Ok(ScalarKind::Float64),
            other => Err(MeshPlexError::UnsupportedDataType(other.to_owned())),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime fill value, as marshaled by an exposure layer. Carries the family,
/// not the exact width; conversion to the element type happens per kind.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ScalarValue {
    /// A boolean fill value.
    Bool(bool),
    /// An integer fill value, signed or unsigned at the receiving kind.
    Int(i64),
    /// A floating-point fill value.
    Float(f64),
}

impl ScalarValue {
    /// Family of this value.
    pub const fn family(self) -> ScalarFamily {
        match self {
            ScalarValue::Bool(_) => ScalarFamily::Boolean,
            ScalarValue::Int(_) => ScalarFamily::SignedInteger,
            ScalarValue::Float(_) => ScalarFamily::Floating,
        }
    }
}

/// Concrete scalar types usable as typed-array elements.
///
/// Mirrors the runtime [`ScalarKind`] tag at the type level and provides the
/// wrap/unwrap hooks between `TypedArray<Self>` and the type-erased
/// [`ArrayPlex`].
pub trait PlexScalar: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Kind tag for this concrete type.
    const KIND: ScalarKind;

    /// Convert a runtime fill value into this type.
    ///
    /// # Errors
    /// Returns `Err(TypeMismatch)` if the value's family is incompatible.
    fn try_from_value(value: ScalarValue) -> Result<Self, MeshPlexError>;

    /// Check that every byte sequence in `bytes` is a valid encoding of
    /// `Self`. Every bit pattern is valid for the numeric kinds; `bool`
    /// overrides this to reject bytes other than 0 and 1 before a buffer is
    /// reinterpreted.
    ///
    /// # Errors
    /// Returns `Err(InvalidBitPattern)` at the first offending byte.
    fn validate_bytes(_bytes: &[u8]) -> Result<(), MeshPlexError> {
        Ok(())
    }

    /// Wrap a typed array into the type-erased holder.
    fn wrap(array: TypedArray<Self>) -> ArrayPlex;
    /// Borrow the typed array if the tag matches.
    fn unwrap(plex: &ArrayPlex) -> Option<&TypedArray<Self>>;
    /// Mutably borrow the typed array if the tag matches.
    fn unwrap_mut(plex: &mut ArrayPlex) -> Option<&mut TypedArray<Self>>;
}

// One line per numeric kind; the kind set is closed, and the exhaustiveness
// checks on ArrayPlex keep this list honest. Integer fills convert with `as`
// (wrapping) semantics; unsigned kinds store directly through the unsigned
// type.
macro_rules! impl_plex_scalar {
    ($ty:ty, $variant:ident, $pattern:pat => $convert:expr) => {
        impl PlexScalar for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn try_from_value(value: ScalarValue) -> Result<Self, MeshPlexError> {
                match value {
                    $pattern => Ok($convert),
                    other => Err(MeshPlexError::TypeMismatch {
                        expected: Self::KIND,
                        found: other.family(),
                    }),
                }
            }

            fn wrap(array: TypedArray<Self>) -> ArrayPlex {
                ArrayPlex::$variant(array)
            }

            fn unwrap(plex: &ArrayPlex) -> Option<&TypedArray<Self>> {
                if let ArrayPlex::$variant(array) = plex {
                    Some(array)
                } else {
                    None
                }
            }

            fn unwrap_mut(plex: &mut ArrayPlex) -> Option<&mut TypedArray<Self>> {
                if let ArrayPlex::$variant(array) = plex {
                    Some(array)
                } else {
                    None
                }
            }
        }
    };
}

// bool is the one kind with invalid bit patterns, so its impl is written out
// to validate reinterpreted bytes instead of going through the macro.
impl PlexScalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn try_from_value(value: ScalarValue) -> Result<Self, MeshPlexError> {
        match value {
            ScalarValue::Bool(v) => Ok(v),
            other => Err(MeshPlexError::TypeMismatch {
                expected: Self::KIND,
                found: other.family(),
            }),
        }
    }

    fn validate_bytes(bytes: &[u8]) -> Result<(), MeshPlexError> {
        match bytes.iter().position(|&b| b > 1) {
            None => Ok(()),
            Some(offset) => Err(MeshPlexError::InvalidBitPattern {
                kind: Self::KIND,
                offset,
                byte: bytes[offset],
            }),
        }
    }

    fn wrap(array: TypedArray<Self>) -> ArrayPlex {
        ArrayPlex::Bool(array)
    }

    fn unwrap(plex: &ArrayPlex) -> Option<&TypedArray<Self>> {
        if let ArrayPlex::Bool(array) = plex {
            Some(array)
        } else {
            None
        }
    }

    fn unwrap_mut(plex: &mut ArrayPlex) -> Option<&mut TypedArray<Self>> {
        if let ArrayPlex::Bool(array) = plex {
            Some(array)
        } else {
            None
        }
    }
}

impl_plex_scalar!(i8, Int8, ScalarValue::Int(v) => v as i8);
impl_plex_scalar!(i16, Int16, ScalarValue::Int(v) => v as i16);
impl_plex_scalar!(i32, Int32, ScalarValue::Int(v) => v as i32);
impl_plex_scalar!(i64, Int64, ScalarValue::Int(v) => v);
impl_plex_scalar!(u8, UInt8, ScalarValue::Int(v) => v as u8);
impl_plex_scalar!(u16, UInt16, ScalarValue::Int(v) => v as u16);
impl_plex_scalar!(u32, UInt32, ScalarValue::Int(v) => v as u32);
impl_plex_scalar!(u64, UInt64, ScalarValue::Int(v) => v as u64);
impl_plex_scalar!(f32, Float32, ScalarValue::Float(v) => v as f32);
impl_plex_scalar!(f64, Float64, ScalarValue::Float(v) => v);
