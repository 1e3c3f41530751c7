use mesh_plex::buffer::buffer::Buffer;
use mesh_plex::buffer::plex::ArrayPlex;
use mesh_plex::buffer::scalar::{PlexScalar, ScalarKind, ScalarValue};
use mesh_plex::buffer::shape::Shape;
use mesh_plex::mesh_error::MeshPlexError;
use proptest::prelude::*;

fn assert_all_zero(plex: &ArrayPlex) {
    fn check<T: PlexScalar>(plex: &ArrayPlex) {
        let array = plex.typed::<T>().expect("tag must match the kind");
        assert!(array.as_slice().iter().all(|&v| v == T::default()));
    }
    match plex.kind() {
        ScalarKind::Bool => check::<bool>(plex),
        ScalarKind::Int8 => check::<i8>(plex),
        ScalarKind::Int16 => check::<i16>(plex),
        ScalarKind::Int32 => check::<i32>(plex),
        ScalarKind::Int64 => check::<i64>(plex),
        ScalarKind::UInt8 => check::<u8>(plex),
        ScalarKind::UInt16 => check::<u16>(plex),
        ScalarKind::UInt32 => check::<u32>(plex),
        ScalarKind::UInt64 => check::<u64>(plex),
        ScalarKind::Float32 => check::<f32>(plex),
        ScalarKind::Float64 => check::<f64>(plex),
    }
}

#[test]
fn zeroed_construction_for_every_kind() {
    let shape = Shape::from([3, 4]);
    for kind in ScalarKind::ALL {
        let plex = ArrayPlex::try_zeroed(shape.clone(), kind).unwrap();
        assert_eq!(plex.kind(), kind);
        assert_eq!(plex.len(), 12);
        assert_eq!(plex.nbytes(), 12 * kind.width());
        assert_all_zero(&plex);
    }
}

#[test]
fn compatible_fill_values_reach_every_element() {
    for kind in ScalarKind::ALL {
        let value = match kind.family() {
            mesh_plex::buffer::scalar::ScalarFamily::Boolean => ScalarValue::Bool(true),
            mesh_plex::buffer::scalar::ScalarFamily::Floating => ScalarValue::Float(3.0),
            _ => ScalarValue::Int(3),
        };
        let plex = ArrayPlex::try_filled(Shape::scalar(6), value, kind).unwrap();
        assert_eq!(plex.kind(), kind);
        match kind {
            ScalarKind::Bool => {
                assert!(plex.typed::<bool>().unwrap().as_slice().iter().all(|&v| v))
            }
            ScalarKind::Int32 => {
                assert_eq!(plex.typed::<i32>().unwrap().as_slice(), &[3; 6])
            }
            ScalarKind::UInt64 => {
                assert_eq!(plex.typed::<u64>().unwrap().as_slice(), &[3; 6])
            }
            ScalarKind::Float32 => {
                assert_eq!(plex.typed::<f32>().unwrap().as_slice(), &[3.0; 6])
            }
            _ => assert_eq!(plex.len(), 6),
        }
    }
}

#[test]
fn mismatched_fill_families_construct_nothing() {
    let cases = [
        (ScalarKind::Bool, ScalarValue::Int(1)),
        (ScalarKind::Bool, ScalarValue::Float(1.0)),
        (ScalarKind::Int64, ScalarValue::Bool(true)),
        (ScalarKind::UInt16, ScalarValue::Float(2.0)),
        (ScalarKind::Float64, ScalarValue::Int(2)),
        (ScalarKind::Float32, ScalarValue::Bool(false)),
    ];
    for (kind, value) in cases {
        assert!(
            matches!(
                ArrayPlex::try_filled(Shape::scalar(3), value, kind),
                Err(MeshPlexError::TypeMismatch { expected, .. }) if expected == kind
            ),
            "{kind} should reject {value:?}"
        );
    }
}

#[test]
fn kind_name_marshaling_round_trips() {
    for kind in ScalarKind::ALL {
        let parsed = ScalarKind::parse(kind.as_str()).unwrap();
        let plex = ArrayPlex::try_zeroed(Shape::scalar(1), parsed).unwrap();
        assert_eq!(plex.kind(), kind);
    }
    assert!(matches!(
        ScalarKind::parse("float16"),
        Err(MeshPlexError::UnsupportedDataType(_))
    ));
}

#[test]
fn view_round_trips_between_shapes() {
    let plex = ArrayPlex::try_zeroed(Shape::from([6]), ScalarKind::Float64).unwrap();
    let reshaped =
        ArrayPlex::try_view(Shape::from([2, 3]), ScalarKind::Float64, plex.buffer().clone())
            .unwrap();
    assert_eq!(reshaped.shape().extents(), &[2, 3]);
    // Same bytes under a narrower kind is also exact, so it is accepted.
    let narrow =
        ArrayPlex::try_view(Shape::from([6, 8]), ScalarKind::UInt8, plex.buffer().clone()).unwrap();
    assert_eq!(narrow.nbytes(), plex.nbytes());
    // A byte-size mismatch is not.
    assert!(matches!(
        ArrayPlex::try_view(Shape::from([5]), ScalarKind::Float64, plex.buffer().clone()),
        Err(MeshPlexError::ShapeMismatch {
            expected: 40,
            found: 48,
        })
    ));
}

#[test]
fn bool_views_accept_only_binary_bytes() {
    // A byte that is neither 0 nor 1 must never surface as a `bool` element.
    let err = ArrayPlex::try_view(
        Shape::from([1]),
        ScalarKind::Bool,
        Buffer::from_vec(vec![2u8]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        MeshPlexError::InvalidBitPattern {
            kind: ScalarKind::Bool,
            offset: 0,
            byte: 2,
        }
    );

    let plex = ArrayPlex::try_view(
        Shape::from([2, 2]),
        ScalarKind::Bool,
        Buffer::from_vec(vec![1u8, 0, 0, 1]),
    )
    .unwrap();
    assert_eq!(
        plex.typed::<bool>().unwrap().as_slice(),
        &[true, false, false, true]
    );

    // The same bytes reinterpreted as uint8 are unconstrained.
    let narrow = ArrayPlex::try_view(
        Shape::from([1]),
        ScalarKind::UInt8,
        Buffer::from_vec(vec![2u8]),
    )
    .unwrap();
    assert_eq!(narrow.typed::<u8>().unwrap().as_slice(), &[2]);
}

proptest! {
    #[test]
    fn zeroed_element_count_is_extent_product(
        extents in proptest::collection::vec(0usize..6, 1..4),
        kind_index in 0usize..11,
    ) {
        let kind = ScalarKind::ALL[kind_index];
        let shape = Shape::try_new(extents.clone()).unwrap();
        let expected: usize = extents.iter().product();
        let plex = ArrayPlex::try_zeroed(shape, kind).unwrap();
        prop_assert_eq!(plex.kind(), kind);
        prop_assert_eq!(plex.len(), expected);
        prop_assert_eq!(plex.nbytes(), expected * kind.width());
        assert_all_zero(&plex);
    }

    #[test]
    fn integer_fill_reaches_every_element(value in any::<i64>(), len in 0usize..32) {
        let plex = ArrayPlex::try_filled(
            Shape::scalar(len),
            ScalarValue::Int(value),
            ScalarKind::Int64,
        ).unwrap();
        prop_assert!(plex.typed::<i64>().unwrap().as_slice().iter().all(|&v| v == value));

        // Unsigned kinds store the same bits directly through the unsigned type.
        let plex = ArrayPlex::try_filled(
            Shape::scalar(len),
            ScalarValue::Int(value),
            ScalarKind::UInt64,
        ).unwrap();
        prop_assert!(plex.typed::<u64>().unwrap().as_slice().iter().all(|&v| v == value as u64));
    }
}
