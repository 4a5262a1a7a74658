//! Wire-level decode tests against hand-built streams.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Cursor;

use scframe::frame::FrameFile;
use scframe::object::{TAG_DUMMY, TAG_SINGLE_MESH};
use scframe::FrameError;

fn header_bytes(counts: [u32; 7]) -> Vec<u8> {
    let mut buf = Vec::new();
    for count in counts {
        buf.write_u32::<LittleEndian>(count).unwrap();
    }
    buf
}

fn geometry_bytes(ref_id: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_i32::<LittleEndian>(ref_id).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap(); // decl_flags
    for _ in 0..6 {
        buf.write_f32::<LittleEndian>(0.0).unwrap(); // bounds
    }
    buf.write_u32::<LittleEndian>(0).unwrap(); // no LODs
    buf
}

/// Common object fields: ref_id, one-byte name, flags, identity
/// transform, absent parents.
fn object_data_bytes(ref_id: i32, parent1_index: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_i32::<LittleEndian>(ref_id).unwrap();
    buf.write_u16::<LittleEndian>(1).unwrap();
    buf.push(b'o');
    buf.write_u32::<LittleEndian>(0).unwrap(); // flags
    let identity = [
        1.0f32, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    ];
    for value in identity {
        buf.write_f32::<LittleEndian>(value).unwrap();
    }
    buf.write_i32::<LittleEndian>(parent1_index).unwrap();
    buf.write_i32::<LittleEndian>(-1).unwrap();
    buf
}

fn single_mesh_bytes(ref_id: i32, mesh_index: i32, material_index: i32) -> Vec<u8> {
    let mut buf = object_data_bytes(ref_id, -1);
    for _ in 0..6 {
        buf.write_f32::<LittleEndian>(0.0).unwrap(); // bounds
    }
    buf.write_i32::<LittleEndian>(mesh_index).unwrap();
    buf.write_i32::<LittleEndian>(material_index).unwrap();
    buf
}

fn dummy_bytes(ref_id: i32, parent1_index: i32) -> Vec<u8> {
    let mut buf = object_data_bytes(ref_id, parent1_index);
    for _ in 0..6 {
        buf.write_f32::<LittleEndian>(0.0).unwrap(); // bounds
    }
    buf
}

fn decode(bytes: Vec<u8>) -> Result<FrameFile, FrameError> {
    FrameFile::read(&mut Cursor::new(bytes))
}

#[test]
fn empty_frame_decodes_and_reencodes() {
    let bytes = header_bytes([0; 7]);
    let mut frame = decode(bytes.clone()).unwrap();
    assert!(frame.combined_space().is_empty());

    let mut out = Cursor::new(Vec::new());
    frame.write(&mut out).unwrap();
    assert_eq!(out.into_inner(), bytes);
}

#[test]
fn unknown_object_tag_is_rejected() {
    let mut bytes = header_bytes([0, 0, 0, 0, 0, 0, 1]);
    bytes.write_u32::<LittleEndian>(0xDEAD_BEEF).unwrap();

    let err = decode(bytes).unwrap_err();
    assert!(matches!(
        err,
        FrameError::UnknownObjectType {
            index: 0,
            tag: 0xDEAD_BEEF
        }
    ));
}

#[test]
fn truncated_header_reports_offset() {
    let mut bytes = header_bytes([0; 7]);
    bytes.truncate(10);

    let err = decode(bytes).unwrap_err();
    assert!(matches!(err, FrameError::TruncatedInput { .. }));
}

#[test]
fn truncated_block_region_is_an_error() {
    let mut bytes = header_bytes([0, 1, 0, 0, 0, 0, 0]);
    let geometry = geometry_bytes(100);
    bytes.extend_from_slice(&geometry[..geometry.len() / 2]);

    let err = decode(bytes).unwrap_err();
    assert!(matches!(err, FrameError::TruncatedInput { .. }));
}

#[test]
fn truncated_object_payload_is_an_error() {
    let mut bytes = header_bytes([0, 0, 0, 0, 0, 0, 1]);
    bytes.write_u32::<LittleEndian>(TAG_DUMMY).unwrap();
    let payload = dummy_bytes(300, -1);
    bytes.extend_from_slice(&payload[..payload.len() - 4]);

    let err = decode(bytes).unwrap_err();
    assert!(matches!(err, FrameError::TruncatedInput { .. }));
}

#[test]
fn block_reference_outside_the_block_region_is_rejected() {
    let mut bytes = header_bytes([0, 1, 0, 0, 0, 0, 1]);
    bytes.extend_from_slice(&geometry_bytes(100));
    bytes.write_u32::<LittleEndian>(TAG_SINGLE_MESH).unwrap();
    bytes.extend_from_slice(&single_mesh_bytes(300, 7, 0));

    let err = decode(bytes).unwrap_err();
    assert!(matches!(
        err,
        FrameError::IndexOutOfRange {
            index: 7,
            len: 1,
            object: 300
        }
    ));
}

#[test]
fn block_reference_of_the_wrong_kind_is_rejected() {
    let mut bytes = header_bytes([0, 1, 0, 0, 0, 0, 1]);
    bytes.extend_from_slice(&geometry_bytes(100));
    bytes.write_u32::<LittleEndian>(TAG_SINGLE_MESH).unwrap();
    // Mesh slot lands on the geometry (fine); the material slot lands
    // on the same geometry (wrong kind).
    bytes.extend_from_slice(&single_mesh_bytes(300, 0, 0));

    let err = decode(bytes).unwrap_err();
    assert!(matches!(
        err,
        FrameError::WrongReferenceKind {
            expected: "material",
            position: 0,
            object: 300
        }
    ));
}

#[test]
fn parent_position_outside_the_space_is_rejected() {
    let mut bytes = header_bytes([0, 0, 0, 0, 0, 0, 1]);
    bytes.write_u32::<LittleEndian>(TAG_DUMMY).unwrap();
    bytes.extend_from_slice(&dummy_bytes(300, 5));

    let err = decode(bytes).unwrap_err();
    assert!(matches!(
        err,
        FrameError::IndexOutOfRange {
            index: 5,
            len: 1,
            object: 300
        }
    ));
}

#[test]
fn duplicate_identifiers_in_the_stream_are_rejected() {
    let mut bytes = header_bytes([0, 2, 0, 0, 0, 0, 0]);
    bytes.extend_from_slice(&geometry_bytes(100));
    bytes.extend_from_slice(&geometry_bytes(100));

    let err = decode(bytes).unwrap_err();
    assert!(matches!(
        err,
        FrameError::DuplicateRefId {
            kind: "geometry",
            ref_id: 100
        }
    ));
}
