use glam::{Mat4, Vec4};
use proptest::prelude::*;
use std::io::Cursor;

use scframe::header::{FrameHeader, SceneFolder};
use scframe::wire;

proptest! {
    #[test]
    fn string_roundtrip(s in ".{0,48}") {
        let mut buf = Vec::new();
        wire::write_string(&mut buf, &s).unwrap();
        let mut cursor = Cursor::new(buf);
        let back = wire::read_string(&mut cursor).unwrap();
        prop_assert_eq!(back, s);
    }

    /// Transforms round-trip bit-exactly, NaN payloads included.
    #[test]
    fn transform_roundtrip_is_bit_exact(bits in any::<[u32; 12]>()) {
        let f = |i: usize| f32::from_bits(bits[i]);
        let m = Mat4::from_cols(
            Vec4::new(f(0), f(1), f(2), f(3)),
            Vec4::new(f(4), f(5), f(6), f(7)),
            Vec4::new(f(8), f(9), f(10), f(11)),
            Vec4::W,
        );

        let mut buf = Vec::new();
        wire::write_transform(&mut buf, &m).unwrap();
        prop_assert_eq!(buf.len(), 48);

        let mut cursor = Cursor::new(buf);
        let back = wire::read_transform(&mut cursor).unwrap();
        for (a, b) in m.to_cols_array().iter().zip(back.to_cols_array().iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn header_roundtrip(
        counts in any::<[u16; 6]>(),
        folders in prop::collection::vec((any::<i32>(), "[a-z_]{0,12}"), 0..5),
    ) {
        let header = FrameHeader {
            num_geometries: counts[0] as u32,
            num_material_resources: counts[1] as u32,
            num_blend_infos: counts[2] as u32,
            num_skeletons: counts[3] as u32,
            num_skel_hierarchies: counts[4] as u32,
            num_objects: counts[5] as u32,
            scene_folders: folders
                .into_iter()
                .map(|(ref_id, name)| SceneFolder { ref_id, name })
                .collect(),
        };

        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let back = FrameHeader::read(&mut cursor).unwrap();
        prop_assert_eq!(header, back);
    }
}
