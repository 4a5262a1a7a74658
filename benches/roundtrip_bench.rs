use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use std::io::Cursor;

use scframe::block::{Geometry, GeometryLod, Material};
use scframe::frame::FrameFile;
use scframe::object::{Dummy, FrameObject, ObjectData, ResourceRef, SingleMesh};

fn build_frame(num_meshes: i32) -> FrameFile {
    let mut frame = FrameFile::new();
    for i in 0..num_meshes {
        frame
            .insert_geometry(Geometry {
                ref_id: 1000 + i,
                decl_flags: 0x11,
                bounds_min: Vec3::splat(-1.0),
                bounds_max: Vec3::splat(1.0),
                lods: vec![GeometryLod {
                    distance: 50.0,
                    vertex_buffer_hash: i as u64,
                    index_buffer_hash: (i as u64) << 32,
                }],
            })
            .unwrap();
        frame
            .insert_material(Material {
                ref_id: 2000 + i,
                material_hashes: vec![i as u64],
            })
            .unwrap();
        frame
            .insert_object(FrameObject::SingleMesh(SingleMesh {
                data: ObjectData::new(3000 + i, format!("mesh_{i}")),
                bounds_min: Vec3::splat(-2.0),
                bounds_max: Vec3::splat(2.0),
                mesh: ResourceRef {
                    index: 0,
                    ref_id: 1000 + i,
                },
                material: ResourceRef {
                    index: 0,
                    ref_id: 2000 + i,
                },
            }))
            .unwrap();
        frame
            .insert_object(FrameObject::Dummy(Dummy {
                data: ObjectData::new(4000 + i, format!("dummy_{i}")),
                bounds_min: Vec3::ZERO,
                bounds_max: Vec3::ONE,
            }))
            .unwrap();
    }
    frame
}

fn bench_encode(c: &mut Criterion) {
    let mut frame = build_frame(256);
    c.bench_function("encode_512_objects", |b| {
        b.iter(|| {
            let mut buf = Cursor::new(Vec::new());
            frame.write(&mut buf).unwrap();
            black_box(buf.into_inner().len())
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let mut frame = build_frame(256);
    let mut buf = Cursor::new(Vec::new());
    frame.write(&mut buf).unwrap();
    let bytes = buf.into_inner();

    c.bench_function("decode_512_objects", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(bytes.as_slice()));
            FrameFile::read(&mut cursor).unwrap()
        })
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let mut frame = build_frame(256);
    frame.rebuild().unwrap();
    c.bench_function("rebuild_512_objects", |b| b.iter(|| frame.rebuild().unwrap()));
}

criterion_group!(benches, bench_encode, bench_decode, bench_rebuild);
criterion_main!(benches);
