//! Shared resource blocks and the CombinedSpace position table.
//!
//! The block region sits between the header and the object region.
//! Decode order is frozen: Geometries, Materials, BlendInfos, Skeletons,
//! SkeletonHierarchies (scene folders were already consumed with the
//! header). Encoding mirrors this exact order; it is never sorted —
//! callers hand over the kind-grouped ordering produced by the rebuild
//! engine.
//!
//! Every cross-reference in the format is an i32 position into the
//! CombinedSpace: blocks in file order, then objects. [`SpaceEntry`]
//! records which kind of record occupies a position and its stable
//! identity, which is what turns raw positions back into RefIDs.

use byteorder::{LittleEndian, WriteBytesExt};
use glam::Vec3;
use std::io::{self, Read, Seek, Write};

use crate::error::FrameError;
use crate::wire;

/// Which kind of record occupies a CombinedSpace position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    SceneFolder,
    Geometry,
    Material,
    BlendInfo,
    Skeleton,
    SkeletonHierarchy,
    Object,
}

impl SpaceKind {
    /// Human-readable kind label (for diagnostics only — never parsed).
    pub fn name(self) -> &'static str {
        match self {
            SpaceKind::SceneFolder => "scene-folder",
            SpaceKind::Geometry => "geometry",
            SpaceKind::Material => "material",
            SpaceKind::BlendInfo => "blend-info",
            SpaceKind::Skeleton => "skeleton",
            SpaceKind::SkeletonHierarchy => "skeleton-hierarchy",
            SpaceKind::Object => "object",
        }
    }
}

/// One CombinedSpace position: record kind plus stable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceEntry {
    pub kind: SpaceKind,
    pub ref_id: i32,
}

// ── Geometry ─────────────────────────────────────────────────────────────────

/// One level of detail of a geometry block. Buffer hashes reference
/// vertex/index payloads held by the external buffer pools; the frame
/// codec round-trips them opaquely and never resolves them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryLod {
    pub distance: f32,
    pub vertex_buffer_hash: u64,
    pub index_buffer_hash: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub ref_id: i32,
    pub decl_flags: u32,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub lods: Vec<GeometryLod>,
}

impl Geometry {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let decl_flags = wire::read_u32(reader)?;
        let bounds_min = wire::read_vec3(reader)?;
        let bounds_max = wire::read_vec3(reader)?;
        let num_lods = wire::read_u32(reader)?;
        let mut lods = Vec::with_capacity(num_lods as usize);
        for _ in 0..num_lods {
            lods.push(GeometryLod {
                distance: wire::read_f32(reader)?,
                vertex_buffer_hash: wire::read_u64(reader)?,
                index_buffer_hash: wire::read_u64(reader)?,
            });
        }
        Ok(Self {
            ref_id,
            decl_flags,
            bounds_min,
            bounds_max,
            lods,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        writer.write_u32::<LittleEndian>(self.decl_flags)?;
        wire::write_vec3(writer, self.bounds_min)?;
        wire::write_vec3(writer, self.bounds_max)?;
        writer.write_u32::<LittleEndian>(self.lods.len() as u32)?;
        for lod in &self.lods {
            writer.write_f32::<LittleEndian>(lod.distance)?;
            writer.write_u64::<LittleEndian>(lod.vertex_buffer_hash)?;
            writer.write_u64::<LittleEndian>(lod.index_buffer_hash)?;
        }
        Ok(())
    }
}

// ── Material ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub ref_id: i32,
    /// One material hash per geometry LOD, resolved by the material
    /// library, not by this codec.
    pub material_hashes: Vec<u64>,
}

impl Material {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let num_lods = wire::read_u32(reader)?;
        let mut material_hashes = Vec::with_capacity(num_lods as usize);
        for _ in 0..num_lods {
            material_hashes.push(wire::read_u64(reader)?);
        }
        Ok(Self {
            ref_id,
            material_hashes,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        writer.write_u32::<LittleEndian>(self.material_hashes.len() as u32)?;
        for hash in &self.material_hashes {
            writer.write_u64::<LittleEndian>(*hash)?;
        }
        Ok(())
    }
}

// ── BlendInfo ────────────────────────────────────────────────────────────────

/// Bone blend data. The payload layout is owned by the animation system;
/// the codec stores it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendInfo {
    pub ref_id: i32,
    pub data: Vec<u8>,
}

impl BlendInfo {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let len = wire::read_u32(reader)? as usize;
        let data = wire::read_bytes(reader, len)?;
        Ok(Self { ref_id, data })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        writer.write_u32::<LittleEndian>(self.data.len() as u32)?;
        writer.write_all(&self.data)
    }
}

// ── Skeleton ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub ref_id: i32,
    pub joint_name_hashes: Vec<u64>,
}

impl Skeleton {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let num_joints = wire::read_u32(reader)?;
        let mut joint_name_hashes = Vec::with_capacity(num_joints as usize);
        for _ in 0..num_joints {
            joint_name_hashes.push(wire::read_u64(reader)?);
        }
        Ok(Self {
            ref_id,
            joint_name_hashes,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        writer.write_u32::<LittleEndian>(self.joint_name_hashes.len() as u32)?;
        for hash in &self.joint_name_hashes {
            writer.write_u64::<LittleEndian>(*hash)?;
        }
        Ok(())
    }
}

// ── SkeletonHierarchy ────────────────────────────────────────────────────────

/// Per-joint parent indices, one byte each, in skeleton joint order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonHierarchy {
    pub ref_id: i32,
    pub parent_indices: Vec<u8>,
}

impl SkeletonHierarchy {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let num_joints = wire::read_u32(reader)? as usize;
        let parent_indices = wire::read_bytes(reader, num_joints)?;
        Ok(Self {
            ref_id,
            parent_indices,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        writer.write_u32::<LittleEndian>(self.parent_indices.len() as u32)?;
        writer.write_all(&self.parent_indices)
    }
}
