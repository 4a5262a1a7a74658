//! Typed scene-graph object records: frozen type tags, the closed
//! [`FrameObject`] variant set, and the tag-prefixed wire protocol.
//!
//! # Tag identity rules
//! Every object variant is identified by a frozen u32 tag. A tag value
//! is never reused, even if a variant is retired. Readers MUST reject
//! tags outside the known set — decoding a default record in their
//! place would silently misinterpret future format revisions.
//!
//! # Wire protocol
//! The object region stores all `num_objects` tags as one contiguous
//! u32 array *before* any object payload (a format quirk, not a
//! per-record prefix). Payloads follow in the same order, each starting
//! with the common [`ObjectData`] fields.
//!
//! # Reference slots
//! On disk every reference is an i32 CombinedSpace position. In memory
//! a slot also carries the referenced record's stable RefID, resolved
//! against the position table at decode time; the rebuild engine later
//! re-derives positions from those identities, never the other way
//! around.

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Mat4, Vec3, Vec4};
use std::io::{self, Read, Seek, Write};

use crate::block::{SpaceEntry, SpaceKind};
use crate::error::FrameError;
use crate::wire;

// ── Frozen object type tags ──────────────────────────────────────────────────

pub const TAG_JOINT: u32 = 0x01;
pub const TAG_SINGLE_MESH: u32 = 0x02;
pub const TAG_FRAME: u32 = 0x03;
pub const TAG_LIGHT: u32 = 0x04;
pub const TAG_CAMERA: u32 = 0x05;
pub const TAG_COMPONENT: u32 = 0x06;
pub const TAG_SECTOR: u32 = 0x07;
pub const TAG_DUMMY: u32 = 0x08;
pub const TAG_DEFLECTOR: u32 = 0x09;
pub const TAG_AREA: u32 = 0x0a;
pub const TAG_TARGET: u32 = 0x0b;
pub const TAG_MODEL: u32 = 0x0c;
pub const TAG_COLLISION: u32 = 0x0d;

/// Runtime object variant discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Joint,
    SingleMesh,
    Frame,
    Light,
    Camera,
    Component,
    Sector,
    Dummy,
    Deflector,
    Area,
    Target,
    Model,
    Collision,
}

impl ObjectKind {
    /// The frozen wire tag for this variant.
    #[inline]
    pub fn tag(self) -> u32 {
        match self {
            ObjectKind::Joint => TAG_JOINT,
            ObjectKind::SingleMesh => TAG_SINGLE_MESH,
            ObjectKind::Frame => TAG_FRAME,
            ObjectKind::Light => TAG_LIGHT,
            ObjectKind::Camera => TAG_CAMERA,
            ObjectKind::Component => TAG_COMPONENT,
            ObjectKind::Sector => TAG_SECTOR,
            ObjectKind::Dummy => TAG_DUMMY,
            ObjectKind::Deflector => TAG_DEFLECTOR,
            ObjectKind::Area => TAG_AREA,
            ObjectKind::Target => TAG_TARGET,
            ObjectKind::Model => TAG_MODEL,
            ObjectKind::Collision => TAG_COLLISION,
        }
    }

    /// Resolve a wire tag. Returns `None` for tags outside the set.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            TAG_JOINT => Some(ObjectKind::Joint),
            TAG_SINGLE_MESH => Some(ObjectKind::SingleMesh),
            TAG_FRAME => Some(ObjectKind::Frame),
            TAG_LIGHT => Some(ObjectKind::Light),
            TAG_CAMERA => Some(ObjectKind::Camera),
            TAG_COMPONENT => Some(ObjectKind::Component),
            TAG_SECTOR => Some(ObjectKind::Sector),
            TAG_DUMMY => Some(ObjectKind::Dummy),
            TAG_DEFLECTOR => Some(ObjectKind::Deflector),
            TAG_AREA => Some(ObjectKind::Area),
            TAG_TARGET => Some(ObjectKind::Target),
            TAG_MODEL => Some(ObjectKind::Model),
            TAG_COLLISION => Some(ObjectKind::Collision),
            _ => None,
        }
    }

    /// Human-readable name (for diagnostics only — never parsed).
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Joint => "joint",
            ObjectKind::SingleMesh => "single-mesh",
            ObjectKind::Frame => "frame",
            ObjectKind::Light => "light",
            ObjectKind::Camera => "camera",
            ObjectKind::Component => "component",
            ObjectKind::Sector => "sector",
            ObjectKind::Dummy => "dummy",
            ObjectKind::Deflector => "deflector",
            ObjectKind::Area => "area",
            ObjectKind::Target => "target",
            ObjectKind::Model => "model",
            ObjectKind::Collision => "collision",
        }
    }
}

// ── Reference slots ──────────────────────────────────────────────────────────

/// A parent-reference slot. Serialized as the position alone; `ref_id`
/// is re-derived from the position table after decode and `name` is a
/// presentation cache owned by the annotator, never written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRef {
    /// CombinedSpace position, -1 = no parent.
    pub index: i32,
    /// Stable identity of the referenced record, -1 while unresolved.
    pub ref_id: i32,
    /// Display name of the referenced record.
    pub name: Option<String>,
}

impl ParentRef {
    pub fn is_absent(&self) -> bool {
        self.index < 0
    }

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let index = wire::read_i32(reader)?;
        Ok(Self {
            index,
            ref_id: -1,
            name: None,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.index)
    }
}

impl Default for ParentRef {
    fn default() -> Self {
        Self {
            index: -1,
            ref_id: -1,
            name: None,
        }
    }
}

/// A named block-reference slot (mesh, material, blend-info, skeleton,
/// skeleton-hierarchy). Same position/identity split as [`ParentRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    pub index: i32,
    pub ref_id: i32,
}

impl ResourceRef {
    pub const NONE: ResourceRef = ResourceRef {
        index: -1,
        ref_id: -1,
    };

    pub fn is_absent(&self) -> bool {
        self.index < 0
    }

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let index = wire::read_i32(reader)?;
        Ok(Self { index, ref_id: -1 })
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.index)
    }
}

impl Default for ResourceRef {
    fn default() -> Self {
        Self::NONE
    }
}

// ── Common object fields ─────────────────────────────────────────────────────

/// Fields every object variant starts with on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    pub ref_id: i32,
    pub name: String,
    pub flags: u32,
    pub transform: Mat4,
    pub parent1: ParentRef,
    pub parent2: ParentRef,
}

impl ObjectData {
    pub fn new(ref_id: i32, name: impl Into<String>) -> Self {
        Self {
            ref_id,
            name: name.into(),
            flags: 0,
            transform: Mat4::IDENTITY,
            parent1: ParentRef::default(),
            parent2: ParentRef::default(),
        }
    }

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let name = wire::read_string(reader)?;
        let flags = wire::read_u32(reader)?;
        let transform = wire::read_transform(reader)?;
        let parent1 = ParentRef::read(reader)?;
        let parent2 = ParentRef::read(reader)?;
        Ok(Self {
            ref_id,
            name,
            flags,
            transform,
            parent1,
            parent2,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        wire::write_string(writer, &self.name)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        wire::write_transform(writer, &self.transform)?;
        self.parent1.write(writer)?;
        self.parent2.write(writer)
    }
}

// ── Variant payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SingleMesh {
    pub data: ObjectData,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub mesh: ResourceRef,
    pub material: ResourceRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub data: ObjectData,
    pub light_type: u32,
    pub color: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub data: ObjectData,
    pub fov: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub data: ObjectData,
    pub component_flags: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub data: ObjectData,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dummy {
    pub data: ObjectData,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deflector {
    pub data: ObjectData,
    pub plane: Vec4,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub data: ObjectData,
    pub planes: Vec<Vec4>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub data: ObjectData,
    pub timer: f32,
}

/// A skinned model: the SingleMesh payload plus blend/skeleton slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub data: ObjectData,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub mesh: ResourceRef,
    pub material: ResourceRef,
    pub blend_info: ResourceRef,
    pub skeleton: ResourceRef,
    pub skel_hierarchy: ResourceRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub data: ObjectData,
    pub collision_hash: u64,
}

// ── FrameObject ──────────────────────────────────────────────────────────────

/// The closed set of scene-graph object records.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameObject {
    Joint(ObjectData),
    SingleMesh(SingleMesh),
    Frame(ObjectData),
    Light(Light),
    Camera(Camera),
    Component(Component),
    Sector(Sector),
    Dummy(Dummy),
    Deflector(Deflector),
    Area(Area),
    Target(Target),
    Model(Model),
    Collision(Collision),
}

impl FrameObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            FrameObject::Joint(_) => ObjectKind::Joint,
            FrameObject::SingleMesh(_) => ObjectKind::SingleMesh,
            FrameObject::Frame(_) => ObjectKind::Frame,
            FrameObject::Light(_) => ObjectKind::Light,
            FrameObject::Camera(_) => ObjectKind::Camera,
            FrameObject::Component(_) => ObjectKind::Component,
            FrameObject::Sector(_) => ObjectKind::Sector,
            FrameObject::Dummy(_) => ObjectKind::Dummy,
            FrameObject::Deflector(_) => ObjectKind::Deflector,
            FrameObject::Area(_) => ObjectKind::Area,
            FrameObject::Target(_) => ObjectKind::Target,
            FrameObject::Model(_) => ObjectKind::Model,
            FrameObject::Collision(_) => ObjectKind::Collision,
        }
    }

    pub fn data(&self) -> &ObjectData {
        match self {
            FrameObject::Joint(data) | FrameObject::Frame(data) => data,
            FrameObject::SingleMesh(o) => &o.data,
            FrameObject::Light(o) => &o.data,
            FrameObject::Camera(o) => &o.data,
            FrameObject::Component(o) => &o.data,
            FrameObject::Sector(o) => &o.data,
            FrameObject::Dummy(o) => &o.data,
            FrameObject::Deflector(o) => &o.data,
            FrameObject::Area(o) => &o.data,
            FrameObject::Target(o) => &o.data,
            FrameObject::Model(o) => &o.data,
            FrameObject::Collision(o) => &o.data,
        }
    }

    pub fn data_mut(&mut self) -> &mut ObjectData {
        match self {
            FrameObject::Joint(data) | FrameObject::Frame(data) => data,
            FrameObject::SingleMesh(o) => &mut o.data,
            FrameObject::Light(o) => &mut o.data,
            FrameObject::Camera(o) => &mut o.data,
            FrameObject::Component(o) => &mut o.data,
            FrameObject::Sector(o) => &mut o.data,
            FrameObject::Dummy(o) => &mut o.data,
            FrameObject::Deflector(o) => &mut o.data,
            FrameObject::Area(o) => &mut o.data,
            FrameObject::Target(o) => &mut o.data,
            FrameObject::Model(o) => &mut o.data,
            FrameObject::Collision(o) => &mut o.data,
        }
    }

    pub fn ref_id(&self) -> i32 {
        self.data().ref_id
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// Decode one payload. The caller already consumed the tag array
    /// and dispatches on the kind decoded there.
    pub fn read<R: Read + Seek>(reader: &mut R, kind: ObjectKind) -> Result<Self, FrameError> {
        let data = ObjectData::read(reader)?;
        let object = match kind {
            ObjectKind::Joint => FrameObject::Joint(data),
            ObjectKind::Frame => FrameObject::Frame(data),
            ObjectKind::SingleMesh => FrameObject::SingleMesh(SingleMesh {
                data,
                bounds_min: wire::read_vec3(reader)?,
                bounds_max: wire::read_vec3(reader)?,
                mesh: ResourceRef::read(reader)?,
                material: ResourceRef::read(reader)?,
            }),
            ObjectKind::Light => FrameObject::Light(Light {
                data,
                light_type: wire::read_u32(reader)?,
                color: wire::read_vec3(reader)?,
                radius: wire::read_f32(reader)?,
            }),
            ObjectKind::Camera => FrameObject::Camera(Camera {
                data,
                fov: wire::read_f32(reader)?,
                near_clip: wire::read_f32(reader)?,
                far_clip: wire::read_f32(reader)?,
            }),
            ObjectKind::Component => FrameObject::Component(Component {
                data,
                component_flags: wire::read_u32(reader)?,
            }),
            ObjectKind::Sector => FrameObject::Sector(Sector {
                data,
                bounds_min: wire::read_vec3(reader)?,
                bounds_max: wire::read_vec3(reader)?,
            }),
            ObjectKind::Dummy => FrameObject::Dummy(Dummy {
                data,
                bounds_min: wire::read_vec3(reader)?,
                bounds_max: wire::read_vec3(reader)?,
            }),
            ObjectKind::Deflector => FrameObject::Deflector(Deflector {
                data,
                plane: wire::read_vec4(reader)?,
            }),
            ObjectKind::Area => {
                let num_planes = wire::read_u32(reader)?;
                let mut planes = Vec::with_capacity(num_planes as usize);
                for _ in 0..num_planes {
                    planes.push(wire::read_vec4(reader)?);
                }
                FrameObject::Area(Area { data, planes })
            }
            ObjectKind::Target => FrameObject::Target(Target {
                data,
                timer: wire::read_f32(reader)?,
            }),
            ObjectKind::Model => FrameObject::Model(Model {
                data,
                bounds_min: wire::read_vec3(reader)?,
                bounds_max: wire::read_vec3(reader)?,
                mesh: ResourceRef::read(reader)?,
                material: ResourceRef::read(reader)?,
                blend_info: ResourceRef::read(reader)?,
                skeleton: ResourceRef::read(reader)?,
                skel_hierarchy: ResourceRef::read(reader)?,
            }),
            ObjectKind::Collision => FrameObject::Collision(Collision {
                data,
                collision_hash: wire::read_u64(reader)?,
            }),
        };
        Ok(object)
    }

    /// Encode one payload. The tag was written with the tag array.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            FrameObject::Joint(data) | FrameObject::Frame(data) => data.write(writer),
            FrameObject::SingleMesh(o) => {
                o.data.write(writer)?;
                wire::write_vec3(writer, o.bounds_min)?;
                wire::write_vec3(writer, o.bounds_max)?;
                o.mesh.write(writer)?;
                o.material.write(writer)
            }
            FrameObject::Light(o) => {
                o.data.write(writer)?;
                writer.write_u32::<LittleEndian>(o.light_type)?;
                wire::write_vec3(writer, o.color)?;
                writer.write_f32::<LittleEndian>(o.radius)
            }
            FrameObject::Camera(o) => {
                o.data.write(writer)?;
                writer.write_f32::<LittleEndian>(o.fov)?;
                writer.write_f32::<LittleEndian>(o.near_clip)?;
                writer.write_f32::<LittleEndian>(o.far_clip)
            }
            FrameObject::Component(o) => {
                o.data.write(writer)?;
                writer.write_u32::<LittleEndian>(o.component_flags)
            }
            FrameObject::Sector(o) => {
                o.data.write(writer)?;
                wire::write_vec3(writer, o.bounds_min)?;
                wire::write_vec3(writer, o.bounds_max)
            }
            FrameObject::Dummy(o) => {
                o.data.write(writer)?;
                wire::write_vec3(writer, o.bounds_min)?;
                wire::write_vec3(writer, o.bounds_max)
            }
            FrameObject::Deflector(o) => {
                o.data.write(writer)?;
                wire::write_vec4(writer, o.plane)
            }
            FrameObject::Area(o) => {
                o.data.write(writer)?;
                writer.write_u32::<LittleEndian>(o.planes.len() as u32)?;
                for plane in &o.planes {
                    wire::write_vec4(writer, *plane)?;
                }
                Ok(())
            }
            FrameObject::Target(o) => {
                o.data.write(writer)?;
                writer.write_f32::<LittleEndian>(o.timer)
            }
            FrameObject::Model(o) => {
                o.data.write(writer)?;
                wire::write_vec3(writer, o.bounds_min)?;
                wire::write_vec3(writer, o.bounds_max)?;
                o.mesh.write(writer)?;
                o.material.write(writer)?;
                o.blend_info.write(writer)?;
                o.skeleton.write(writer)?;
                o.skel_hierarchy.write(writer)
            }
            FrameObject::Collision(o) => {
                o.data.write(writer)?;
                writer.write_u64::<LittleEndian>(o.collision_hash)
            }
        }
    }
}

// ── Region codecs ────────────────────────────────────────────────────────────

/// Decode the whole object region: the contiguous tag array, then one
/// payload per tag. Mesh-bearing variants get their block reference
/// slots resolved against `blocks` (the block-region position table)
/// immediately after their payload is read.
pub fn decode_all<R: Read + Seek>(
    reader: &mut R,
    count: usize,
    blocks: &[SpaceEntry],
) -> Result<Vec<FrameObject>, FrameError> {
    let mut kinds = Vec::with_capacity(count);
    for index in 0..count {
        let tag = wire::read_u32(reader)?;
        let kind =
            ObjectKind::from_tag(tag).ok_or(FrameError::UnknownObjectType { index, tag })?;
        kinds.push(kind);
    }

    let mut objects = Vec::with_capacity(count);
    for kind in kinds {
        let mut object = FrameObject::read(reader, kind)?;
        resolve_block_refs(&mut object, blocks)?;
        objects.push(object);
    }
    Ok(objects)
}

/// Encode the whole object region: the tag array first, then every
/// payload in the same order.
pub fn encode_all<'a, W, I>(writer: &mut W, objects: I) -> Result<(), FrameError>
where
    W: Write,
    I: IntoIterator<Item = &'a FrameObject>,
    I::IntoIter: Clone,
{
    let iter = objects.into_iter();
    for object in iter.clone() {
        writer.write_u32::<LittleEndian>(object.kind().tag())?;
    }
    for object in iter {
        object.write(writer)?;
    }
    Ok(())
}

/// Upgrade a mesh-bearing object's block reference slots from raw
/// positions to stable identities.
fn resolve_block_refs(object: &mut FrameObject, blocks: &[SpaceEntry]) -> Result<(), FrameError> {
    let owner = object.data().ref_id;
    match object {
        FrameObject::SingleMesh(mesh) => {
            resolve_slot(&mut mesh.mesh, SpaceKind::Geometry, owner, blocks)?;
            resolve_slot(&mut mesh.material, SpaceKind::Material, owner, blocks)
        }
        FrameObject::Model(model) => {
            resolve_slot(&mut model.mesh, SpaceKind::Geometry, owner, blocks)?;
            resolve_slot(&mut model.material, SpaceKind::Material, owner, blocks)?;
            resolve_slot(&mut model.blend_info, SpaceKind::BlendInfo, owner, blocks)?;
            resolve_slot(&mut model.skeleton, SpaceKind::Skeleton, owner, blocks)?;
            resolve_slot(
                &mut model.skel_hierarchy,
                SpaceKind::SkeletonHierarchy,
                owner,
                blocks,
            )
        }
        _ => Ok(()),
    }
}

fn resolve_slot(
    slot: &mut ResourceRef,
    expected: SpaceKind,
    owner: i32,
    blocks: &[SpaceEntry],
) -> Result<(), FrameError> {
    if slot.is_absent() {
        return Ok(());
    }
    let entry = blocks
        .get(slot.index as usize)
        .ok_or(FrameError::IndexOutOfRange {
            index: slot.index,
            len: blocks.len(),
            object: owner,
        })?;
    if entry.kind != expected {
        return Err(FrameError::WrongReferenceKind {
            expected: expected.name(),
            position: slot.index,
            object: owner,
        });
    }
    slot.ref_id = entry.ref_id;
    Ok(())
}
