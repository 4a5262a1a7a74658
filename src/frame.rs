//! In-memory scene frame — the primary embedding surface.
//!
//! # Decode
//! [`FrameFile::read`] consumes the whole remainder of the stream in one
//! pass: header, block region (in fixed kind-group order), the object
//! tag array, then the object payloads.  Every record lands in its
//! kind's insertion-ordered mapping keyed by RefID, and the decode-time
//! CombinedSpace position table is kept alongside so raw reference
//! positions can be upgraded to stable identities.
//!
//! # Mutation
//! Editors add, remove and replace records through the per-kind
//! mappings between a decode and the next encode.  Mutations never
//! touch positions; the rebuild engine regenerates the entire position
//! table immediately before serialization.
//!
//! # Encode
//! [`FrameFile::write`] rebuilds first, always.  Stale positions can
//! never reach the disk.

use indexmap::IndexMap;
use std::io::{Read, Seek, Write};

use crate::block::{BlendInfo, Geometry, Material, Skeleton, SkeletonHierarchy, SpaceEntry, SpaceKind};
use crate::error::FrameError;
use crate::header::{FrameHeader, SceneFolder};
use crate::object::{self, FrameObject};

#[derive(Debug, Default)]
pub struct FrameFile {
    pub scene_folders: IndexMap<i32, SceneFolder>,
    pub geometries: IndexMap<i32, Geometry>,
    pub materials: IndexMap<i32, Material>,
    pub blend_infos: IndexMap<i32, BlendInfo>,
    pub skeletons: IndexMap<i32, Skeleton>,
    pub skel_hierarchies: IndexMap<i32, SkeletonHierarchy>,
    pub objects: IndexMap<i32, FrameObject>,
    /// CombinedSpace as of the last decode or rebuild.
    pub(crate) space: Vec<SpaceEntry>,
}

impl FrameFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// The CombinedSpace position table as of the last decode or
    /// rebuild. Positions are stale after any mutation until the next
    /// [`FrameFile::rebuild`].
    pub fn combined_space(&self) -> &[SpaceEntry] {
        &self.space
    }

    /// Derive the header from the current mapping cardinalities. Counts
    /// can never go stale because they are never stored.
    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            num_geometries: self.geometries.len() as u32,
            num_material_resources: self.materials.len() as u32,
            num_blend_infos: self.blend_infos.len() as u32,
            num_skeletons: self.skeletons.len() as u32,
            num_skel_hierarchies: self.skel_hierarchies.len() as u32,
            num_objects: self.objects.len() as u32,
            scene_folders: self.scene_folders.values().cloned().collect(),
        }
    }

    // ── Decode ───────────────────────────────────────────────────────────────

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let header = FrameHeader::read(reader)?;
        let mut frame = FrameFile::default();
        let mut space = Vec::with_capacity(header.num_blocks() + header.num_objects as usize);

        for folder in &header.scene_folders {
            space.push(SpaceEntry {
                kind: SpaceKind::SceneFolder,
                ref_id: folder.ref_id,
            });
            insert_unique(
                &mut frame.scene_folders,
                "scene-folder",
                folder.ref_id,
                folder.clone(),
            )?;
        }
        for _ in 0..header.num_geometries {
            let geometry = Geometry::read(reader)?;
            space.push(SpaceEntry {
                kind: SpaceKind::Geometry,
                ref_id: geometry.ref_id,
            });
            insert_unique(&mut frame.geometries, "geometry", geometry.ref_id, geometry)?;
        }
        for _ in 0..header.num_material_resources {
            let material = Material::read(reader)?;
            space.push(SpaceEntry {
                kind: SpaceKind::Material,
                ref_id: material.ref_id,
            });
            insert_unique(&mut frame.materials, "material", material.ref_id, material)?;
        }
        for _ in 0..header.num_blend_infos {
            let blend_info = BlendInfo::read(reader)?;
            space.push(SpaceEntry {
                kind: SpaceKind::BlendInfo,
                ref_id: blend_info.ref_id,
            });
            insert_unique(
                &mut frame.blend_infos,
                "blend-info",
                blend_info.ref_id,
                blend_info,
            )?;
        }
        for _ in 0..header.num_skeletons {
            let skeleton = Skeleton::read(reader)?;
            space.push(SpaceEntry {
                kind: SpaceKind::Skeleton,
                ref_id: skeleton.ref_id,
            });
            insert_unique(&mut frame.skeletons, "skeleton", skeleton.ref_id, skeleton)?;
        }
        for _ in 0..header.num_skel_hierarchies {
            let hierarchy = SkeletonHierarchy::read(reader)?;
            space.push(SpaceEntry {
                kind: SpaceKind::SkeletonHierarchy,
                ref_id: hierarchy.ref_id,
            });
            insert_unique(
                &mut frame.skel_hierarchies,
                "skeleton-hierarchy",
                hierarchy.ref_id,
                hierarchy,
            )?;
        }

        let objects = object::decode_all(reader, header.num_objects as usize, &space)?;
        for obj in objects {
            let ref_id = obj.ref_id();
            space.push(SpaceEntry {
                kind: SpaceKind::Object,
                ref_id,
            });
            insert_unique(&mut frame.objects, "object", ref_id, obj)?;
        }

        frame.space = space;
        frame.resolve_parent_ids()?;
        frame.annotate_parents();
        log::debug!(
            "decoded frame: {} blocks + {} objects",
            frame.space.len() - frame.objects.len(),
            frame.objects.len()
        );
        Ok(frame)
    }

    /// Upgrade parent slots from raw positions to stable identities.
    /// Parent references may point forward at objects, so this runs
    /// only once the whole space is materialized.
    fn resolve_parent_ids(&mut self) -> Result<(), FrameError> {
        let space = &self.space;
        for obj in self.objects.values_mut() {
            let owner = obj.data().ref_id;
            let data = obj.data_mut();
            for slot in [&mut data.parent1, &mut data.parent2] {
                if slot.is_absent() {
                    continue;
                }
                let entry =
                    space
                        .get(slot.index as usize)
                        .ok_or(FrameError::IndexOutOfRange {
                            index: slot.index,
                            len: space.len(),
                            object: owner,
                        })?;
                slot.ref_id = entry.ref_id;
            }
        }
        Ok(())
    }

    // ── Encode ───────────────────────────────────────────────────────────────

    /// Serialize the frame. Invokes [`FrameFile::rebuild`] first, so the
    /// emitted stream always carries a freshly relocated CombinedSpace.
    pub fn write<W: Write>(&mut self, writer: &mut W) -> Result<(), FrameError> {
        self.rebuild()?;
        self.header().write(writer)?;
        for geometry in self.geometries.values() {
            geometry.write(writer)?;
        }
        for material in self.materials.values() {
            material.write(writer)?;
        }
        for blend_info in self.blend_infos.values() {
            blend_info.write(writer)?;
        }
        for skeleton in self.skeletons.values() {
            skeleton.write(writer)?;
        }
        for hierarchy in self.skel_hierarchies.values() {
            hierarchy.write(writer)?;
        }
        object::encode_all(writer, self.objects.values())
    }

    // ── Reference annotator ──────────────────────────────────────────────────

    /// Refresh the display-name caches on every parent slot.
    /// `ParentIndex1` only ever names objects; `ParentIndex2` may also
    /// name a scene folder. Recomputed after decode and after every
    /// rebuild; never serialized.
    pub fn annotate_parents(&mut self) {
        let annotations: Vec<(SpaceKind, Option<String>)> = self
            .space
            .iter()
            .map(|entry| {
                let name = match entry.kind {
                    SpaceKind::SceneFolder => self
                        .scene_folders
                        .get(&entry.ref_id)
                        .map(|f| f.name.clone()),
                    SpaceKind::Object => {
                        self.objects.get(&entry.ref_id).map(|o| o.name().to_owned())
                    }
                    _ => None,
                };
                (entry.kind, name)
            })
            .collect();

        for obj in self.objects.values_mut() {
            let data = obj.data_mut();
            data.parent1.name = annotation_for(&annotations, data.parent1.index, false);
            data.parent2.name = annotation_for(&annotations, data.parent2.index, true);
        }
    }

    // ── Mutation API ─────────────────────────────────────────────────────────
    //
    // The mappings are public; these helpers add the duplicate-identifier
    // check that raw map access would silently skip.

    pub fn insert_scene_folder(&mut self, folder: SceneFolder) -> Result<(), FrameError> {
        insert_unique(&mut self.scene_folders, "scene-folder", folder.ref_id, folder)
    }

    pub fn insert_geometry(&mut self, geometry: Geometry) -> Result<(), FrameError> {
        insert_unique(&mut self.geometries, "geometry", geometry.ref_id, geometry)
    }

    pub fn insert_material(&mut self, material: Material) -> Result<(), FrameError> {
        insert_unique(&mut self.materials, "material", material.ref_id, material)
    }

    pub fn insert_blend_info(&mut self, blend_info: BlendInfo) -> Result<(), FrameError> {
        insert_unique(&mut self.blend_infos, "blend-info", blend_info.ref_id, blend_info)
    }

    pub fn insert_skeleton(&mut self, skeleton: Skeleton) -> Result<(), FrameError> {
        insert_unique(&mut self.skeletons, "skeleton", skeleton.ref_id, skeleton)
    }

    pub fn insert_skel_hierarchy(&mut self, hierarchy: SkeletonHierarchy) -> Result<(), FrameError> {
        insert_unique(
            &mut self.skel_hierarchies,
            "skeleton-hierarchy",
            hierarchy.ref_id,
            hierarchy,
        )
    }

    pub fn insert_object(&mut self, obj: FrameObject) -> Result<(), FrameError> {
        let ref_id = obj.ref_id();
        insert_unique(&mut self.objects, "object", ref_id, obj)
    }

    /// Removals preserve mapping order, so an untouched remainder
    /// re-encodes in its original file order.
    pub fn remove_scene_folder(&mut self, ref_id: i32) -> Option<SceneFolder> {
        self.scene_folders.shift_remove(&ref_id)
    }

    pub fn remove_geometry(&mut self, ref_id: i32) -> Option<Geometry> {
        self.geometries.shift_remove(&ref_id)
    }

    pub fn remove_material(&mut self, ref_id: i32) -> Option<Material> {
        self.materials.shift_remove(&ref_id)
    }

    pub fn remove_blend_info(&mut self, ref_id: i32) -> Option<BlendInfo> {
        self.blend_infos.shift_remove(&ref_id)
    }

    pub fn remove_skeleton(&mut self, ref_id: i32) -> Option<Skeleton> {
        self.skeletons.shift_remove(&ref_id)
    }

    pub fn remove_skel_hierarchy(&mut self, ref_id: i32) -> Option<SkeletonHierarchy> {
        self.skel_hierarchies.shift_remove(&ref_id)
    }

    pub fn remove_object(&mut self, ref_id: i32) -> Option<FrameObject> {
        self.objects.shift_remove(&ref_id)
    }

    /// Swap an existing record for a new one with the same identifier.
    /// Returns the old record, or `None` (and no insertion) when the
    /// identifier is unknown.
    pub fn replace_geometry(&mut self, geometry: Geometry) -> Option<Geometry> {
        replace_existing(&mut self.geometries, geometry.ref_id, geometry)
    }

    pub fn replace_material(&mut self, material: Material) -> Option<Material> {
        replace_existing(&mut self.materials, material.ref_id, material)
    }

    pub fn replace_object(&mut self, obj: FrameObject) -> Option<FrameObject> {
        let ref_id = obj.ref_id();
        replace_existing(&mut self.objects, ref_id, obj)
    }

    /// Clone an object under a fresh identifier. The copy keeps the
    /// source's reference slots; they relocate with everything else on
    /// the next rebuild.
    pub fn duplicate_object(
        &mut self,
        source: i32,
        new_ref_id: i32,
        new_name: &str,
    ) -> Result<(), FrameError> {
        if self.objects.contains_key(&new_ref_id) {
            return Err(FrameError::DuplicateRefId {
                kind: "object",
                ref_id: new_ref_id,
            });
        }
        let mut copy = self
            .objects
            .get(&source)
            .cloned()
            .ok_or(FrameError::MissingObject { ref_id: source })?;
        let data = copy.data_mut();
        data.ref_id = new_ref_id;
        data.name = new_name.to_owned();
        self.objects.insert(new_ref_id, copy);
        Ok(())
    }
}

fn insert_unique<T>(
    map: &mut IndexMap<i32, T>,
    kind: &'static str,
    ref_id: i32,
    value: T,
) -> Result<(), FrameError> {
    if map.contains_key(&ref_id) {
        return Err(FrameError::DuplicateRefId { kind, ref_id });
    }
    map.insert(ref_id, value);
    Ok(())
}

fn replace_existing<T>(map: &mut IndexMap<i32, T>, ref_id: i32, value: T) -> Option<T> {
    if map.contains_key(&ref_id) {
        map.insert(ref_id, value)
    } else {
        None
    }
}

fn annotation_for(
    annotations: &[(SpaceKind, Option<String>)],
    index: i32,
    allow_folder: bool,
) -> Option<String> {
    if index < 0 {
        return None;
    }
    match annotations.get(index as usize) {
        Some((SpaceKind::Object, name)) => name.clone(),
        Some((SpaceKind::SceneFolder, name)) if allow_folder => name.clone(),
        _ => None,
    }
}
