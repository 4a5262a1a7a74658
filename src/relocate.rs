//! Relocation/rebuild engine.
//!
//! Every cross-reference on disk is a raw position into the current
//! CombinedSpace ordering, so any reordering invalidates every stored
//! index. The engine therefore never carries positions forward: it
//! re-derives each one from the stable identity captured on the slot,
//! against a freshly built canonical ordering. An identity that no
//! longer exists in its mapping is a [`FrameError::DanglingReference`]
//! and the rebuild aborts — writing an unrelocatable index would
//! corrupt the file for the consuming engine.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::block::{SpaceEntry, SpaceKind};
use crate::error::FrameError;
use crate::frame::FrameFile;
use crate::object::{FrameObject, ParentRef, ResourceRef};

impl FrameFile {
    /// Recompute the canonical CombinedSpace ordering and rewrite every
    /// stored reference index against it.
    ///
    /// The canonical ordering is kind-grouped blocks (scene folders,
    /// geometries, materials, blend-infos, skeletons, skeleton
    /// hierarchies) followed by objects, each group in
    /// mapping-iteration order. A failed rebuild leaves identities
    /// intact, so a corrected mapping can simply be rebuilt again.
    pub fn rebuild(&mut self) -> Result<(), FrameError> {
        let total = self.scene_folders.len()
            + self.geometries.len()
            + self.materials.len()
            + self.blend_infos.len()
            + self.skeletons.len()
            + self.skel_hierarchies.len()
            + self.objects.len();

        let mut space = Vec::with_capacity(total);
        push_entries(&mut space, SpaceKind::SceneFolder, self.scene_folders.keys());
        push_entries(&mut space, SpaceKind::Geometry, self.geometries.keys());
        push_entries(&mut space, SpaceKind::Material, self.materials.keys());
        push_entries(&mut space, SpaceKind::BlendInfo, self.blend_infos.keys());
        push_entries(&mut space, SpaceKind::Skeleton, self.skeletons.keys());
        push_entries(
            &mut space,
            SpaceKind::SkeletonHierarchy,
            self.skel_hierarchies.keys(),
        );
        push_entries(&mut space, SpaceKind::Object, self.objects.keys());

        // Identity to new position, for parent slots. First occurrence
        // wins; RefIDs are assumed unique across the space.
        let mut by_ref_id = HashMap::with_capacity(space.len());
        for (position, entry) in space.iter().enumerate() {
            by_ref_id.entry(entry.ref_id).or_insert(position);
        }

        // Each kind group's first position in the new ordering.
        let geo_base = self.scene_folders.len();
        let mat_base = geo_base + self.geometries.len();
        let blend_base = mat_base + self.materials.len();
        let skel_base = blend_base + self.blend_infos.len();
        let hier_base = skel_base + self.skeletons.len();

        let Self {
            geometries,
            materials,
            blend_infos,
            skeletons,
            skel_hierarchies,
            objects,
            ..
        } = self;

        for obj in objects.values_mut() {
            let owner = obj.data().ref_id;
            match obj {
                FrameObject::SingleMesh(mesh) => {
                    relocate_block(&mut mesh.mesh, "mesh", owner, geometries, geo_base)?;
                    relocate_block(&mut mesh.material, "material", owner, materials, mat_base)?;
                }
                FrameObject::Model(model) => {
                    relocate_block(&mut model.mesh, "mesh", owner, geometries, geo_base)?;
                    relocate_block(&mut model.material, "material", owner, materials, mat_base)?;
                    relocate_block(
                        &mut model.blend_info,
                        "blend-info",
                        owner,
                        blend_infos,
                        blend_base,
                    )?;
                    relocate_block(&mut model.skeleton, "skeleton", owner, skeletons, skel_base)?;
                    relocate_block(
                        &mut model.skel_hierarchy,
                        "skeleton-hierarchy",
                        owner,
                        skel_hierarchies,
                        hier_base,
                    )?;
                }
                _ => {}
            }
            let data = obj.data_mut();
            relocate_parent(&mut data.parent1, "parent1", owner, &by_ref_id)?;
            relocate_parent(&mut data.parent2, "parent2", owner, &by_ref_id)?;
        }

        self.space = space;
        self.annotate_parents();
        log::debug!("rebuilt combined space: {} entries", self.space.len());
        Ok(())
    }
}

fn push_entries<'a>(
    space: &mut Vec<SpaceEntry>,
    kind: SpaceKind,
    ref_ids: impl Iterator<Item = &'a i32>,
) {
    for ref_id in ref_ids {
        space.push(SpaceEntry {
            kind,
            ref_id: *ref_id,
        });
    }
}

fn relocate_block<T>(
    slot: &mut ResourceRef,
    name: &'static str,
    owner: i32,
    map: &IndexMap<i32, T>,
    base: usize,
) -> Result<(), FrameError> {
    // Absent references are never relocated.
    if slot.is_absent() {
        return Ok(());
    }
    match map.get_index_of(&slot.ref_id) {
        Some(offset) => {
            slot.index = (base + offset) as i32;
            Ok(())
        }
        None => Err(FrameError::DanglingReference {
            slot: name,
            object: owner,
            ref_id: slot.ref_id,
        }),
    }
}

fn relocate_parent(
    slot: &mut ParentRef,
    name: &'static str,
    owner: i32,
    by_ref_id: &HashMap<i32, usize>,
) -> Result<(), FrameError> {
    if slot.is_absent() {
        return Ok(());
    }
    match by_ref_id.get(&slot.ref_id) {
        Some(position) => {
            slot.index = *position as i32;
            Ok(())
        }
        None => Err(FrameError::DanglingReference {
            slot: name,
            object: owner,
            ref_id: slot.ref_id,
        }),
    }
}
