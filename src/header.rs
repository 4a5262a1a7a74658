//! Fixed-layout file prologue: per-kind record counts plus the
//! scene-folder name table.
//!
//! Field order is frozen: seven u32 counts (folder names, geometries,
//! material resources, blend infos, skeletons, skeleton hierarchies,
//! objects), then `num_folder_names` scene-folder descriptors. Scene
//! folders are part of the header, not the generic block region, but
//! they still occupy the first CombinedSpace positions.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Read, Seek, Write};

use crate::error::FrameError;
use crate::wire;

/// A scene folder descriptor. Folders carry no payload beyond a name;
/// objects reference them through their `ParentIndex2` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFolder {
    pub ref_id: i32,
    pub name: String,
}

impl SceneFolder {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let ref_id = wire::read_i32(reader)?;
        let name = wire::read_string(reader)?;
        Ok(Self { ref_id, name })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.ref_id)?;
        wire::write_string(writer, &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameHeader {
    pub num_geometries: u32,
    pub num_material_resources: u32,
    pub num_blend_infos: u32,
    pub num_skeletons: u32,
    pub num_skel_hierarchies: u32,
    pub num_objects: u32,
    pub scene_folders: Vec<SceneFolder>,
}

impl FrameHeader {
    /// Total number of records in the block region, scene folders
    /// included.
    pub fn num_blocks(&self) -> usize {
        self.scene_folders.len()
            + (self.num_geometries
                + self.num_material_resources
                + self.num_blend_infos
                + self.num_skeletons
                + self.num_skel_hierarchies) as usize
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, FrameError> {
        let num_folder_names = wire::read_u32(reader)?;
        let num_geometries = wire::read_u32(reader)?;
        let num_material_resources = wire::read_u32(reader)?;
        let num_blend_infos = wire::read_u32(reader)?;
        let num_skeletons = wire::read_u32(reader)?;
        let num_skel_hierarchies = wire::read_u32(reader)?;
        let num_objects = wire::read_u32(reader)?;

        let mut scene_folders = Vec::with_capacity(num_folder_names as usize);
        for _ in 0..num_folder_names {
            scene_folders.push(SceneFolder::read(reader)?);
        }

        Ok(Self {
            num_geometries,
            num_material_resources,
            num_blend_infos,
            num_skeletons,
            num_skel_hierarchies,
            num_objects,
            scene_folders,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.scene_folders.len() as u32)?;
        writer.write_u32::<LittleEndian>(self.num_geometries)?;
        writer.write_u32::<LittleEndian>(self.num_material_resources)?;
        writer.write_u32::<LittleEndian>(self.num_blend_infos)?;
        writer.write_u32::<LittleEndian>(self.num_skeletons)?;
        writer.write_u32::<LittleEndian>(self.num_skel_hierarchies)?;
        writer.write_u32::<LittleEndian>(self.num_objects)?;
        for folder in &self.scene_folders {
            folder.write(writer)?;
        }
        Ok(())
    }
}
