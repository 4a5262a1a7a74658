//! Display-name index over a decoded frame.
//!
//! A read-only consumer: built once after decode, used by search and
//! tree views to jump from a name to CombinedSpace positions. Only
//! named records (objects and scene folders) are indexed.

use std::collections::HashMap;

use crate::block::SpaceKind;
use crate::frame::FrameFile;

#[derive(Debug, Default)]
pub struct NameTable {
    index: HashMap<String, Vec<usize>>,
}

impl NameTable {
    /// Index every named record in the frame's current combined space.
    pub fn build(frame: &FrameFile) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, entry) in frame.combined_space().iter().enumerate() {
            let name = match entry.kind {
                SpaceKind::SceneFolder => frame
                    .scene_folders
                    .get(&entry.ref_id)
                    .map(|f| f.name.clone()),
                SpaceKind::Object => frame.objects.get(&entry.ref_id).map(|o| o.name().to_owned()),
                _ => None,
            };
            if let Some(name) = name {
                index.entry(name).or_default().push(position);
            }
        }
        Self { index }
    }

    /// CombinedSpace positions of every record carrying `name`.
    pub fn positions(&self, name: &str) -> &[usize] {
        self.index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of distinct names in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
