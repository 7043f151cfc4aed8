//! Frame tables for sprite-sheet animations.
//!
//! A [`FrameData`] describes every frame of one texture atlas. Animations
//! refer to frames through a [`FrameId`], either by absolute index or by the
//! frame's name, and resolve them here. A lookup that misses returns `None`;
//! callers treat that as "no frame", never as a failure.
//!
//! The [`FrameStore`] resource keeps one shared `FrameData` per texture key so
//! any number of animation players can hold the same table.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a frame inside a [`FrameData`].
///
/// Deserializes from a bare JSON number (`3`) or string (`"walk_0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameId {
    Index(usize),
    Name(String),
}

impl From<usize> for FrameId {
    fn from(index: usize) -> Self {
        FrameId::Index(index)
    }
}

impl From<&str> for FrameId {
    fn from(name: &str) -> Self {
        FrameId::Name(name.to_string())
    }
}

impl From<String> for FrameId {
    fn from(name: String) -> Self {
        FrameId::Name(name)
    }
}

/// Geometry of one frame in the atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Position of the frame inside its [`FrameData`].
    pub index: usize,
    /// Optional symbolic name.
    pub name: Option<String>,
    /// Top-left corner of the region in the texture, in pixels.
    pub x: u32,
    pub y: u32,
    /// Region size in pixels.
    pub width: u32,
    pub height: u32,
}

/// Ordered frames of a single texture atlas.
#[derive(Debug, Clone, Default)]
pub struct FrameData {
    frames: Vec<Frame>,
    names: FxHashMap<String, usize>,
}

impl FrameData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame region and return its index.
    ///
    /// A name that is already taken is re-pointed at the new frame.
    pub fn add_frame(
        &mut self,
        name: Option<&str>,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> usize {
        let index = self.frames.len();
        if let Some(name) = name {
            self.names.insert(name.to_string(), index);
        }
        self.frames.push(Frame {
            index,
            name: name.map(str::to_string),
            x,
            y,
            width,
            height,
        });
        index
    }

    /// Builder-style variant of [`add_frame`](Self::add_frame).
    pub fn with_frame(
        mut self,
        name: Option<&str>,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Self {
        self.add_frame(name, x, y, width, height);
        self
    }

    /// Slice a horizontal strip of equally sized frames starting at `(x, y)`.
    pub fn from_strip(x: u32, y: u32, width: u32, height: u32, count: usize) -> Self {
        let mut data = Self::new();
        for i in 0..count {
            data.add_frame(None, x + i as u32 * width, y, width, height);
        }
        data
    }

    pub fn get_frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn get_frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.names.get(name).and_then(|&i| self.frames.get(i))
    }

    /// Resolve a [`FrameId`] to its frame, if present.
    pub fn lookup(&self, id: &FrameId) -> Option<&Frame> {
        match id {
            FrameId::Index(index) => self.get_frame(*index),
            FrameId::Name(name) => self.get_frame_by_name(name),
        }
    }

    pub fn total(&self) -> usize {
        self.frames.len()
    }
}

/// Registry of frame tables keyed by texture key.
#[derive(Resource, Default)]
pub struct FrameStore {
    pub atlases: FxHashMap<String, Arc<FrameData>>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the frame table for a texture.
    pub fn insert(&mut self, tex_key: impl Into<String>, data: FrameData) -> Arc<FrameData> {
        let data = Arc::new(data);
        self.atlases.insert(tex_key.into(), Arc::clone(&data));
        data
    }

    /// Shared handle to the frame table of `tex_key`.
    pub fn get(&self, tex_key: &str) -> Option<Arc<FrameData>> {
        self.atlases.get(tex_key).cloned()
    }
}
