//! Animation resource registry.
//!
//! This module provides a minimal store for animation definitions that can be
//! reused by multiple entities. Game code looks up a definition by a string
//! key and turns it into a
//! [`FrameSequencePlayer`](crate::components::animation::FrameSequencePlayer)
//! for a specific entity.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::resources::framestore::FrameId;

/// Central registry of reusable animation definitions keyed by name.
#[derive(Resource, Default)]
pub struct AnimationStore {
    pub animations: FxHashMap<String, AnimationDef>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, def: AnimationDef) {
        self.animations.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&AnimationDef> {
        self.animations.get(name)
    }
}

/// Immutable data describing one frame sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    /// Key of the frame table in [`FrameStore`](crate::resources::framestore::FrameStore).
    pub tex_key: String,
    /// Frames to show, in order.
    pub frames: Vec<FrameId>,
    /// Playback rate in frames per second.
    pub fps: f64,
    /// Whether the sequence restarts after the last frame.
    pub looped: bool,
}

impl AnimationDef {
    pub fn new(
        tex_key: impl Into<String>,
        frames: impl IntoIterator<Item = impl Into<FrameId>>,
        fps: f64,
        looped: bool,
    ) -> Self {
        Self {
            tex_key: tex_key.into(),
            frames: frames.into_iter().map(Into::into).collect(),
            fps,
            looped,
        }
    }
}
