//! Engine systems.
//!
//! This module groups the ECS systems and observers that advance the
//! simulation.
//!
//! Submodules overview
//! - [`animation`] – advance frame-sequence players and start stored animations
//! - [`time`] – write the clock timestamp into [`crate::resources::worldtime::WorldTime`]

pub mod animation;
pub mod time;
