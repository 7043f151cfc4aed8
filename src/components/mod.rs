//! ECS components for entities.
//!
//! This module groups the component types that can be attached to entities
//! in the game world.
//!
//! Submodules overview:
//! - [`animation`] – frame-sequence playback state and its errors
//! - [`sprite`] – texture key and on-screen size of a 2D sprite

pub mod animation;
pub mod sprite;
