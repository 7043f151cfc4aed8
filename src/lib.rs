//! Flipbook library.
//!
//! This module exposes the frame clock and the animation player, together
//! with their ECS components, resources, systems, and events, for use in
//! integration tests and as a reusable library.

pub mod clock;
pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
