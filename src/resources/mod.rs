//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution.
//!
//! Overview
//! - `animationstore` – animation definitions reused across entities
//! - `framestore` – frame tables of texture atlases keyed by texture
//! - `gameconfig` – clock, animation and logging settings from `config.ini`
//! - `worldtime` – clock timestamp, simulation time and delta
pub mod animationstore;
pub mod framestore;
pub mod gameconfig;
pub mod worldtime;
