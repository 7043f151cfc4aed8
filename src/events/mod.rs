//! Event types exchanged between systems and observers.
//!
//! Events provide a decoupled way for systems to communicate without direct
//! dependencies.
//!
//! Submodules:
//! - [`animation`] – animation lifecycle notifications and play requests
//!
//! See each submodule for concrete event data, semantics, and example usage.
pub mod animation;
