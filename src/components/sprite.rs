use bevy_ecs::prelude::Component;

/// Sprite is identified by a texture key and its display size in world units.
/// Frame-sequence animations keep `width`/`height` in sync with the frame they
/// select.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub tex_key: String,
    pub width: f32,
    pub height: f32,
}

impl Sprite {
    pub fn new(tex_key: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            tex_key: tex_key.into(),
            width,
            height,
        }
    }
}
