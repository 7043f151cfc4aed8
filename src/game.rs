//! Demo scene: a hero that jumps once, then walks forever.
//!
//! Builds the frame table and animation definitions the binary plays, wires
//! the lifecycle observers, and exposes the per-tick [`Schedule`].
//!
//! The "hero" atlas lays its frames out in a single row:
//!
//! | index | name     | size   |
//! |-------|----------|--------|
//! | 0     | `idle`   | 32x48  |
//! | 1..=4 | `walk_N` | 32x48  |
//! | 5..=7 | `jump_N` | 40x56  |

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::info;

use crate::components::animation::FrameSequencePlayer;
use crate::components::sprite::Sprite;
use crate::events::animation::{
    AnimationCompleteEvent, AnimationLoopEvent, AnimationStartEvent, PlayAnimationEvent,
};
use crate::resources::animationstore::{AnimationDef, AnimationStore};
use crate::resources::framestore::{FrameData, FrameStore};
use crate::resources::gameconfig::GameConfig;
use crate::systems::animation::{animation, play_animation_observer};

pub const HERO_TEX: &str = "hero";
pub const WALK: &str = "walk";
pub const JUMP: &str = "jump";
const JUMP_FPS: f64 = 8.0;

/// Frame table of the hero sheet.
pub fn hero_frames() -> FrameData {
    let mut data = FrameData::new();
    data.add_frame(Some("idle"), 0, 0, 32, 48);
    for i in 0..4 {
        data.add_frame(Some(&format!("walk_{i}")), 32 * (i + 1), 0, 32, 48);
    }
    for i in 0..3 {
        data.add_frame(Some(&format!("jump_{i}")), 160 + 40 * i, 0, 40, 56);
    }
    data
}

/// Register assets and observers, spawn the hero and start its jump.
///
/// Expects `FrameStore`, `AnimationStore` and `WorldTime` to already be in
/// the world. Returns the hero entity.
pub fn setup(world: &mut World, config: &GameConfig) -> Entity {
    world.resource_mut::<FrameStore>().insert(HERO_TEX, hero_frames());
    {
        let mut animations = world.resource_mut::<AnimationStore>();
        animations.insert(
            WALK,
            AnimationDef::new(
                HERO_TEX,
                ["walk_0", "walk_1", "walk_2", "walk_3"],
                config.default_fps,
                true,
            ),
        );
        animations.insert(
            JUMP,
            AnimationDef::new(HERO_TEX, ["jump_0", "jump_1", "jump_2"], JUMP_FPS, false),
        );
    }

    world.spawn(Observer::new(play_animation_observer));
    world.spawn(Observer::new(log_animation_start));
    world.spawn(Observer::new(log_animation_loop));
    world.spawn(Observer::new(walk_after_jump));
    world.flush();

    let hero = world.spawn(Sprite::new(HERO_TEX, 32.0, 48.0)).id();
    world.trigger(PlayAnimationEvent::new(hero, JUMP));
    world.flush();
    info!("hero {:?} ready", hero);
    hero
}

fn log_animation_start(trigger: On<AnimationStartEvent>) {
    let event = trigger.event();
    info!("{:?} started '{}'", event.entity, event.animation);
}

fn log_animation_loop(trigger: On<AnimationLoopEvent>) {
    let event = trigger.event();
    info!("{:?} looped '{}'", event.entity, event.animation);
}

/// Chain the walk cycle after the jump lands.
fn walk_after_jump(trigger: On<AnimationCompleteEvent>, mut commands: Commands) {
    let event = trigger.event();
    info!("{:?} completed '{}'", event.entity, event.animation);
    if event.animation == JUMP {
        commands.trigger(PlayAnimationEvent::new(event.entity, WALK));
    }
}

/// Keep each sprite sized to the frame its player shows.
pub fn sync_sprite_size(mut query: Query<(&FrameSequencePlayer, &mut Sprite)>) {
    for (player, mut sprite) in query.iter_mut() {
        if let Some(frame) = player.current_frame() {
            let (w, h) = (frame.width as f32, frame.height as f32);
            if sprite.width != w || sprite.height != h {
                sprite.width = w;
                sprite.height = h;
            }
        }
    }
}

/// Systems run once per clock tick.
pub fn update_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(animation);
    update.add_systems(sync_sprite_size.after(animation));
    update
}
