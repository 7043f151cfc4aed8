//! Animation lifecycle notifications.
//!
//! A [`FrameSequencePlayer`] reports three moments of its playback to the
//! entity that owns it: it started, it wrapped around to its first frame, or
//! it reached the end of a one-shot sequence. The player only ever talks to an
//! [`AnimationSink`] it is handed for the duration of a call; it never stores
//! or owns one.
//!
//! Inside the ECS the sink is [`CommandsSink`], which triggers
//! [`AnimationStartEvent`], [`AnimationLoopEvent`] and
//! [`AnimationCompleteEvent`]. Observers subscribe to those:
//!
//! ```ignore
//! world.add_observer(|trigger: On<AnimationCompleteEvent>| {
//!     log::info!("{} finished on {:?}", trigger.event().animation, trigger.event().entity);
//! });
//! ```
//!
//! [`PlayAnimationEvent`] goes the other way: game code triggers it to start a
//! stored animation on an entity.
//!
//! # Related
//!
//! - [`crate::components::animation::FrameSequencePlayer`] – emits the notifications
//! - [`crate::systems::animation::animation`] – system that drives players with a `CommandsSink`
//! - [`crate::systems::animation::play_animation_observer`] – handles `PlayAnimationEvent`

use bevy_ecs::prelude::*;

use crate::components::animation::FrameSequencePlayer;

/// Receiver of animation lifecycle notifications.
///
/// Calls are synchronous and fire-and-forget.
pub trait AnimationSink {
    fn on_animation_start(&mut self, entity: Entity, animation: &FrameSequencePlayer);
    fn on_animation_loop(&mut self, entity: Entity, animation: &FrameSequencePlayer);
    fn on_animation_complete(&mut self, entity: Entity, animation: &FrameSequencePlayer);
}

/// Emitted when `play` starts an animation.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationStartEvent {
    /// The entity that owns the animation.
    pub entity: Entity,
    /// Animation name.
    pub animation: String,
}

/// Emitted when a looped animation wraps back to its first frame.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationLoopEvent {
    pub entity: Entity,
    pub animation: String,
}

/// Emitted when a one-shot animation advances past its last frame.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationCompleteEvent {
    pub entity: Entity,
    pub animation: String,
}

/// [`AnimationSink`] that turns notifications into triggered ECS events.
///
/// Events are queued on the borrowed [`Commands`] and reach observers when
/// the commands are applied.
pub struct CommandsSink<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
}

impl<'a, 'w, 's> CommandsSink<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>) -> Self {
        Self { commands }
    }
}

impl AnimationSink for CommandsSink<'_, '_, '_> {
    fn on_animation_start(&mut self, entity: Entity, animation: &FrameSequencePlayer) {
        self.commands.trigger(AnimationStartEvent {
            entity,
            animation: animation.name().to_string(),
        });
    }

    fn on_animation_loop(&mut self, entity: Entity, animation: &FrameSequencePlayer) {
        self.commands.trigger(AnimationLoopEvent {
            entity,
            animation: animation.name().to_string(),
        });
    }

    fn on_animation_complete(&mut self, entity: Entity, animation: &FrameSequencePlayer) {
        self.commands.trigger(AnimationCompleteEvent {
            entity,
            animation: animation.name().to_string(),
        });
    }
}

/// Request to (re)start a stored animation on an entity.
///
/// Handled by [`play_animation_observer`](crate::systems::animation::play_animation_observer),
/// which builds a fresh player from the
/// [`AnimationStore`](crate::resources::animationstore::AnimationStore)
/// definition, plays it at the current `WorldTime.now`, and replaces any
/// player the entity already had.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlayAnimationEvent {
    pub entity: Entity,
    /// Key in the animation store.
    pub animation: String,
    /// Override of the stored rate, in frames per second.
    pub rate: Option<f64>,
    /// Override of the stored loop flag.
    pub looped: Option<bool>,
}

impl PlayAnimationEvent {
    pub fn new(entity: Entity, animation: impl Into<String>) -> Self {
        Self {
            entity,
            animation: animation.into(),
            rate: None,
            looped: None,
        }
    }
}
