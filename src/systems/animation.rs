//! Animation systems.
//!
//! - [`animation`] advances every [`FrameSequencePlayer`] against the shared
//!   clock and forwards lifecycle notifications as ECS events.
//! - [`play_animation_observer`] starts stored animations on request.
//!
//! # Animation Flow
//!
//! 1. Frame tables live in [`FrameStore`](crate::resources::framestore::FrameStore),
//!    reusable sequences in [`AnimationStore`](crate::resources::animationstore::AnimationStore)
//! 2. Entities carry a [`FrameSequencePlayer`] built for them
//! 3. The [`FrameClock`](crate::clock::FrameClock) writes `WorldTime.now` and runs the game loop
//! 4. The game loop runs `animation`, which steps each player at most one frame
//! 5. Observers react to [`AnimationStartEvent`](crate::events::animation::AnimationStartEvent),
//!    [`AnimationLoopEvent`](crate::events::animation::AnimationLoopEvent) and
//!    [`AnimationCompleteEvent`](crate::events::animation::AnimationCompleteEvent)

use bevy_ecs::prelude::*;
use log::{debug, error, warn};

use crate::components::animation::FrameSequencePlayer;
use crate::events::animation::{
    AnimationSink, AnimationStartEvent, CommandsSink, PlayAnimationEvent,
};
use crate::resources::animationstore::AnimationStore;
use crate::resources::framestore::FrameStore;
use crate::resources::worldtime::WorldTime;

/// Step animation playback.
///
/// Contract
/// - Reads [`WorldTime::now`] (milliseconds).
/// - Mutates [`FrameSequencePlayer`] state; notifications are triggered
///   through `Commands` and reach observers when commands apply.
/// - A destroyed player gets no further updates; its component is removed.
pub fn animation(
    mut query: Query<(Entity, &mut FrameSequencePlayer)>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    let now = time.now;
    let mut removed = Vec::new();
    {
        let mut sink = CommandsSink::new(&mut commands);
        for (entity, mut player) in query.iter_mut() {
            if player.is_destroyed() {
                removed.push(entity);
                continue;
            }
            if !player.is_playing() {
                continue;
            }
            if let Err(e) = player.update(now, &mut sink) {
                error!("animation update failed on {:?}: {}", entity, e);
            }
        }
    }
    for entity in removed {
        debug!("removing destroyed animation from {:?}", entity);
        commands.entity(entity).remove::<FrameSequencePlayer>();
    }
}

/// Records that `play` announced a start, so the event can be triggered
/// after the new player has been inserted.
#[derive(Default)]
struct StartLatch(bool);

impl AnimationSink for StartLatch {
    fn on_animation_start(&mut self, _entity: Entity, _animation: &FrameSequencePlayer) {
        self.0 = true;
    }
    fn on_animation_loop(&mut self, _entity: Entity, _animation: &FrameSequencePlayer) {}
    fn on_animation_complete(&mut self, _entity: Entity, _animation: &FrameSequencePlayer) {}
}

/// Observer that starts a stored animation on an entity.
///
/// When a [`PlayAnimationEvent`] is triggered:
///
/// 1. Looks up the definition in [`AnimationStore`]
/// 2. Builds a new [`FrameSequencePlayer`] over the definition's frame table
/// 3. Plays it at `WorldTime.now`, applying the event's overrides
/// 4. Inserts it on the entity, replacing (and releasing) any previous player
/// 5. Triggers [`AnimationStartEvent`] once the player is in place
///
/// Unknown animations or textures and invalid rates are logged and ignored.
pub fn play_animation_observer(
    trigger: On<PlayAnimationEvent>,
    animation_store: Res<AnimationStore>,
    frame_store: Res<FrameStore>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Some(def) = animation_store.get(&event.animation) else {
        warn!("animation '{}' not found in store", event.animation);
        return;
    };

    let mut player =
        match FrameSequencePlayer::from_def(event.animation.clone(), event.entity, def, &frame_store)
        {
            Ok(player) => player,
            Err(e) => {
                error!("cannot build animation '{}': {}", event.animation, e);
                return;
            }
        };

    let mut latch = StartLatch::default();
    let looped = event.looped.unwrap_or(def.looped);
    if let Err(e) = player.play(time.now, event.rate, looped, &mut latch) {
        error!("cannot play animation '{}': {}", event.animation, e);
        return;
    }

    commands.entity(event.entity).try_insert(player);
    if latch.0 {
        commands.trigger(AnimationStartEvent {
            entity: event.entity,
            animation: event.animation.clone(),
        });
    }
}
