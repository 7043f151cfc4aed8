//! Frame-sequence animation playback.
//!
//! A [`FrameSequencePlayer`] walks an ordered list of [`FrameId`]s at a fixed
//! rate. It is driven by timestamps, not by ticks: each call to
//! [`update`](FrameSequencePlayer::update) compares the shared clock against
//! the time the next frame is due and advances **at most one frame**, however
//! late the call is. A game that stalls for a second does not skip ahead; the
//! animation resumes where it was.
//!
//! # States
//!
//! ```text
//!  Idle ──play──▶ Playing ──update at end, one-shot──▶ Finished
//!                   │  ▲                                 │
//!                   │  └──update at end, looped──┘       │
//!                   └──stop──▶ Finished ◀────────────────┘
//!  Finished ──play / restart──▶ Playing
//! ```
//!
//! There is no paused state; withholding `update` calls pauses playback.
//!
//! All rates in this module are frames per second; the per-frame delay is
//! `1000 / fps` milliseconds.

use std::sync::Arc;

use bevy_ecs::prelude::{Component, Entity};
use log::debug;

use crate::components::sprite::Sprite;
use crate::events::animation::AnimationSink;
use crate::resources::animationstore::AnimationDef;
use crate::resources::framestore::{Frame, FrameData, FrameId, FrameStore};

/// Caller-contract violations reported by [`FrameSequencePlayer`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("invalid frame rate {rate}: expected a finite number of frames per second above zero")]
    InvalidFrameRate { rate: f64 },

    #[error("animation '{name}' has no frames")]
    EmptyFrameOrder { name: String },

    #[error("no frame table registered for texture '{tex_key}'")]
    UnknownTexture { tex_key: String },

    #[error("animation '{name}' used after destroy()")]
    Destroyed { name: String },
}

fn delay_for(rate: f64) -> Result<f64, AnimationError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(1000.0 / rate)
    } else {
        Err(AnimationError::InvalidFrameRate { rate })
    }
}

/// Playback state of one named frame sequence, owned by one entity.
#[derive(Component, Debug, Clone)]
pub struct FrameSequencePlayer {
    name: String,
    parent: Option<Entity>,
    frame_data: Option<Arc<FrameData>>,
    frames: Vec<FrameId>,
    delay_ms: f64,
    looped: bool,
    cursor: usize,
    current_frame: Option<Frame>,
    is_playing: bool,
    is_finished: bool,
    last_tick_at: f64,
    next_due_at: f64,
}

impl FrameSequencePlayer {
    /// Create an idle player for `parent`.
    ///
    /// `fps` must be finite and positive and `frames` must not be empty. The
    /// current frame is resolved from the first identifier right away.
    pub fn new(
        name: impl Into<String>,
        parent: Entity,
        frame_data: Arc<FrameData>,
        frames: impl IntoIterator<Item = impl Into<FrameId>>,
        fps: f64,
        looped: bool,
    ) -> Result<Self, AnimationError> {
        let name = name.into();
        let frames: Vec<FrameId> = frames.into_iter().map(Into::into).collect();
        if frames.is_empty() {
            return Err(AnimationError::EmptyFrameOrder { name });
        }
        let delay_ms = delay_for(fps)?;
        let current_frame = frame_data.lookup(&frames[0]).cloned();

        Ok(Self {
            name,
            parent: Some(parent),
            frame_data: Some(frame_data),
            frames,
            delay_ms,
            looped,
            cursor: 0,
            current_frame,
            is_playing: false,
            is_finished: false,
            last_tick_at: 0.0,
            next_due_at: 0.0,
        })
    }

    /// Build a player from a stored [`AnimationDef`].
    pub fn from_def(
        name: impl Into<String>,
        parent: Entity,
        def: &AnimationDef,
        frame_store: &FrameStore,
    ) -> Result<Self, AnimationError> {
        let frame_data =
            frame_store
                .get(&def.tex_key)
                .ok_or_else(|| AnimationError::UnknownTexture {
                    tex_key: def.tex_key.clone(),
                })?;
        Self::new(
            name,
            parent,
            frame_data,
            def.frames.iter().cloned(),
            def.fps,
            def.looped,
        )
    }

    fn owner(&self) -> Result<Entity, AnimationError> {
        self.parent.ok_or_else(|| AnimationError::Destroyed {
            name: self.name.clone(),
        })
    }

    fn refresh_current_frame(&mut self) {
        let frame = match (&self.frame_data, self.frames.get(self.cursor)) {
            (Some(data), Some(id)) => data.lookup(id).cloned(),
            _ => None,
        };
        self.current_frame = frame;
    }

    fn rewind(&mut self, now: f64) {
        self.is_playing = true;
        self.is_finished = false;
        self.last_tick_at = now;
        self.next_due_at = now + self.delay_ms;
        self.cursor = 0;
        self.refresh_current_frame();
    }

    /// Start playback from the first frame.
    ///
    /// `rate`, when given, replaces the current rate. Resets every playback
    /// field even if already playing and emits exactly one start
    /// notification. An invalid rate is rejected before any state changes.
    pub fn play(
        &mut self,
        now: f64,
        rate: Option<f64>,
        looped: bool,
        sink: &mut dyn AnimationSink,
    ) -> Result<&mut Self, AnimationError> {
        let entity = self.owner()?;
        if let Some(rate) = rate {
            self.delay_ms = delay_for(rate)?;
        }
        self.looped = looped;
        self.rewind(now);
        debug!(
            "animation '{}' playing on {:?} at {:.2} fps (looped: {})",
            self.name,
            entity,
            self.frame_rate(),
            looped
        );
        sink.on_animation_start(entity, self);
        Ok(self)
    }

    /// Replay from the first frame with the current rate and loop flag.
    /// Emits nothing.
    pub fn restart(&mut self, now: f64) -> Result<(), AnimationError> {
        self.owner()?;
        self.rewind(now);
        Ok(())
    }

    /// Stop playback and mark the animation finished. Idempotent.
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.is_finished = true;
    }

    /// Advance one frame if playing and `now` has reached the due time.
    ///
    /// Returns `Ok(true)` when a frame step happened (including the step that
    /// loops or completes the sequence). Never advances more than one frame
    /// per call.
    pub fn update(
        &mut self,
        now: f64,
        sink: &mut dyn AnimationSink,
    ) -> Result<bool, AnimationError> {
        let entity = self.owner()?;
        if !self.is_playing || now < self.next_due_at {
            return Ok(false);
        }

        self.last_tick_at = now;
        self.next_due_at = now + self.delay_ms;
        self.cursor += 1;

        if self.cursor < self.frames.len() {
            self.refresh_current_frame();
        } else if self.looped {
            self.cursor = 0;
            self.refresh_current_frame();
            sink.on_animation_loop(entity, self);
        } else {
            // Cursor stays one past the end; the frame is not re-resolved.
            self.is_playing = false;
            self.is_finished = true;
            debug!("animation '{}' completed on {:?}", self.name, entity);
            sink.on_animation_complete(entity, self);
        }

        Ok(true)
    }

    /// Index of the displayed frame in the frame table, or the cursor when
    /// no frame is resolved.
    pub fn frame(&self) -> usize {
        self.current_frame
            .as_ref()
            .map_or(self.cursor, |frame| frame.index)
    }

    /// Jump to frame `index` of the frame table.
    ///
    /// On a hit the owning sprite takes the frame's size and the cursor moves
    /// to `index`. On a miss the current frame becomes `None` and the sprite
    /// is left alone.
    pub fn set_frame(&mut self, index: usize, sprite: &mut Sprite) -> Result<(), AnimationError> {
        self.owner()?;
        self.current_frame = self
            .frame_data
            .as_ref()
            .and_then(|data| data.get_frame(index))
            .cloned();

        if let Some(frame) = &self.current_frame {
            sprite.width = frame.width as f32;
            sprite.height = frame.height as f32;
            self.cursor = index;
        }
        Ok(())
    }

    /// Release the entity, frame list and frame table. Safe to call again.
    pub fn destroy(&mut self) {
        if self.parent.is_some() {
            debug!("animation '{}' destroyed", self.name);
        }
        self.parent = None;
        self.frame_data = None;
        self.frames = Vec::new();
        self.current_frame = None;
        self.is_playing = false;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    pub fn is_destroyed(&self) -> bool {
        self.parent.is_none()
    }

    pub fn frame_total(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[FrameId] {
        &self.frames
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_frame.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn frame_rate(&self) -> f64 {
        1000.0 / self.delay_ms
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn last_tick_at(&self) -> f64 {
        self.last_tick_at
    }

    pub fn next_due_at(&self) -> f64 {
        self.next_due_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Notice {
        Start,
        Loop,
        Complete,
    }

    #[derive(Default)]
    struct RecordingSink {
        notices: Vec<(Notice, Entity, usize)>,
    }

    impl RecordingSink {
        fn count(&self, kind: Notice) -> usize {
            self.notices.iter().filter(|(n, _, _)| *n == kind).count()
        }
    }

    impl AnimationSink for RecordingSink {
        fn on_animation_start(&mut self, entity: Entity, animation: &FrameSequencePlayer) {
            self.notices.push((Notice::Start, entity, animation.cursor()));
        }
        fn on_animation_loop(&mut self, entity: Entity, animation: &FrameSequencePlayer) {
            self.notices.push((Notice::Loop, entity, animation.cursor()));
        }
        fn on_animation_complete(&mut self, entity: Entity, animation: &FrameSequencePlayer) {
            self.notices.push((Notice::Complete, entity, animation.cursor()));
        }
    }

    fn abc_frames() -> Arc<FrameData> {
        Arc::new(
            FrameData::new()
                .with_frame(Some("A"), 0, 0, 10, 20)
                .with_frame(Some("B"), 10, 0, 12, 22)
                .with_frame(Some("C"), 22, 0, 14, 24),
        )
    }

    fn owner() -> Entity {
        World::new().spawn_empty().id()
    }

    /// `[A, B, C]` at 10 fps: 100 ms per frame.
    fn abc_player(looped: bool) -> (FrameSequencePlayer, Entity) {
        let entity = owner();
        let player =
            FrameSequencePlayer::new("abc", entity, abc_frames(), ["A", "B", "C"], 10.0, looped)
                .unwrap();
        (player, entity)
    }

    #[test]
    fn new_starts_idle_on_first_frame() {
        let (player, entity) = abc_player(false);
        assert!(!player.is_playing());
        assert!(!player.is_finished());
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.frame_total(), 3);
        assert_eq!(player.parent(), Some(entity));
        assert_eq!(player.current_frame().unwrap().name.as_deref(), Some("A"));
        assert_eq!(player.delay_ms(), 100.0);
    }

    #[test]
    fn new_rejects_empty_frame_order() {
        let frames: [usize; 0] = [];
        let err = FrameSequencePlayer::new("empty", owner(), abc_frames(), frames, 10.0, false)
            .unwrap_err();
        assert_eq!(
            err,
            AnimationError::EmptyFrameOrder {
                name: "empty".to_string()
            }
        );
    }

    #[test]
    fn new_rejects_non_positive_or_non_finite_rates() {
        for rate in [0.0, -12.0, f64::NAN, f64::INFINITY] {
            let result = FrameSequencePlayer::new("abc", owner(), abc_frames(), [0usize], rate, false);
            assert!(
                matches!(result, Err(AnimationError::InvalidFrameRate { .. })),
                "rate {rate} accepted"
            );
        }
    }

    #[test]
    fn play_schedules_first_step_and_emits_start() {
        let (mut player, entity) = abc_player(false);
        let mut sink = RecordingSink::default();

        player.play(1000.0, None, true, &mut sink).unwrap();

        assert!(player.is_playing());
        assert!(player.looped());
        assert_eq!(player.last_tick_at(), 1000.0);
        assert_eq!(player.next_due_at(), 1100.0);
        assert_eq!(sink.notices, vec![(Notice::Start, entity, 0)]);
    }

    #[test]
    fn play_resets_a_running_animation() {
        let (mut player, _) = abc_player(false);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, false, &mut sink).unwrap();
        player.update(100.0, &mut sink).unwrap();
        player.update(200.0, &mut sink).unwrap();
        assert_eq!(player.cursor(), 2);

        player.play(250.0, None, false, &mut sink).unwrap();

        assert_eq!(player.cursor(), 0);
        assert_eq!(player.current_frame().unwrap().name.as_deref(), Some("A"));
        assert_eq!(player.next_due_at(), 350.0);
        assert_eq!(sink.count(Notice::Start), 2);
    }

    #[test]
    fn play_after_finish_starts_over() {
        let (mut player, _) = abc_player(false);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, false, &mut sink).unwrap();
        for t in [100.0, 200.0, 300.0] {
            player.update(t, &mut sink).unwrap();
        }
        assert!(player.is_finished());

        player.play(400.0, None, false, &mut sink).unwrap();
        assert!(player.is_playing());
        assert!(!player.is_finished());
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn play_with_rate_replaces_delay() {
        let (mut player, _) = abc_player(false);
        let mut sink = RecordingSink::default();
        player.play(0.0, Some(25.0), false, &mut sink).unwrap();
        assert_eq!(player.delay_ms(), 40.0);
        assert_eq!(player.next_due_at(), 40.0);
        assert_eq!(player.frame_rate(), 25.0);
    }

    #[test]
    fn play_with_invalid_rate_changes_nothing() {
        let (mut player, _) = abc_player(false);
        let mut sink = RecordingSink::default();
        let err = player.play(0.0, Some(0.0), true, &mut sink).unwrap_err();
        assert_eq!(err, AnimationError::InvalidFrameRate { rate: 0.0 });
        assert!(!player.is_playing());
        assert!(!player.looped());
        assert_eq!(player.delay_ms(), 100.0);
        assert!(sink.notices.is_empty());
    }

    #[test]
    fn update_before_due_time_is_a_no_op() {
        let (mut player, _) = abc_player(true);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, true, &mut sink).unwrap();
        let before = (
            player.cursor(),
            player.current_frame().cloned(),
            player.last_tick_at(),
            player.next_due_at(),
        );

        for t in [0.0, 50.0, 99.999] {
            assert!(!player.update(t, &mut sink).unwrap());
        }

        let after = (
            player.cursor(),
            player.current_frame().cloned(),
            player.last_tick_at(),
            player.next_due_at(),
        );
        assert_eq!(before, after);
        assert_eq!(sink.notices.len(), 1);
    }

    #[test]
    fn update_on_idle_player_does_nothing() {
        let (mut player, _) = abc_player(false);
        let mut sink = RecordingSink::default();
        assert!(!player.update(10_000.0, &mut sink).unwrap());
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn one_shot_visits_every_frame_once() {
        let entity = owner();
        let data = Arc::new(FrameData::from_strip(0, 0, 8, 8, 5));
        let mut player =
            FrameSequencePlayer::new("strip", entity, data, [0usize, 1, 2, 3, 4], 20.0, false).unwrap();
        let mut sink = RecordingSink::default();
        player.play(0.0, None, false, &mut sink).unwrap();

        let mut visited = vec![player.frame()];
        let mut t = 0.0;
        while player.is_playing() {
            t += player.delay_ms();
            assert!(player.update(t, &mut sink).unwrap());
            if player.is_playing() {
                visited.push(player.frame());
            }
        }

        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
        assert_eq!(sink.count(Notice::Complete), 1);
    }

    #[test]
    fn looped_sequence_wraps_and_notifies() {
        let (mut player, entity) = abc_player(true);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, true, &mut sink).unwrap();

        let mut cursors = Vec::new();
        for t in [100.0, 200.0, 300.0, 400.0] {
            assert!(player.update(t, &mut sink).unwrap());
            cursors.push(player.cursor());
        }

        assert_eq!(cursors, vec![1, 2, 0, 1]);
        assert_eq!(sink.count(Notice::Loop), 1);
        assert!(sink.notices.contains(&(Notice::Loop, entity, 0)));
        assert!(player.is_playing());
        assert_eq!(player.current_frame().unwrap().name.as_deref(), Some("B"));
    }

    #[test]
    fn one_shot_sequence_completes_and_stays_finished() {
        let (mut player, entity) = abc_player(false);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, false, &mut sink).unwrap();

        assert!(player.update(100.0, &mut sink).unwrap());
        assert!(player.update(200.0, &mut sink).unwrap());
        assert!(player.update(300.0, &mut sink).unwrap());

        assert!(player.is_finished());
        assert!(!player.is_playing());
        assert_eq!(sink.count(Notice::Complete), 1);
        assert!(sink.notices.contains(&(Notice::Complete, entity, 3)));
        assert_eq!(player.current_frame().unwrap().name.as_deref(), Some("C"));
        assert_eq!(player.cursor(), 3);
        assert_eq!(player.frame(), 2);

        assert!(!player.update(400.0, &mut sink).unwrap());
        assert_eq!(player.cursor(), 3);
        assert_eq!(sink.count(Notice::Complete), 1);
        assert_eq!(sink.count(Notice::Loop), 0);
    }

    #[test]
    fn late_update_advances_only_one_frame() {
        let (mut player, _) = abc_player(true);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, true, &mut sink).unwrap();

        let late = player.next_due_at() + 10.0 * player.delay_ms();
        assert!(player.update(late, &mut sink).unwrap());

        assert_eq!(player.cursor(), 1);
        assert_eq!(player.last_tick_at(), late);
        assert_eq!(player.next_due_at(), late + 100.0);
    }

    #[test]
    fn stop_then_update_is_a_no_op() {
        let (mut player, _) = abc_player(true);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, true, &mut sink).unwrap();

        player.stop();
        player.stop();

        assert!(player.is_finished());
        assert!(!player.update(1_000_000.0, &mut sink).unwrap());
        assert_eq!(player.cursor(), 0);
        assert_eq!(sink.notices.len(), 1);
    }

    #[test]
    fn restart_keeps_rate_and_loop_without_notifying() {
        let (mut player, _) = abc_player(false);
        let mut sink = RecordingSink::default();
        player.play(0.0, Some(50.0), true, &mut sink).unwrap();
        player.update(20.0, &mut sink).unwrap();
        player.stop();

        player.restart(500.0).unwrap();

        assert!(player.is_playing());
        assert!(!player.is_finished());
        assert!(player.looped());
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.next_due_at(), 520.0);
        assert_eq!(sink.count(Notice::Start), 1);
    }

    #[test]
    fn unknown_frame_id_resolves_to_none() {
        let entity = owner();
        let mut player =
            FrameSequencePlayer::new("gappy", entity, abc_frames(), ["A", "missing", "C"], 10.0, false)
                .unwrap();
        let mut sink = RecordingSink::default();
        player.play(0.0, None, false, &mut sink).unwrap();

        player.update(100.0, &mut sink).unwrap();
        assert!(player.current_frame().is_none());
        assert_eq!(player.frame(), 1);

        player.update(200.0, &mut sink).unwrap();
        assert_eq!(player.frame(), 2);
    }

    #[test]
    fn completion_with_unresolved_last_frame_reports_the_cursor() {
        let entity = owner();
        let mut player =
            FrameSequencePlayer::new("tail", entity, abc_frames(), [0usize, 9], 10.0, false).unwrap();
        let mut sink = RecordingSink::default();
        player.play(0.0, None, false, &mut sink).unwrap();

        player.update(100.0, &mut sink).unwrap();
        assert!(player.current_frame().is_none());
        player.update(200.0, &mut sink).unwrap();

        assert!(player.is_finished());
        assert_eq!(player.cursor(), 2);
        assert_eq!(player.frame(), 2);
        assert_eq!(sink.count(Notice::Complete), 1);
    }

    #[test]
    fn set_frame_syncs_sprite_size() {
        let (mut player, _) = abc_player(false);
        let mut sprite = Sprite::new("abc", 1.0, 1.0);

        player.set_frame(2, &mut sprite).unwrap();

        assert_eq!(player.frame(), 2);
        assert_eq!(player.cursor(), 2);
        assert_eq!((sprite.width, sprite.height), (14.0, 24.0));
    }

    #[test]
    fn set_frame_miss_leaves_sprite_untouched() {
        let (mut player, _) = abc_player(false);
        let mut sprite = Sprite::new("abc", 5.0, 6.0);
        player.set_frame(1, &mut sprite).unwrap();

        player.set_frame(99, &mut sprite).unwrap();

        assert!(player.current_frame().is_none());
        assert_eq!(player.cursor(), 1);
        assert_eq!((sprite.width, sprite.height), (12.0, 22.0));
    }

    #[test]
    fn destroy_releases_everything_and_is_repeatable() {
        let (mut player, _) = abc_player(true);
        let mut sink = RecordingSink::default();
        player.play(0.0, None, true, &mut sink).unwrap();

        player.destroy();
        player.destroy();

        assert!(player.is_destroyed());
        assert!(!player.is_playing());
        assert!(player.current_frame().is_none());
        assert_eq!(player.frame_total(), 0);
        assert_eq!(player.parent(), None);
    }

    #[test]
    fn use_after_destroy_is_reported() {
        let (mut player, _) = abc_player(true);
        let mut sink = RecordingSink::default();
        let mut sprite = Sprite::new("abc", 1.0, 1.0);
        player.destroy();

        let destroyed = AnimationError::Destroyed {
            name: "abc".to_string(),
        };
        assert_eq!(player.update(100.0, &mut sink).unwrap_err(), destroyed);
        assert_eq!(player.play(0.0, None, true, &mut sink).unwrap_err(), destroyed);
        assert_eq!(player.restart(0.0).unwrap_err(), destroyed);
        assert_eq!(player.set_frame(0, &mut sprite).unwrap_err(), destroyed);
        assert!(sink.notices.is_empty());
        assert_eq!((sprite.width, sprite.height), (1.0, 1.0));
    }

    #[test]
    fn from_def_resolves_frame_table() {
        let mut store = FrameStore::new();
        store.insert("hero", FrameData::from_strip(0, 0, 16, 16, 4));
        let def = AnimationDef::new("hero", [3usize, 2, 1], 8.0, true);

        let player = FrameSequencePlayer::from_def("walk", owner(), &def, &store).unwrap();
        assert_eq!(player.name(), "walk");
        assert_eq!(player.frame(), 3);
        assert_eq!(player.delay_ms(), 125.0);
        assert!(player.looped());

        let missing = AnimationDef::new("villain", [0usize], 8.0, true);
        assert_eq!(
            FrameSequencePlayer::from_def("walk", owner(), &missing, &store).unwrap_err(),
            AnimationError::UnknownTexture {
                tex_key: "villain".to_string()
            }
        );
    }
}
