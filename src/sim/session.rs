/// Session: the embeddable driver around a `WorldState`.
///
/// The host adapter (terminal main loop, or a test) owns a `Session`,
/// feeds it sampled input, and drives it through the `Lifecycle` trait.
/// The session knows nothing about terminals, keyboards, or audio.

use std::mem;

use crate::config::GameConfig;
use crate::domain::entity::FrameInput;

use super::event::GameEvent;
use super::step;
use super::world::{Phase, WorldState};

/// The frame-driver contract between a host and a running game.
pub trait Lifecycle {
    /// One-time setup before the first frame.
    fn initialize(&mut self);
    /// Advance the simulation by `dt` seconds and return the events
    /// the frame produced.
    fn step(&mut self, dt: f32) -> Vec<GameEvent>;
    /// The host's view surface changed size (terminal columns x rows).
    fn resize(&mut self, cols: u16, rows: u16);
    /// Final teardown; the session must not be stepped afterwards.
    fn teardown(&mut self);
}

pub struct Session {
    pub world: WorldState,
    /// Input accumulated since the last step; OR-merged, consumed per frame.
    pending: FrameInput,
    view: (u16, u16),
    finished: bool,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Session {
            world: WorldState::new(config.combat.clone(), config.speed.clone()),
            pending: FrameInput::default(),
            view: (0, 0),
            finished: false,
        }
    }

    /// Merge sampled input into the frame's pending input. Several calls
    /// between steps combine; the next step consumes the union.
    pub fn queue_input(&mut self, input: FrameInput) {
        self.pending.left |= input.left;
        self.pending.right |= input.right;
        self.pending.up |= input.up;
        self.pending.down |= input.down;
        self.pending.jump |= input.jump;
        self.pending.attack |= input.attack;
    }

    /// Leave the title screen and start playing.
    pub fn begin(&mut self) {
        if self.world.phase == Phase::Title {
            self.world.phase = Phase::Playing;
        }
    }

    pub fn restart(&mut self) {
        step::restart(&mut self.world);
        self.pending = FrameInput::default();
    }

    pub fn view_size(&self) -> (u16, u16) {
        self.view
    }
}

impl Lifecycle for Session {
    fn initialize(&mut self) {
        self.world.set_message("Clear the glade!", 3.0);
    }

    fn step(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.finished {
            return vec![];
        }
        let input = mem::take(&mut self.pending);
        step::step(&mut self.world, input, dt)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.view = (cols, rows);
    }

    fn teardown(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&GameConfig::default())
    }

    #[test]
    fn starts_on_title_and_begin_enters_play() {
        let mut s = session();
        assert_eq!(s.world.phase, Phase::Title);

        // Title frames are inert
        s.queue_input(FrameInput { right: true, ..Default::default() });
        let before = s.world.player.pos;
        s.step(1.0 / 60.0);
        assert_eq!(s.world.player.pos, before);

        s.begin();
        assert_eq!(s.world.phase, Phase::Playing);
    }

    #[test]
    fn queued_input_merges_and_is_consumed_once() {
        let mut s = session();
        s.begin();
        s.queue_input(FrameInput { right: true, ..Default::default() });
        s.queue_input(FrameInput { up: true, ..Default::default() });

        let before = s.world.player.pos;
        s.step(1.0 / 60.0);
        let after = s.world.player.pos;
        assert!(after.x > before.x);
        assert!(after.y > before.y);

        // Second step with nothing queued: no further movement
        s.step(1.0 / 60.0);
        assert_eq!(s.world.player.pos, after);
    }

    #[test]
    fn resize_records_view_dimensions() {
        let mut s = session();
        s.resize(120, 40);
        assert_eq!(s.view_size(), (120, 40));
    }

    #[test]
    fn teardown_makes_further_steps_inert() {
        let mut s = session();
        s.begin();
        s.teardown();
        s.queue_input(FrameInput { right: true, ..Default::default() });
        let before = s.world.player.pos;
        assert!(s.step(1.0 / 60.0).is_empty());
        assert_eq!(s.world.player.pos, before);
    }
}
