/// Sprite-grid animation: per-state cell sequences and the time-driven
/// cycle that walks them.
///
/// Each (sheet, state) pair maps to an ordered, cyclic sequence of
/// sprite-sheet cells. A per-entity accumulator adds elapsed frame time;
/// when it reaches the state's frame duration the cell index advances
/// modulo the sequence length and the accumulator resets.
///
/// Dead entities keep accumulating. They are never drawn, so the only
/// observable effect is that a hypothetical resurrection would resume
/// mid-cycle.

use super::entity::AnimState;

/// One (column, row) index into a sprite sheet.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SpriteCell {
    pub col: u8,
    pub row: u8,
}

const fn cell(col: u8, row: u8) -> SpriteCell {
    SpriteCell { col, row }
}

/// Which sprite sheet an entity draws from. The renderer maps
/// (sheet, cell) to its own representation; the domain only tracks indices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sheet {
    Hero,
    Skeleton,
    Monster,
    Effects,
}

// ── Cell sequences ──

const HERO_IDLE: &[SpriteCell] = &[cell(9, 0)];
const HERO_RUNNING: &[SpriteCell] = &[cell(9, 1), cell(9, 2), cell(9, 3)];
const HERO_JUMP: &[SpriteCell] = &[cell(10, 1), cell(10, 2)];
const HERO_FIGHT: &[SpriteCell] = &[cell(11, 1), cell(11, 2), cell(11, 3), cell(11, 4)];
const HERO_DEAD: &[SpriteCell] = &[cell(12, 0)];

const SKELETON_IDLE: &[SpriteCell] = &[cell(0, 0), cell(1, 0)];
const SKELETON_RUNNING: &[SpriteCell] = &[cell(0, 1), cell(1, 1), cell(2, 1)];
const SKELETON_DEAD: &[SpriteCell] = &[cell(3, 0)];

const MONSTER_IDLE: &[SpriteCell] = &[cell(0, 0), cell(1, 0)];
const MONSTER_RUNNING: &[SpriteCell] = &[cell(0, 1), cell(1, 1), cell(2, 1), cell(3, 1)];
const MONSTER_DEAD: &[SpriteCell] = &[cell(4, 0)];

/// Sword-swing transient: played once via the effect queue, never looped.
pub const SWORD_SWING: &[SpriteCell] = &[cell(0, 2), cell(1, 2), cell(2, 2), cell(3, 2)];

impl Sheet {
    /// Ordered cyclic cell sequence for a state. Always non-empty.
    pub fn sequence(self, state: AnimState) -> &'static [SpriteCell] {
        match self {
            Sheet::Hero => match state {
                AnimState::Idle => HERO_IDLE,
                AnimState::Running => HERO_RUNNING,
                AnimState::Jump => HERO_JUMP,
                AnimState::Fight => HERO_FIGHT,
                AnimState::Dead => HERO_DEAD,
            },
            Sheet::Skeleton => match state {
                AnimState::Running | AnimState::Fight => SKELETON_RUNNING,
                AnimState::Dead => SKELETON_DEAD,
                _ => SKELETON_IDLE,
            },
            Sheet::Monster => match state {
                AnimState::Running | AnimState::Fight => MONSTER_RUNNING,
                AnimState::Dead => MONSTER_DEAD,
                _ => MONSTER_IDLE,
            },
            Sheet::Effects => SWORD_SWING,
        }
    }
}

/// Seconds each cell stays up, per state.
pub fn frame_duration(state: AnimState) -> f32 {
    match state {
        AnimState::Idle => 0.35,
        AnimState::Running => 0.10,
        AnimState::Jump => 0.12,
        AnimState::Fight => 0.08,
        AnimState::Dead => 0.30,
    }
}

/// Per-entity animation cycle: current state, cell index, time accumulator.
#[derive(Clone, Debug)]
pub struct AnimCycle {
    state: AnimState,
    frame: usize,
    acc: f32,
}

impl AnimCycle {
    pub fn new(state: AnimState) -> Self {
        AnimCycle { state, frame: 0, acc: 0.0 }
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    /// Transition to a new state, restarting the cycle. Dead is terminal:
    /// once set, only `force_state` could leave it (nothing does today).
    pub fn set_state(&mut self, state: AnimState) {
        if self.state == AnimState::Dead || state == self.state {
            return;
        }
        self.state = state;
        self.frame = 0;
        self.acc = 0.0;
    }

    /// Unconditional transition, used when death is applied.
    pub fn force_state(&mut self, state: AnimState) {
        if state != self.state {
            self.state = state;
            self.frame = 0;
            self.acc = 0.0;
        }
    }

    /// Add elapsed frame time; advance the cell index when the state's
    /// frame duration is reached.
    pub fn advance(&mut self, dt: f32, sheet: Sheet) {
        let len = sheet.sequence(self.state).len();
        self.acc += dt;
        if self.acc >= frame_duration(self.state) {
            self.frame = (self.frame + 1) % len;
            self.acc = 0.0;
        }
    }

    /// Current sprite cell on the given sheet.
    pub fn cell(&self, sheet: Sheet) -> SpriteCell {
        let seq = sheet.sequence(self.state);
        seq[self.frame % seq.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_cycles_within_bounds_and_wraps() {
        let mut anim = AnimCycle::new(AnimState::Running);
        let seq = Sheet::Hero.sequence(AnimState::Running);
        let step = frame_duration(AnimState::Running);

        let mut seen = vec![];
        for _ in 0..(seq.len() * 2 + 1) {
            seen.push(anim.frame);
            anim.advance(step, Sheet::Hero);
        }
        // Strictly within [0, len), advancing by one each time, wrapping to 0
        for window in seen.windows(2) {
            assert!(window[0] < seq.len());
            assert_eq!(window[1], (window[0] + 1) % seq.len());
        }
        assert_eq!(seen[seq.len()], 0);
    }

    #[test]
    fn accumulator_below_threshold_holds_frame() {
        let mut anim = AnimCycle::new(AnimState::Running);
        anim.advance(frame_duration(AnimState::Running) * 0.4, Sheet::Hero);
        assert_eq!(anim.frame, 0);
        anim.advance(frame_duration(AnimState::Running) * 0.7, Sheet::Hero);
        assert_eq!(anim.frame, 1);
    }

    #[test]
    fn state_change_restarts_sequence() {
        let mut anim = AnimCycle::new(AnimState::Running);
        anim.advance(frame_duration(AnimState::Running), Sheet::Hero);
        assert_eq!(anim.frame, 1);
        anim.set_state(AnimState::Fight);
        assert_eq!(anim.frame, 0);
        assert_eq!(anim.state(), AnimState::Fight);
    }

    #[test]
    fn setting_same_state_does_not_restart() {
        let mut anim = AnimCycle::new(AnimState::Running);
        anim.advance(frame_duration(AnimState::Running), Sheet::Hero);
        anim.set_state(AnimState::Running);
        assert_eq!(anim.frame, 1);
    }

    #[test]
    fn dead_keeps_accumulating_but_stays_dead() {
        let mut anim = AnimCycle::new(AnimState::Running);
        anim.force_state(AnimState::Dead);
        anim.advance(1.0, Sheet::Hero);
        anim.set_state(AnimState::Running);
        assert_eq!(anim.state(), AnimState::Dead);
    }

    #[test]
    fn every_sheet_state_pair_has_a_sequence() {
        let states = [
            AnimState::Idle,
            AnimState::Running,
            AnimState::Jump,
            AnimState::Fight,
            AnimState::Dead,
        ];
        for sheet in [Sheet::Hero, Sheet::Skeleton, Sheet::Monster, Sheet::Effects] {
            for state in states {
                assert!(!sheet.sequence(state).is_empty());
            }
        }
    }
}
