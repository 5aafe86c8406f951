/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messaging.

use crate::domain::entity::EnemyKind;

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    /// The player took contact damage. Fires every qualifying frame.
    PlayerHurt,
    PlayerDied,
    /// A melee swing connected. `variant` is the grunt sound 1..=3.
    EnemyHurt { id: usize, kind: EnemyKind, variant: u8 },
    EnemyDied { id: usize, kind: EnemyKind },
    /// Melee attack fired (cooldown elapsed).
    SwordSwing,
    /// The last live enemy fell.
    Victory,
}
