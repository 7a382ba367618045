//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the `dt` handed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combo;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, aabb_overlap};
pub use combo::ComboState;
pub use spawn::{SpawnCadence, Spawner, WeightedTable};
pub use state::{
    ActiveEffects, ActivePowerUp, Catcher, FallingItem, GameEvent, ItemKind, PowerUpEffect,
    PowerUpKind, Session, SessionPhase, SessionStats,
};
pub use tick::{TickInput, pause, resume, start_session, stop_session, tick};
