//! Runner simulation module
//!
//! All runner gameplay lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use state::{Obstacle, ObstacleKind, Player, RunnerPhase, RunnerState};
pub use tick::{RunnerEvent, TickInput, autopilot_wants_jump, tick};
