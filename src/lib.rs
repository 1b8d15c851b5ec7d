//! Poem Arcade - three mini-games launched from a modal on a poem page
//!
//! Core modules:
//! - `sim`: Runner simulation (physics, obstacles, collisions, scoring)
//! - `puzzle`: Stanza line-ordering puzzle
//! - `memory`: Card-matching memory game
//! - `session`: Launch surface and per-session game context
//! - `scheduler`: Delayed tasks keyed by session
//! - `renderer`: WebGPU rendering pipeline for the runner
//! - `tuning`: Data-driven runner balance
//! - `settings`: Player preferences
//! - `ui`: HTML markup and feedback text

pub mod memory;
pub mod puzzle;
pub mod renderer;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use scheduler::{Scheduler, SessionId, TimerKind};
pub use session::{Arcade, ArcadeEvent, GameKind};
pub use settings::{Settings, SettingsError};
pub use tuning::{RunnerTuning, SpeedUpPolicy, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap fed to the accumulator (tab switches, stalls)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Play field dimensions (canvas pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 760.0;
    pub const FIELD_HEIGHT: f32 = 400.0;

    /// Player top edge when standing
    pub const GROUND_LINE: f32 = 350.0;
    /// Top of the ground strip; obstacles stand on it
    pub const GROUND_TOP: f32 = 390.0;
    pub const GROUND_THICKNESS: f32 = 10.0;

    /// Player box
    pub const PLAYER_X: f32 = 50.0;
    pub const PLAYER_SIZE: f32 = 40.0;

    /// Puzzle feedback shown before the next stanza appears
    pub const PUZZLE_ADVANCE_DELAY_MS: f64 = 1000.0;
    /// Mismatched memory cards stay face up this long
    pub const MEMORY_HIDE_DELAY_MS: f64 = 1000.0;
    /// Delay between the last match and the completion message
    pub const MEMORY_COMPLETE_DELAY_MS: f64 = 500.0;
}
