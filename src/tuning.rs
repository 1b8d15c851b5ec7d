//! Data-driven runner balance
//!
//! The defaults reproduce the page's feel. Hand-edited values go through
//! `validate`, which also checks that a jump can actually clear the tallest
//! obstacle at base speed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{GROUND_LINE, GROUND_TOP, PLAYER_SIZE};

/// Upper bound on simulated jump ticks (a valid jump lands long before this)
const MAX_JUMP_TICKS: u32 = 10_000;
/// Largest accepted points per clear and speed-up interval
pub const MAX_SCORE_STEP: u64 = 1_000_000;
pub const MAX_SPEED_UP_EVERY: u64 = 1_000_000_000;

/// When the runner speeds up as the score grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedUpPolicy {
    /// Once per interval boundary the score moves past (any score step works)
    #[default]
    OnCrossing,
    /// Only when the score lands exactly on a multiple of the interval
    OnExactMultiple,
}

impl SpeedUpPolicy {
    /// Number of speed-ups earned by a score change from `old` to `new`
    pub fn speed_ups(self, old: u64, new: u64, every: u64) -> u64 {
        if new <= old || every == 0 {
            return 0;
        }
        match self {
            SpeedUpPolicy::OnCrossing => new / every - old / every,
            SpeedUpPolicy::OnExactMultiple => u64::from(new % every == 0),
        }
    }
}

/// Invalid tuning values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("{field} range is empty ({min}..{max})")]
    EmptyRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("obstacles up to {height} tall do not fit above the ground")]
    ObstacleTooTall { height: f32 },

    #[error("jump covers {reach:.1} units above the tallest obstacle, needs {needed:.1}")]
    JumpTooShort { reach: f32, needed: f32 },
}

/// Runner physics, scoring and spawn balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    /// Added to vertical velocity every tick (units/tick²)
    pub gravity: f32,
    /// Upward impulse magnitude of a jump (units/tick)
    pub jump_force: f32,
    /// Scroll speed after a reset (units/tick)
    pub base_speed: f32,
    /// Scroll speed gained per speed-up
    pub speed_step: f32,
    /// Points per cleared obstacle
    pub score_step: u64,
    /// Score interval between speed-ups
    pub speed_up_every: u64,
    pub speed_up_policy: SpeedUpPolicy,
    pub obstacle_min_width: f32,
    pub obstacle_max_width: f32,
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,
    /// Delay range between obstacle spawns (ms, max exclusive)
    pub spawn_min_delay_ms: f64,
    pub spawn_max_delay_ms: f64,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            jump_force: 13.0,
            base_speed: 6.0,
            speed_step: 0.5,
            score_step: 10,
            speed_up_every: 100,
            speed_up_policy: SpeedUpPolicy::OnCrossing,
            obstacle_min_width: 30.0,
            obstacle_max_width: 50.0,
            obstacle_min_height: 30.0,
            obstacle_max_height: 60.0,
            spawn_min_delay_ms: 1500.0,
            spawn_max_delay_ms: 3000.0,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_nan() || value <= 0.0 {
        return Err(TuningError::NonPositive { field, value });
    }
    Ok(())
}

fn at_most(field: &'static str, value: u64, max: u64) -> Result<(), TuningError> {
    if value > max {
        return Err(TuningError::TooLarge { field, value, max });
    }
    Ok(())
}

fn range(field: &'static str, min: f64, max: f64) -> Result<(), TuningError> {
    positive(field, min)?;
    if max.is_nan() || max <= min {
        return Err(TuningError::EmptyRange { field, min, max });
    }
    Ok(())
}

impl RunnerTuning {
    /// Check every value and the derived jump clearance
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("gravity", self.gravity as f64)?;
        positive("jump_force", self.jump_force as f64)?;
        positive("base_speed", self.base_speed as f64)?;
        positive("score_step", self.score_step as f64)?;
        positive("speed_up_every", self.speed_up_every as f64)?;
        at_most("score_step", self.score_step, MAX_SCORE_STEP)?;
        at_most("speed_up_every", self.speed_up_every, MAX_SPEED_UP_EVERY)?;
        if self.speed_step.is_nan() || self.speed_step < 0.0 {
            return Err(TuningError::Negative {
                field: "speed_step",
                value: self.speed_step as f64,
            });
        }
        range(
            "obstacle width",
            self.obstacle_min_width as f64,
            self.obstacle_max_width as f64,
        )?;
        range(
            "obstacle height",
            self.obstacle_min_height as f64,
            self.obstacle_max_height as f64,
        )?;
        range(
            "spawn delay",
            self.spawn_min_delay_ms,
            self.spawn_max_delay_ms,
        )?;

        if self.obstacle_max_height + PLAYER_SIZE > GROUND_TOP {
            return Err(TuningError::ObstacleTooTall {
                height: self.obstacle_max_height,
            });
        }

        let reach = self.clearance_ticks() as f32 * self.base_speed;
        let needed = self.obstacle_max_width + PLAYER_SIZE;
        if reach < needed {
            return Err(TuningError::JumpTooShort { reach, needed });
        }

        Ok(())
    }

    /// Longest run of ticks a jump from the ground keeps the player's feet
    /// above the tallest obstacle, using the simulation's own integrator.
    pub fn clearance_ticks(&self) -> u32 {
        if self.gravity.is_nan() || self.gravity <= 0.0 {
            return 0;
        }

        let clear_y = GROUND_TOP - self.obstacle_max_height - PLAYER_SIZE;
        let mut y = GROUND_LINE;
        let mut vy = -self.jump_force;
        let mut run = 0;
        let mut best = 0;

        for _ in 0..MAX_JUMP_TICKS {
            vy += self.gravity;
            y += vy;
            if y > GROUND_LINE {
                break;
            }
            if y <= clear_y {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }

        best
    }
}
