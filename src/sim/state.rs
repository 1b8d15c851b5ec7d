//! Runner state and core simulation types
//!
//! The state owns the player and every obstacle; nothing outside the
//! simulation mutates them except through `reset`, `jump`, `spawn_obstacle`
//! and `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Aabb;
use crate::consts::*;
use crate::tuning::RunnerTuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerPhase {
    /// Physics, spawning and drawing are running
    Active,
    /// The player hit an obstacle; waiting for a click to restart
    GameOver,
}

/// Obstacle types (only the look differs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Rock,
    Fire,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Rock => "rock",
            ObstacleKind::Fire => "fire",
        }
    }
}

/// The soldier carrying the helmet of water
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel_y: f32,
    pub size: Vec2,
    pub grounded: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, GROUND_LINE),
            vel_y: 0.0,
            size: Vec2::splat(PLAYER_SIZE),
            grounded: true,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.size)
    }

    /// Apply gravity, then snap to the ground line if the player reached it
    pub fn integrate(&mut self, gravity: f32) {
        self.vel_y += gravity;
        self.pos.y += self.vel_y;

        if self.pos.y >= GROUND_LINE {
            self.pos.y = GROUND_LINE;
            self.vel_y = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    /// Start a jump if standing. Returns whether the jump happened.
    pub fn jump(&mut self, force: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.vel_y = -force;
        true
    }
}

/// A rock or flame scrolling toward the player
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.size)
    }

    /// Right edge has crossed the left boundary of the field
    pub fn is_past_left_edge(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// Complete runner state
#[derive(Debug, Clone)]
pub struct RunnerState {
    pub tuning: RunnerTuning,
    pub phase: RunnerPhase,
    pub score: u64,
    /// Current scroll speed (units/tick)
    pub speed: f32,
    pub player: Player,
    /// Active obstacles, in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Ticks since the last reset
    pub time_ticks: u64,
    rng: Pcg32,
    next_id: u32,
}

impl RunnerState {
    /// Create an active run. `tuning` is expected to have passed `validate`.
    pub fn new(seed: u64, tuning: RunnerTuning) -> Self {
        Self {
            tuning,
            phase: RunnerPhase::Active,
            score: 0,
            speed: tuning.base_speed,
            player: Player::default(),
            obstacles: Vec::new(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Start a fresh run. The RNG keeps its stream so each run differs.
    pub fn reset(&mut self) {
        self.phase = RunnerPhase::Active;
        self.score = 0;
        self.speed = self.tuning.base_speed;
        self.player = Player::default();
        self.obstacles.clear();
        self.time_ticks = 0;
    }

    pub fn is_active(&self) -> bool {
        self.phase == RunnerPhase::Active
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Jump if the run is active and the player is standing
    pub fn jump(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.player.jump(self.tuning.jump_force)
    }

    /// Put an obstacle of the given size on the ground at `x`
    pub fn place_obstacle(&mut self, kind: ObstacleKind, x: f32, size: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            kind,
            pos: Vec2::new(x, GROUND_TOP - size.y),
            size,
        });
        id
    }

    /// Spawn a random obstacle at the right edge.
    ///
    /// Returns the delay (ms) until the next spawn, or `None` once the run
    /// is over so the spawn chain ends.
    pub fn spawn_obstacle(&mut self) -> Option<f64> {
        if !self.is_active() {
            return None;
        }

        let t = self.tuning;
        let kind = if self.rng.random_bool(0.5) {
            ObstacleKind::Rock
        } else {
            ObstacleKind::Fire
        };
        let size = Vec2::new(
            self.rng.random_range(t.obstacle_min_width..t.obstacle_max_width),
            self.rng.random_range(t.obstacle_min_height..t.obstacle_max_height),
        );
        let id = self.place_obstacle(kind, FIELD_WIDTH, size);
        log::debug!("Spawned {} {} ({:.0}x{:.0})", kind.as_str(), id, size.x, size.y);

        Some(self.rng.random_range(t.spawn_min_delay_ms..t.spawn_max_delay_ms))
    }
}
