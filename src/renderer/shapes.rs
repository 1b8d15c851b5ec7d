//! Shape generation for 2D primitives
//!
//! Everything here works in field coordinates (pixels, y down); the
//! pipeline maps to NDC when uploading.

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, GROUND_THICKNESS, GROUND_TOP};
use crate::sim::{Obstacle, ObstacleKind, Player, RunnerState};

/// Water band drawn above the player
const WATER_INSET: f32 = 5.0;
const WATER_SIZE: Vec2 = Vec2::new(30.0, 10.0);
/// Flame body starts this far below the obstacle top, the core further down
const FIRE_BODY_DROP: f32 = 10.0;
const FIRE_CORE_INSET: Vec2 = Vec2::new(5.0, 15.0);
const FIRE_CORE_SHRINK: Vec2 = Vec2::new(10.0, 20.0);

/// Generate vertices for a filled axis-aligned rectangle.
///
/// Degenerate sizes produce nothing.
pub fn rect(pos: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec::new();
    }

    let min = pos;
    let max = pos + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled triangle
pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Soldier body with the water band on top
pub fn player(player: &Player) -> Vec<Vertex> {
    let mut vertices = rect(player.pos, player.size, colors::PLAYER);
    vertices.extend(rect(
        player.pos + Vec2::new(WATER_INSET, -WATER_SIZE.y),
        WATER_SIZE,
        colors::WATER,
    ));
    vertices
}

/// Rock: triangle with its apex centered on top.
/// Fire: orange body with a yellow core.
pub fn obstacle(obstacle: &Obstacle) -> Vec<Vertex> {
    let Obstacle { pos, size, .. } = *obstacle;
    match obstacle.kind {
        ObstacleKind::Rock => triangle(
            Vec2::new(pos.x, pos.y + size.y),
            Vec2::new(pos.x + size.x / 2.0, pos.y),
            pos + size,
            colors::ROCK,
        ),
        ObstacleKind::Fire => {
            let mut vertices = rect(
                pos + Vec2::new(0.0, FIRE_BODY_DROP),
                size - Vec2::new(0.0, FIRE_BODY_DROP),
                colors::FIRE,
            );
            vertices.extend(rect(
                pos + FIRE_CORE_INSET,
                size - FIRE_CORE_SHRINK,
                colors::FIRE_CORE,
            ));
            vertices
        }
    }
}

/// Full runner frame: ground, player, obstacles, then the game-over dimming
pub fn runner_scene(state: &RunnerState) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(24 + state.obstacles.len() * 12);

    vertices.extend(rect(
        Vec2::new(0.0, GROUND_TOP),
        Vec2::new(FIELD_WIDTH, GROUND_THICKNESS),
        colors::GROUND,
    ));
    vertices.extend(player(&state.player));
    for o in &state.obstacles {
        vertices.extend(obstacle(o));
    }

    if !state.is_active() {
        vertices.extend(rect(
            Vec2::ZERO,
            Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
            colors::OVERLAY,
        ));
    }

    vertices
}
