//! Fixed timestep simulation tick
//!
//! One call advances the runner by one display frame.

use super::state::{RunnerPhase, RunnerState};

/// How many ticks ahead the autopilot looks for the next obstacle
const AUTOPILOT_LOOKAHEAD_TICKS: f32 = 8.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump requested (jump key or click since the last tick)
    pub jump: bool,
    /// Idle/demo mode - the simulation jumps by itself
    pub autopilot: bool,
}

/// Things that happened during a tick, for the HUD and logs
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    Jumped,
    /// An obstacle scrolled off the left edge; `score` is the new total
    ObstacleCleared { id: u32, score: u64 },
    SpeedUp { speed: f32 },
    GameOver { score: u64 },
}

/// Advance the runner by one tick. Does nothing once the run is over.
pub fn tick(state: &mut RunnerState, input: &TickInput) -> Vec<RunnerEvent> {
    let mut events = Vec::new();
    if !state.is_active() {
        return events;
    }

    state.time_ticks += 1;

    let wants_jump = input.jump || (input.autopilot && autopilot_wants_jump(state));
    if wants_jump && state.jump() {
        events.push(RunnerEvent::Jumped);
    }

    state.player.integrate(state.tuning.gravity);

    let speed = state.speed;
    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= speed;
    }

    // Collisions are decided on the moved positions before anything is
    // removed, so a hit and a clear in the same tick cannot hide each other.
    let player_box = state.player.bounds();
    let hit = state
        .obstacles
        .iter()
        .find(|o| o.bounds().overlaps(&player_box))
        .map(|o| o.id);

    if let Some(id) = hit {
        state.phase = RunnerPhase::GameOver;
        log::info!(
            "Runner hit obstacle {} after {} ticks, score {}",
            id,
            state.time_ticks,
            state.score
        );
        events.push(RunnerEvent::GameOver { score: state.score });
        return events;
    }

    let (cleared, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.obstacles)
        .into_iter()
        .partition(|o| o.is_past_left_edge());
    state.obstacles = kept;

    let tuning = state.tuning;
    for obstacle in cleared {
        let old = state.score;
        state.score = state.score.saturating_add(tuning.score_step);
        events.push(RunnerEvent::ObstacleCleared {
            id: obstacle.id,
            score: state.score,
        });

        let ups = tuning
            .speed_up_policy
            .speed_ups(old, state.score, tuning.speed_up_every);
        if ups > 0 {
            state.speed += tuning.speed_step * ups as f32;
            log::debug!("Score {} - speed now {}", state.score, state.speed);
            events.push(RunnerEvent::SpeedUp { speed: state.speed });
        }
    }

    events
}

/// Autopilot: jump when the nearest obstacle ahead is about to arrive
pub fn autopilot_wants_jump(state: &RunnerState) -> bool {
    if !state.player.grounded {
        return false;
    }

    let player = state.player.bounds();
    let window = state.speed * AUTOPILOT_LOOKAHEAD_TICKS;
    state
        .obstacles
        .iter()
        .map(|o| o.pos.x - player.max.x)
        .any(|gap| (0.0..=window).contains(&gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::ObstacleKind;
    use crate::tuning::{RunnerTuning, SpeedUpPolicy};
    use glam::Vec2;
    use proptest::prelude::*;

    fn new_state() -> RunnerState {
        RunnerState::new(12345, RunnerTuning::default())
    }

    /// An obstacle that leaves the field on the next tick
    fn place_leaving(state: &mut RunnerState) -> u32 {
        state.place_obstacle(ObstacleKind::Rock, -45.0, Vec2::new(40.0, 30.0))
    }

    #[test]
    fn test_standing_player_stays_grounded() {
        let mut state = new_state();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
            assert!(state.player.grounded);
            assert_eq!(state.player.pos.y, GROUND_LINE);
            assert_eq!(state.player.vel_y, 0.0);
        }
    }

    #[test]
    fn test_jump_arc_lands() {
        let mut state = new_state();
        let events = tick(
            &mut state,
            &TickInput {
                jump: true,
                ..Default::default()
            },
        );
        assert_eq!(events, vec![RunnerEvent::Jumped]);
        assert!(!state.player.grounded);
        assert!((state.player.pos.y - (GROUND_LINE - 12.4)).abs() < 1e-4);

        // A second press mid-air is ignored
        let events = tick(
            &mut state,
            &TickInput {
                jump: true,
                ..Default::default()
            },
        );
        assert!(events.is_empty());

        let mut peak = GROUND_LINE;
        for _ in 0..100 {
            tick(&mut state, &TickInput::default());
            peak = peak.min(state.player.pos.y);
        }
        assert!(state.player.grounded);
        assert_eq!(state.player.pos.y, GROUND_LINE);
        assert!(GROUND_LINE - peak > 100.0);
    }

    #[test]
    fn test_never_jumping_ends_run() {
        let mut state = new_state();
        state.spawn_obstacle();

        let mut over_at = None;
        for _ in 0..200 {
            let events = tick(&mut state, &TickInput::default());
            if events.contains(&RunnerEvent::GameOver { score: 0 }) {
                over_at = Some(state.time_ticks);
                break;
            }
        }

        // 760 - 6t drops below the player's right edge (90) at t = 112
        assert_eq!(over_at, Some(112));
        assert_eq!(state.phase, RunnerPhase::GameOver);

        let frozen_x = state.obstacles[0].pos.x;
        let events = tick(
            &mut state,
            &TickInput {
                jump: true,
                ..Default::default()
            },
        );
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, 112);
        assert_eq!(state.obstacles[0].pos.x, frozen_x);
        assert_eq!(state.player.vel_y, 0.0);
    }

    #[test]
    fn test_clear_scores_and_removes() {
        let mut state = new_state();
        let id = place_leaving(&mut state);
        let events = tick(&mut state, &TickInput::default());
        assert_eq!(events, vec![RunnerEvent::ObstacleCleared { id, score: 10 }]);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_obstacle_on_left_edge_is_kept() {
        let mut state = new_state();
        // Right edge ends exactly at 0 after moving: not yet past it
        state.place_obstacle(ObstacleKind::Fire, -34.0, Vec2::new(40.0, 30.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.score, 0);

        tick(&mut state, &TickInput::default());
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_speed_up_at_exactly_one_hundred() {
        let mut state = new_state();
        for i in 1..=9 {
            place_leaving(&mut state);
            let events = tick(&mut state, &TickInput::default());
            assert_eq!(state.score, i * 10);
            assert_eq!(state.speed, 6.0);
            assert!(!events.iter().any(|e| matches!(e, RunnerEvent::SpeedUp { .. })));
        }

        place_leaving(&mut state);
        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 100);
        assert_eq!(state.speed, 6.5);
        assert!(events.contains(&RunnerEvent::SpeedUp { speed: 6.5 }));

        place_leaving(&mut state);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 110);
        assert_eq!(state.speed, 6.5);
    }

    #[test]
    fn test_speed_up_policy_with_uneven_step() {
        let tuning = RunnerTuning {
            score_step: 30,
            ..Default::default()
        };

        let mut crossing = RunnerState::new(1, tuning);
        let mut exact = RunnerState::new(
            1,
            RunnerTuning {
                speed_up_policy: SpeedUpPolicy::OnExactMultiple,
                ..tuning
            },
        );
        for state in [&mut crossing, &mut exact] {
            for _ in 0..4 {
                place_leaving(state);
                tick(state, &TickInput::default());
            }
            assert_eq!(state.score, 120);
        }
        assert_eq!(crossing.speed, 6.5);
        assert_eq!(exact.speed, 6.0);
    }

    #[test]
    fn test_huge_score_step_saturates() {
        let mut state = RunnerState::new(
            1,
            RunnerTuning {
                score_step: u64::MAX,
                ..Default::default()
            },
        );
        for _ in 0..2 {
            place_leaving(&mut state);
            tick(&mut state, &TickInput::default());
        }
        assert!(state.is_active());
        assert_eq!(state.score, u64::MAX);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_collision_beats_clear_in_same_tick() {
        let mut state = new_state();
        place_leaving(&mut state);
        // Overlaps the standing player right away
        state.place_obstacle(ObstacleKind::Rock, 70.0, Vec2::new(30.0, 30.0));

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(events, vec![RunnerEvent::GameOver { score: 0 }]);
        assert_eq!(state.score, 0);
        assert_eq!(state.obstacles.len(), 2);
    }

    #[test]
    fn test_autopilot_window() {
        let mut state = new_state();
        state.place_obstacle(ObstacleKind::Rock, 200.0, Vec2::new(40.0, 60.0));
        assert!(!autopilot_wants_jump(&state));

        let mut near = new_state();
        near.place_obstacle(ObstacleKind::Rock, 130.0, Vec2::new(40.0, 60.0));
        assert!(autopilot_wants_jump(&near));
    }

    #[test]
    fn test_autopilot_clears_tallest_obstacle() {
        let mut state = new_state();
        state.place_obstacle(ObstacleKind::Fire, 150.0, Vec2::new(50.0, 60.0));
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..100 {
            tick(&mut state, &input);
        }
        assert!(state.is_active());
        assert_eq!(state.score, 10);
        assert!(state.player.grounded);
    }

    proptest! {
        #[test]
        fn player_never_below_ground(jumps in proptest::collection::vec(any::<bool>(), 1..400)) {
            let mut state = new_state();
            for jump in jumps {
                tick(&mut state, &TickInput { jump, ..Default::default() });
                prop_assert!(state.player.pos.y <= GROUND_LINE);
                prop_assert_eq!(state.player.grounded, state.player.pos.y == GROUND_LINE);
            }
        }

        #[test]
        fn score_and_speed_monotonic(
            seed in any::<u64>(),
            jumps in proptest::collection::vec(any::<bool>(), 1..600),
        ) {
            let mut state = RunnerState::new(seed, RunnerTuning::default());
            for (i, jump) in jumps.into_iter().enumerate() {
                if i % 45 == 0 {
                    state.spawn_obstacle();
                }
                let was_active = state.is_active();
                let (score, speed, count) = (state.score, state.speed, state.obstacles.len());

                let events = tick(&mut state, &TickInput { jump, ..Default::default() });

                prop_assert!(state.score >= score);
                prop_assert!(state.speed >= speed);
                if !was_active {
                    prop_assert!(events.is_empty());
                    prop_assert_eq!(state.score, score);
                    prop_assert_eq!(state.speed, speed);
                }
                if state.is_active() {
                    // Removal and +10 always go together
                    let removed = (count - state.obstacles.len()) as u64;
                    prop_assert_eq!(state.score - score, removed * 10);
                    prop_assert!(state.obstacles.iter().all(|o| !o.is_past_left_edge()));
                }
            }
        }
    }
}
