//! Game sessions and the launch surface
//!
//! `Arcade` is everything the host page talks to. Opening a game creates a
//! `Session` that owns that game's whole state; closing the modal drops the
//! session and cancels its timers, so nothing carries over to the next
//! launch. Time always comes from the caller (milliseconds).

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::memory::{FlipOutcome, MemoryGame};
use crate::puzzle::{PuzzleGame, PuzzleOutcome};
use crate::scheduler::{Scheduler, SessionId, TimerKind};
use crate::sim::{RunnerEvent, RunnerState, TickInput, tick};
use crate::tuning::RunnerTuning;

/// The three mini-games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Runner,
    Puzzle,
    Memory,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Runner => "runner",
            GameKind::Puzzle => "puzzle",
            GameKind::Memory => "memory",
        }
    }

    /// Parse a launch button's game name (exact match only)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "runner" => Some(GameKind::Runner),
            "puzzle" => Some(GameKind::Puzzle),
            "memory" => Some(GameKind::Memory),
            _ => None,
        }
    }
}

/// Notifications for the host page, drained after every call
#[derive(Debug, Clone, PartialEq)]
pub enum ArcadeEvent {
    /// Runner score readout changed
    ScoreChanged { score: u64 },
    /// Runner hit an obstacle
    RunnerOver { score: u64 },
    /// Runner restarted after a game over
    RunnerRestarted,
    PuzzleChecked { outcome: PuzzleOutcome },
    /// Lines were reordered
    PuzzleLinesChanged,
    /// A new stanza was dealt (zero-based level)
    PuzzleLevelChanged { level: usize },
    CardRevealed { index: usize },
    CardsMatched { cards: [usize; 2], pairs: usize },
    CardsHidden { indices: Vec<usize> },
    MemoryCompleted,
}

/// Runner plus its frame pacing
#[derive(Debug, Clone)]
struct RunnerSession {
    state: RunnerState,
    input: TickInput,
    accumulator: f64,
    last_frame_ms: Option<f64>,
}

impl RunnerSession {
    fn new(state: RunnerState) -> Self {
        Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
            last_frame_ms: None,
        }
    }
}

/// State of the game owned by a session
#[derive(Debug, Clone)]
enum Game {
    Runner(RunnerSession),
    Puzzle(PuzzleGame),
    Memory(MemoryGame),
}

impl Game {
    fn kind(&self) -> GameKind {
        match self {
            Game::Runner(_) => GameKind::Runner,
            Game::Puzzle(_) => GameKind::Puzzle,
            Game::Memory(_) => GameKind::Memory,
        }
    }
}

/// One opened game, from launch to dismissal
#[derive(Debug, Clone)]
struct Session {
    id: SessionId,
    game: Game,
    /// Shuffles for puzzle levels dealt after launch
    rng: Pcg32,
}

/// Launch surface, input routing and frame driver
#[derive(Debug)]
pub struct Arcade {
    tuning: RunnerTuning,
    scheduler: Scheduler,
    session: Option<Session>,
    next_session_id: u64,
    autopilot: bool,
    events: Vec<ArcadeEvent>,
}

impl Arcade {
    /// Create the arcade. Invalid tuning falls back to the defaults.
    pub fn new(tuning: RunnerTuning) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Invalid runner tuning ({}), using defaults", e);
                RunnerTuning::default()
            }
        };

        Self {
            tuning,
            scheduler: Scheduler::new(),
            session: None,
            next_session_id: 1,
            autopilot: false,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &RunnerTuning {
        &self.tuning
    }

    /// Open a game by name, replacing any open session.
    ///
    /// Unknown names are ignored and leave the current session alone.
    pub fn open_game(&mut self, name: &str, seed: u64, now_ms: f64) -> Option<SessionId> {
        let Some(kind) = GameKind::from_name(name) else {
            log::debug!("Ignoring unknown game type {:?}", name);
            return None;
        };

        self.close_game();

        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;

        let mut rng = Pcg32::seed_from_u64(seed);
        let game = match kind {
            GameKind::Runner => {
                let state = RunnerState::new(seed, self.tuning);
                Game::Runner(RunnerSession::new(state))
            }
            GameKind::Puzzle => Game::Puzzle(PuzzleGame::ballad(&mut rng)),
            GameKind::Memory => Game::Memory(MemoryGame::poem(&mut rng)),
        };
        self.session = Some(Session { id, game, rng });
        log::info!("Opened {} session {}", kind.as_str(), id);

        if kind == GameKind::Runner {
            self.start_run(now_ms);
        }

        Some(id)
    }

    /// End the current session and cancel all of its timers
    pub fn close_game(&mut self) {
        if let Some(session) = self.session.take() {
            self.scheduler.cancel_session(session.id);
            log::info!("Closed {} session {}", session.game.kind().as_str(), session.id);
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn kind(&self) -> Option<GameKind> {
        self.session.as_ref().map(|s| s.game.kind())
    }

    pub fn runner(&self) -> Option<&RunnerState> {
        match self.session.as_ref().map(|s| &s.game) {
            Some(Game::Runner(runner)) => Some(&runner.state),
            _ => None,
        }
    }

    pub fn puzzle(&self) -> Option<&PuzzleGame> {
        match self.session.as_ref().map(|s| &s.game) {
            Some(Game::Puzzle(puzzle)) => Some(puzzle),
            _ => None,
        }
    }

    pub fn memory(&self) -> Option<&MemoryGame> {
        match self.session.as_ref().map(|s| &s.game) {
            Some(Game::Memory(memory)) => Some(memory),
            _ => None,
        }
    }

    fn runner_mut(&mut self) -> Option<&mut RunnerSession> {
        match self.session.as_mut().map(|s| &mut s.game) {
            Some(Game::Runner(runner)) => Some(runner),
            _ => None,
        }
    }

    /// Reset the runner and restart its spawn chain
    fn start_run(&mut self, now_ms: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Game::Runner(runner) = &mut session.game else {
            return;
        };

        runner.state.reset();
        runner.input = TickInput::default();
        runner.accumulator = 0.0;
        runner.last_frame_ms = None;

        // First obstacle right away, the rest on the timer
        if let Some(delay) = runner.state.spawn_obstacle() {
            self.scheduler
                .schedule(session.id, TimerKind::SpawnObstacle, now_ms, delay);
        }
        self.events.push(ArcadeEvent::ScoreChanged { score: 0 });
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Toggle idle/demo mode for the runner
    pub fn toggle_autopilot(&mut self) -> bool {
        self.autopilot = !self.autopilot;
        log::info!("Autopilot: {}", self.autopilot);
        self.autopilot
    }

    /// Jump key pressed. Only an active run listens.
    pub fn key_jump(&mut self) {
        if let Some(runner) = self.runner_mut() {
            if runner.state.is_active() {
                runner.input.jump = true;
            }
        }
    }

    /// Click on the runner stage: jump while running, restart after a crash.
    ///
    /// Returns true when the click restarted the run (the host must resume
    /// its frame loop).
    pub fn pointer_click(&mut self, now_ms: f64) -> bool {
        let Some(runner) = self.runner_mut() else {
            return false;
        };

        if runner.state.is_active() {
            runner.input.jump = true;
            return false;
        }

        self.start_run(now_ms);
        self.events.push(ArcadeEvent::RunnerRestarted);
        log::info!("Runner restarted");
        true
    }

    /// Whether the host should keep requesting animation frames
    pub fn wants_frames(&self) -> bool {
        self.runner().is_some_and(RunnerState::is_active)
    }

    /// Reorder a puzzle line
    pub fn move_line(&mut self, from: usize, to: usize) -> bool {
        let Some(Game::Puzzle(puzzle)) = self.session.as_mut().map(|s| &mut s.game) else {
            return false;
        };
        let moved = puzzle.move_line(from, to);
        if moved {
            self.events.push(ArcadeEvent::PuzzleLinesChanged);
        }
        moved
    }

    /// Check the puzzle order. A correct stanza advances after a pause.
    pub fn check_puzzle(&mut self, now_ms: f64) -> Option<PuzzleOutcome> {
        let session = self.session.as_mut()?;
        let Game::Puzzle(puzzle) = &mut session.game else {
            return None;
        };

        let outcome = puzzle.check()?;
        match outcome {
            PuzzleOutcome::Advance => self.scheduler.schedule(
                session.id,
                TimerKind::PuzzleAdvance,
                now_ms,
                PUZZLE_ADVANCE_DELAY_MS,
            ),
            PuzzleOutcome::Complete => log::info!("Puzzle completed"),
            PuzzleOutcome::Retry => {}
        }
        self.events.push(ArcadeEvent::PuzzleChecked { outcome });
        Some(outcome)
    }

    /// Flip a memory card
    pub fn flip_card(&mut self, index: usize, now_ms: f64) -> FlipOutcome {
        let Some(session) = self.session.as_mut() else {
            return FlipOutcome::Ignored;
        };
        let Game::Memory(memory) = &mut session.game else {
            return FlipOutcome::Ignored;
        };

        let outcome = memory.flip(index);
        match outcome {
            FlipOutcome::Ignored => {}
            FlipOutcome::Revealed => {
                self.events.push(ArcadeEvent::CardRevealed { index });
            }
            FlipOutcome::Mismatched => {
                self.events.push(ArcadeEvent::CardRevealed { index });
                self.scheduler.schedule(
                    session.id,
                    TimerKind::MemoryHide,
                    now_ms,
                    MEMORY_HIDE_DELAY_MS,
                );
            }
            FlipOutcome::Matched { cards, pairs } => {
                self.events.push(ArcadeEvent::CardRevealed { index });
                self.events.push(ArcadeEvent::CardsMatched { cards, pairs });
                if memory.is_complete() {
                    self.scheduler.schedule(
                        session.id,
                        TimerKind::MemoryComplete,
                        now_ms,
                        MEMORY_COMPLETE_DELAY_MS,
                    );
                }
            }
        }
        outcome
    }

    /// Earliest pending timer, for the host's timer pump
    pub fn next_timer_due(&self) -> Option<f64> {
        self.scheduler.next_due()
    }

    /// Run every timer due at `now_ms`
    pub fn fire_timers(&mut self, now_ms: f64) {
        for (owner, kind) in self.scheduler.take_due(now_ms) {
            let Some(session) = self.session.as_mut().filter(|s| s.id == owner) else {
                log::warn!("Dropping {:?} timer of ended session {}", kind, owner);
                continue;
            };

            match (kind, &mut session.game) {
                (TimerKind::SpawnObstacle, Game::Runner(runner)) => {
                    if let Some(delay) = runner.state.spawn_obstacle() {
                        self.scheduler.schedule(owner, kind, now_ms, delay);
                    }
                }
                (TimerKind::PuzzleAdvance, Game::Puzzle(puzzle)) => {
                    if puzzle.advance(&mut session.rng) {
                        self.events.push(ArcadeEvent::PuzzleLevelChanged {
                            level: puzzle.level(),
                        });
                    }
                }
                (TimerKind::MemoryHide, Game::Memory(memory)) => {
                    let indices = memory.hide_pending();
                    if !indices.is_empty() {
                        self.events.push(ArcadeEvent::CardsHidden { indices });
                    }
                }
                (TimerKind::MemoryComplete, Game::Memory(memory)) => {
                    if memory.is_complete() {
                        log::info!("Memory completed");
                        self.events.push(ArcadeEvent::MemoryCompleted);
                    }
                }
                (kind, game) => {
                    log::warn!("{:?} timer fired for a {} game", kind, game.kind().as_str());
                }
            }
        }
    }

    /// Advance to `now_ms`: run due timers, then as many fixed runner ticks
    /// as the elapsed time allows
    pub fn frame(&mut self, now_ms: f64) {
        self.fire_timers(now_ms);

        let autopilot = self.autopilot;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let id = session.id;
        let Game::Runner(runner) = &mut session.game else {
            return;
        };

        let dt = match runner.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => TICK_MS,
        };
        runner.last_frame_ms = Some(now_ms);
        if !runner.state.is_active() {
            return;
        }

        runner.accumulator += dt;
        let mut substeps = 0;
        while runner.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
            runner.input.autopilot = autopilot;
            let events = tick(&mut runner.state, &runner.input);
            runner.accumulator -= TICK_MS;
            substeps += 1;

            // Clear one-shot inputs after processing
            runner.input.jump = false;

            for event in events {
                match event {
                    RunnerEvent::ObstacleCleared { score, .. } => {
                        self.events.push(ArcadeEvent::ScoreChanged { score });
                    }
                    RunnerEvent::GameOver { score } => {
                        self.scheduler.cancel(id, TimerKind::SpawnObstacle);
                        self.events.push(ArcadeEvent::RunnerOver { score });
                    }
                    RunnerEvent::Jumped | RunnerEvent::SpeedUp { .. } => {}
                }
            }

            if !runner.state.is_active() {
                runner.accumulator = 0.0;
                break;
            }
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<ArcadeEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::CardFace;
    use crate::sim::RunnerPhase;

    fn arcade() -> Arcade {
        Arcade::new(RunnerTuning::default())
    }

    /// Feed frames exactly one tick apart until `stop` or `max` frames
    fn run_frames(
        arcade: &mut Arcade,
        start_ms: f64,
        max: u32,
        stop: impl Fn(&Arcade) -> bool,
    ) -> f64 {
        let mut now = start_ms;
        for _ in 0..max {
            arcade.frame(now);
            if stop(arcade) {
                break;
            }
            now += TICK_MS;
        }
        now
    }

    #[test]
    fn test_game_kind_names() {
        for kind in [GameKind::Runner, GameKind::Puzzle, GameKind::Memory] {
            assert_eq!(GameKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(GameKind::from_name("Runner"), None);
        assert_eq!(GameKind::from_name(""), None);
    }

    #[test]
    fn test_unknown_game_is_noop() {
        let mut arcade = arcade();
        let id = arcade.open_game("memory", 1, 0.0).unwrap();
        assert_eq!(arcade.open_game("chess", 2, 0.0), None);
        assert_eq!(arcade.session_id(), Some(id));
        assert_eq!(arcade.kind(), Some(GameKind::Memory));
    }

    #[test]
    fn test_runner_opens_active_with_first_obstacle() {
        let mut arcade = arcade();
        let id = arcade.open_game("runner", 7, 0.0).unwrap();
        let runner = arcade.runner().unwrap();
        assert!(runner.is_active());
        assert_eq!(runner.obstacles.len(), 1);
        assert!(arcade.scheduler.is_scheduled(id, TimerKind::SpawnObstacle));
        assert!(arcade.wants_frames());
        assert_eq!(arcade.drain_events(), vec![ArcadeEvent::ScoreChanged { score: 0 }]);
    }

    #[test]
    fn test_runner_crash_halts_spawning_and_click_restarts() {
        let mut arcade = arcade();
        let id = arcade.open_game("runner", 7, 0.0).unwrap();

        let now = run_frames(&mut arcade, 0.0, 2000, |a| !a.wants_frames());
        let runner = arcade.runner().unwrap();
        assert_eq!(runner.phase, RunnerPhase::GameOver);
        assert_eq!(runner.time_ticks, 112);
        assert!(!arcade.scheduler.is_scheduled(id, TimerKind::SpawnObstacle));
        assert!(
            arcade
                .drain_events()
                .contains(&ArcadeEvent::RunnerOver { score: 0 })
        );

        // Frames and timers after the crash change nothing
        let obstacles = arcade.runner().unwrap().obstacles.len();
        arcade.frame(now + 10_000.0);
        assert_eq!(arcade.runner().unwrap().obstacles.len(), obstacles);
        assert_eq!(arcade.runner().unwrap().time_ticks, 112);

        // Jump key is ignored while over; a click restarts
        arcade.key_jump();
        assert!(arcade.pointer_click(now + 20_000.0));
        let runner = arcade.runner().unwrap();
        assert!(runner.is_active());
        assert_eq!(runner.score, 0);
        assert_eq!(runner.speed, 6.0);
        assert_eq!(runner.obstacles.len(), 1);
        assert_eq!(runner.time_ticks, 0);
        assert!(arcade.scheduler.is_scheduled(id, TimerKind::SpawnObstacle));
        assert_eq!(arcade.scheduler.pending(id), 1);
        assert!(arcade.drain_events().contains(&ArcadeEvent::RunnerRestarted));
    }

    #[test]
    fn test_click_jumps_while_running() {
        let mut arcade = arcade();
        arcade.open_game("runner", 7, 0.0).unwrap();
        assert!(!arcade.pointer_click(0.0));
        arcade.frame(0.0);
        let runner = arcade.runner().unwrap();
        assert!(!runner.player.grounded);
        assert!(runner.player.vel_y < 0.0);
    }

    #[test]
    fn test_spawn_timer_keeps_spawning() {
        let mut arcade = arcade();
        arcade.open_game("runner", 3, 0.0).unwrap();
        arcade.toggle_autopilot();
        assert!(arcade.autopilot());

        // Timers only, no ticks: 10 seconds holds at least 3 more spawns
        arcade.fire_timers(10_000.0);
        arcade.fire_timers(20_000.0);
        arcade.fire_timers(30_000.0);
        assert_eq!(arcade.runner().unwrap().obstacles.len(), 4);
    }

    #[test]
    fn test_close_cancels_timers() {
        let mut arcade = arcade();
        let first = arcade.open_game("runner", 1, 0.0).unwrap();
        arcade.close_game();
        assert_eq!(arcade.session_id(), None);
        assert_eq!(arcade.next_timer_due(), None);
        assert_eq!(arcade.scheduler.pending(first), 0);
        assert!(!arcade.wants_frames());

        // Reopening gets a new session with fresh state
        let second = arcade.open_game("runner", 1, 5000.0).unwrap();
        assert_ne!(first, second);
        assert_eq!(arcade.runner().unwrap().obstacles.len(), 1);
    }

    #[test]
    fn test_switching_games_cancels_previous_timers() {
        let mut arcade = arcade();
        let runner = arcade.open_game("runner", 1, 0.0).unwrap();
        let memory = arcade.open_game("memory", 1, 0.0).unwrap();
        assert_eq!(arcade.scheduler.pending(runner), 0);
        assert_eq!(arcade.scheduler.pending(memory), 0);
        assert!(arcade.runner().is_none());
    }

    #[test]
    fn test_puzzle_flow() {
        let mut arcade = arcade();
        let id = arcade.open_game("puzzle", 11, 0.0).unwrap();

        // Solve by reordering to the target
        let target = arcade.puzzle().unwrap().target().to_vec();
        for (i, line) in target.iter().enumerate() {
            let from = arcade
                .puzzle()
                .unwrap()
                .lines()
                .iter()
                .position(|l| l == line)
                .unwrap();
            if from != i {
                assert!(arcade.move_line(from, i));
            }
        }

        assert_eq!(arcade.check_puzzle(100.0), Some(PuzzleOutcome::Advance));
        assert!(arcade.scheduler.is_scheduled(id, TimerKind::PuzzleAdvance));

        arcade.fire_timers(1099.0);
        assert_eq!(arcade.puzzle().unwrap().level(), 0);
        arcade.fire_timers(1100.0);
        assert_eq!(arcade.puzzle().unwrap().level(), 1);
        assert!(
            arcade
                .drain_events()
                .contains(&ArcadeEvent::PuzzleLevelChanged { level: 1 })
        );
    }

    #[test]
    fn test_puzzle_progress_does_not_survive_close() {
        let mut arcade = arcade();
        arcade.open_game("puzzle", 11, 0.0).unwrap();
        let target = arcade.puzzle().unwrap().target().to_vec();
        for (i, line) in target.iter().enumerate() {
            let from = arcade.puzzle().unwrap().lines().iter().position(|l| l == line).unwrap();
            arcade.move_line(from, i);
        }
        arcade.check_puzzle(0.0);
        arcade.close_game();

        // The pending advance died with the session
        arcade.fire_timers(5000.0);
        arcade.open_game("puzzle", 12, 6000.0).unwrap();
        assert_eq!(arcade.puzzle().unwrap().level(), 0);
    }

    #[test]
    fn test_memory_mismatch_hides_after_delay() {
        let mut arcade = arcade();
        arcade.open_game("memory", 5, 0.0).unwrap();
        let cards = arcade.memory().unwrap().cards().to_vec();
        let other = cards
            .iter()
            .position(|c| c.symbol != cards[0].symbol)
            .unwrap();

        assert_eq!(arcade.flip_card(0, 0.0), FlipOutcome::Revealed);
        assert_eq!(arcade.flip_card(other, 0.0), FlipOutcome::Mismatched);
        let third = (1..16).find(|&i| i != other).unwrap();
        assert_eq!(arcade.flip_card(third, 10.0), FlipOutcome::Ignored);

        arcade.fire_timers(999.0);
        assert_eq!(arcade.memory().unwrap().pending().len(), 2);
        arcade.fire_timers(1000.0);
        let memory = arcade.memory().unwrap();
        assert!(memory.pending().is_empty());
        assert_eq!(memory.cards()[0].face, CardFace::Hidden);
        assert!(
            arcade
                .drain_events()
                .contains(&ArcadeEvent::CardsHidden { indices: vec![0, other] })
        );
    }

    #[test]
    fn test_memory_completion() {
        let mut arcade = arcade();
        arcade.open_game("memory", 5, 0.0).unwrap();
        let cards = arcade.memory().unwrap().cards().to_vec();

        let mut now = 0.0;
        for (i, card) in cards.iter().enumerate() {
            let partner = cards
                .iter()
                .enumerate()
                .position(|(j, c)| j > i && c.symbol == card.symbol);
            if let Some(j) = partner {
                arcade.flip_card(i, now);
                arcade.flip_card(j, now);
                now += 100.0;
            }
        }
        assert_eq!(arcade.memory().unwrap().matched_pairs(), 8);
        assert!(arcade.memory().unwrap().cards().iter().all(|c| c.face == CardFace::Matched));

        arcade.drain_events();
        arcade.fire_timers(now + MEMORY_COMPLETE_DELAY_MS);
        assert_eq!(arcade.drain_events(), vec![ArcadeEvent::MemoryCompleted]);
    }

    #[test]
    fn test_invalid_tuning_falls_back() {
        let arcade = Arcade::new(RunnerTuning {
            jump_force: 1.0,
            ..Default::default()
        });
        assert_eq!(*arcade.tuning(), RunnerTuning::default());
    }

    #[test]
    fn test_inputs_without_matching_game_are_ignored() {
        let mut arcade = arcade();
        arcade.key_jump();
        assert!(!arcade.pointer_click(0.0));
        assert!(!arcade.move_line(0, 1));
        assert_eq!(arcade.check_puzzle(0.0), None);
        assert_eq!(arcade.flip_card(0, 0.0), FlipOutcome::Ignored);

        arcade.open_game("puzzle", 1, 0.0).unwrap();
        assert_eq!(arcade.flip_card(0, 0.0), FlipOutcome::Ignored);
        assert!(!arcade.pointer_click(0.0));
    }
}
