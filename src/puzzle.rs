//! Stanza ordering puzzle
//!
//! Each level is one stanza of the ballad with its lines shuffled. The player
//! drags lines into place and asks for a check; a correct stanza moves on to
//! the next one after a short feedback pause.

use rand::Rng;
use rand::seq::SliceRandom;

/// The ballad's opening stanzas, one level each
pub const BALLAD: [[&str; 4]; 2] = [
    [
        "Sub cerul persan, Alexandru cel Mare",
        "umbla prin pustiu, pe sub streşini de stânci.",
        "Când iată: soldaţi aduceau de-a călare",
        "burdufuri cu apă din văile-adânci.",
    ],
    [
        "Atunci, obosit şi setos, Alexandru",
        "întoarse privirea în jur prin deşert.",
        "Un soare imens, fioros policandru,",
        "rănea alburiul zenitului fiert,",
    ],
];

/// Result of checking the current order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    /// Correct, another stanza follows
    Advance,
    /// Correct, and it was the last stanza
    Complete,
    /// Order is wrong
    Retry,
}

#[derive(Debug, Clone)]
pub struct PuzzleGame {
    stanzas: Vec<Vec<String>>,
    level: usize,
    /// Lines of the current stanza in the player's order
    lines: Vec<String>,
    advance_pending: bool,
    completed: bool,
}

impl PuzzleGame {
    pub fn new<R: Rng>(stanzas: Vec<Vec<String>>, rng: &mut R) -> Self {
        let mut game = Self {
            stanzas,
            level: 0,
            lines: Vec::new(),
            advance_pending: false,
            completed: false,
        };
        game.deal(rng);
        game
    }

    /// Puzzle over the built-in ballad
    pub fn ballad<R: Rng>(rng: &mut R) -> Self {
        let stanzas = BALLAD
            .iter()
            .map(|stanza| stanza.iter().map(|line| line.to_string()).collect())
            .collect();
        Self::new(stanzas, rng)
    }

    /// Shuffle the current stanza into `lines`
    fn deal<R: Rng>(&mut self, rng: &mut R) {
        self.lines = self.target().to_vec();
        self.lines.shuffle(rng);
    }

    /// Zero-based level index
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_count(&self) -> usize {
        self.stanzas.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Correct order of the current stanza
    pub fn target(&self) -> &[String] {
        self.stanzas
            .get(self.level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_advance_pending(&self) -> bool {
        self.advance_pending
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Drop the line at `from` onto position `to`.
    ///
    /// Dragging down lands after the target line, dragging up lands before
    /// it. Invalid indices and drops onto the same line are ignored.
    pub fn move_line(&mut self, from: usize, to: usize) -> bool {
        if self.advance_pending || from == to {
            return false;
        }
        if from >= self.lines.len() || to >= self.lines.len() {
            log::debug!("Ignoring drop {} -> {}", from, to);
            return false;
        }
        let line = self.lines.remove(from);
        self.lines.insert(to, line);
        true
    }

    /// Compare the player's order with the stanza.
    ///
    /// Returns `None` while an advance is already pending.
    pub fn check(&mut self) -> Option<PuzzleOutcome> {
        if self.advance_pending {
            return None;
        }
        if self.lines.as_slice() != self.target() {
            return Some(PuzzleOutcome::Retry);
        }
        if self.level + 1 < self.stanzas.len() {
            self.advance_pending = true;
            Some(PuzzleOutcome::Advance)
        } else {
            self.completed = true;
            Some(PuzzleOutcome::Complete)
        }
    }

    /// Move to the next stanza after a successful check
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> bool {
        if !self.advance_pending {
            return false;
        }
        self.advance_pending = false;
        self.level += 1;
        self.deal(rng);
        log::info!("Puzzle level {} of {}", self.level + 1, self.stanzas.len());
        true
    }
}
