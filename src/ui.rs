//! HTML fragments and player-facing text
//!
//! Everything here is a pure function of game state; the web binary only
//! assigns the strings to the DOM.

use std::fmt::Write;

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::memory::{CardFace, MemoryGame};
use crate::puzzle::{PuzzleGame, PuzzleOutcome};

pub const RUNNER_CANVAS_ID: &str = "runner-canvas";
pub const RUNNER_SCORE_ID: &str = "runner-score";
pub const RUNNER_OVER_ID: &str = "runner-over";
pub const PUZZLE_LIST_ID: &str = "sortable-lines";
pub const PUZZLE_CHECK_ID: &str = "puzzle-check";
pub const PUZZLE_FEEDBACK_ID: &str = "puzzle-feedback";
pub const MEMORY_GRID_ID: &str = "memory-grid";
pub const MEMORY_STATS_ID: &str = "memory-stats";

pub const RUNNER_OVER_TITLE: &str = "AI VĂRSAT COMOARA!";
pub const RUNNER_OVER_HINT: &str = "Click pentru a reîncerca";
pub const MEMORY_COMPLETE_TEXT: &str = "Excelent! Ai o memorie demnă de un cuceritor!";

/// Face-down card label
const CARD_BACK: &str = "?";

/// Feedback line under the puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub text: &'static str,
    /// CSS color
    pub color: &'static str,
}

/// Escape text for element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Runner: score readout, canvas stage with the game-over overlay, help line
pub fn runner_markup() -> String {
    format!(
        concat!(
            r#"<div class="runner-container">"#,
            r#"<div class="score">Apa salvată: <span id="{score}">0</span>L</div>"#,
            r#"<div class="runner-stage" style="position: relative;">"#,
            r#"<canvas id="{canvas}" width="{w}" height="{h}"></canvas>"#,
            r#"<div id="{over}" class="runner-over" hidden>"#,
            r#"<div class="runner-over-title">{title}</div>"#,
            r#"<div class="runner-over-hint">{hint}</div>"#,
            r#"</div></div>"#,
            r#"<div class="instructions">Sari peste stânci și văpăi (SPACE/CLICK)!</div>"#,
            r#"</div>"#,
        ),
        score = RUNNER_SCORE_ID,
        canvas = RUNNER_CANVAS_ID,
        w = FIELD_WIDTH as u32,
        h = FIELD_HEIGHT as u32,
        over = RUNNER_OVER_ID,
        title = RUNNER_OVER_TITLE,
        hint = RUNNER_OVER_HINT,
    )
}

/// List items for the puzzle lines, in the player's order
pub fn puzzle_lines_markup(lines: &[String]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<li draggable="true" data-index="{}">{}</li>"#,
            i,
            escape_html(line)
        );
    }
    out
}

/// Puzzle level: heading, draggable lines, check button, feedback slot
pub fn puzzle_markup(puzzle: &PuzzleGame) -> String {
    format!(
        concat!(
            r#"<div class="puzzle-container">"#,
            r#"<h3>Nivelul {level}: Ordonează strofa</h3>"#,
            r#"<ul id="{list}">{lines}</ul>"#,
            r#"<button id="{check}" class="btn-play">Verifică</button>"#,
            r#"<div id="{feedback}"></div>"#,
            r#"</div>"#,
        ),
        level = puzzle.level() + 1,
        list = PUZZLE_LIST_ID,
        lines = puzzle_lines_markup(puzzle.lines()),
        check = PUZZLE_CHECK_ID,
        feedback = PUZZLE_FEEDBACK_ID,
    )
}

pub fn puzzle_feedback(outcome: PuzzleOutcome) -> Feedback {
    match outcome {
        PuzzleOutcome::Advance => Feedback {
            text: "✨ Bravo! Treci la următoarea strofă.",
            color: "blue",
        },
        PuzzleOutcome::Complete => Feedback {
            text: "🏆 Felicitări! Ai ordonat balada perfect.",
            color: "green",
        },
        PuzzleOutcome::Retry => Feedback {
            text: "❌ Mai încearcă, ordinea nu este corectă.",
            color: "red",
        },
    }
}

pub fn memory_card_class(face: CardFace) -> &'static str {
    match face {
        CardFace::Hidden => "memory-card",
        CardFace::Revealed => "memory-card flipped",
        CardFace::Matched => "memory-card flipped matched",
    }
}

/// What a card shows: its glyph when face up, the card back otherwise
pub fn memory_card_label(game: &MemoryGame, index: usize) -> &'static str {
    match game.cards().get(index) {
        Some(card) if card.face != CardFace::Hidden => card.symbol.glyph,
        _ => CARD_BACK,
    }
}

/// Card grid and the stats line
pub fn memory_markup(game: &MemoryGame) -> String {
    let mut cards = String::new();
    for (i, card) in game.cards().iter().enumerate() {
        let _ = write!(
            cards,
            r#"<div class="{}" data-index="{}" title="{}">{}</div>"#,
            memory_card_class(card.face),
            i,
            if card.face == CardFace::Hidden {
                ""
            } else {
                card.symbol.name
            },
            memory_card_label(game, i)
        );
    }

    format!(
        concat!(
            r#"<div class="memory-container">"#,
            r#"<h3>Potrivește simbolurile din poezie</h3>"#,
            r#"<div class="memory-grid" id="{grid}">{cards}</div>"#,
            r#"<div id="{stats}" "#,
            r#"style="margin-top: 1rem; color: #1A2F4B; font-weight: 600;"></div>"#,
            r#"</div>"#,
        ),
        grid = MEMORY_GRID_ID,
        cards = cards,
        stats = MEMORY_STATS_ID,
    )
}

pub fn memory_stats(pairs: usize, total: usize) -> String {
    format!("Perechi găsite: {}/{}", pairs, total)
}
