//! Memory match game logic
//!
//! Sixteen face-down cards hide eight symbols from the poem, two of each.
//! At most two unconfirmed cards are face up at a time.

use rand::Rng;
use rand::seq::SliceRandom;

/// A symbol from the poem and its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub glyph: &'static str,
    pub name: &'static str,
}

/// The eight symbols dealt twice each
pub const POEM_SYMBOLS: [Symbol; 8] = [
    Symbol { glyph: "🪖", name: "Coiful" },
    Symbol { glyph: "💧", name: "Apa" },
    Symbol { glyph: "☀️", name: "Soarele" },
    Symbol { glyph: "🏺", name: "Burduful" },
    Symbol { glyph: "🐎", name: "Calul" },
    Symbol { glyph: "⚔️", name: "Sulița" },
    Symbol { glyph: "🛡️", name: "Scutul" },
    Symbol { glyph: "🔥", name: "Văpaia" },
];

/// Visibility of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardFace {
    #[default]
    Hidden,
    /// Face up, waiting for its partner
    Revealed,
    /// Permanently face up
    Matched,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub symbol: Symbol,
    pub face: CardFace,
}

/// What a flip did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Not allowed right now (two pending, already up, or no such card)
    Ignored,
    /// First card of a pair turned up
    Revealed,
    /// Second card matched the first; `pairs` is the new total
    Matched { cards: [usize; 2], pairs: usize },
    /// Second card differs; both stay up until `hide_pending`
    Mismatched,
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    cards: Vec<Card>,
    /// Face-up cards that are not matched yet (at most two)
    pending: Vec<usize>,
    matched_pairs: usize,
}

impl MemoryGame {
    /// Deal every symbol twice in random order
    pub fn new<R: Rng>(symbols: &[Symbol], rng: &mut R) -> Self {
        let mut cards: Vec<Card> = symbols
            .iter()
            .chain(symbols.iter())
            .map(|&symbol| Card {
                symbol,
                face: CardFace::Hidden,
            })
            .collect();
        cards.shuffle(rng);

        Self {
            cards,
            pending: Vec::with_capacity(2),
            matched_pairs: 0,
        }
    }

    /// Game over the poem's symbols
    pub fn poem<R: Rng>(rng: &mut R) -> Self {
        Self::new(&POEM_SYMBOLS, rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.total_pairs()
    }

    /// Turn a card face up
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.pending.len() >= 2 {
            return FlipOutcome::Ignored;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return FlipOutcome::Ignored;
        };
        if card.face != CardFace::Hidden {
            return FlipOutcome::Ignored;
        }

        card.face = CardFace::Revealed;
        self.pending.push(index);

        let [first, second] = self.pending[..] else {
            return FlipOutcome::Revealed;
        };

        if self.cards[first].symbol == self.cards[second].symbol {
            self.cards[first].face = CardFace::Matched;
            self.cards[second].face = CardFace::Matched;
            self.pending.clear();
            self.matched_pairs += 1;
            FlipOutcome::Matched {
                cards: [first, second],
                pairs: self.matched_pairs,
            }
        } else {
            FlipOutcome::Mismatched
        }
    }

    /// Turn a mismatched pair face down again. Returns the hidden indices.
    pub fn hide_pending(&mut self) -> Vec<usize> {
        if self.pending.len() < 2 {
            return Vec::new();
        }
        let hidden = std::mem::take(&mut self.pending);
        for &i in &hidden {
            self.cards[i].face = CardFace::Hidden;
        }
        hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn new_game() -> MemoryGame {
        MemoryGame::poem(&mut Pcg32::seed_from_u64(2024))
    }

    /// Indices of the two cards holding `symbol`
    fn pair_of(game: &MemoryGame, symbol: Symbol) -> (usize, usize) {
        let idx: Vec<usize> = game
            .cards()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.symbol == symbol)
            .map(|(i, _)| i)
            .collect();
        (idx[0], idx[1])
    }

    /// Two cards with different symbols
    fn mismatch(game: &MemoryGame) -> (usize, usize) {
        let second = game
            .cards()
            .iter()
            .position(|c| c.symbol != game.cards()[0].symbol)
            .unwrap();
        (0, second)
    }

    #[test]
    fn test_deal() {
        let game = new_game();
        assert_eq!(game.cards().len(), 16);
        assert_eq!(game.total_pairs(), 8);
        for symbol in POEM_SYMBOLS {
            assert_eq!(game.cards().iter().filter(|c| c.symbol == symbol).count(), 2);
        }
        assert!(game.cards().iter().all(|c| c.face == CardFace::Hidden));
    }

    #[test]
    fn test_matching_pair() {
        let mut game = new_game();
        let (a, b) = pair_of(&game, POEM_SYMBOLS[3]);

        assert_eq!(game.flip(a), FlipOutcome::Revealed);
        assert_eq!(
            game.flip(b),
            FlipOutcome::Matched {
                cards: [a, b],
                pairs: 1
            }
        );
        assert_eq!(game.cards()[a].face, CardFace::Matched);
        assert_eq!(game.cards()[b].face, CardFace::Matched);
        assert!(game.pending().is_empty());

        // Matched cards cannot be flipped again
        assert_eq!(game.flip(a), FlipOutcome::Ignored);
    }

    #[test]
    fn test_mismatch_then_hide() {
        let mut game = new_game();
        let (a, b) = mismatch(&game);

        game.flip(a);
        assert_eq!(game.flip(b), FlipOutcome::Mismatched);
        assert_eq!(game.pending(), &[a, b]);

        let mut hidden = game.hide_pending();
        hidden.sort();
        assert_eq!(hidden, vec![a.min(b), a.max(b)]);
        assert_eq!(game.cards()[a].face, CardFace::Hidden);
        assert_eq!(game.cards()[b].face, CardFace::Hidden);
        assert_eq!(game.matched_pairs(), 0);
    }

    #[test]
    fn test_third_flip_ignored_while_two_pending() {
        let mut game = new_game();
        let (a, b) = mismatch(&game);
        game.flip(a);
        game.flip(b);

        let third = (0..16).find(|&i| i != a && i != b).unwrap();
        assert_eq!(game.flip(third), FlipOutcome::Ignored);
        assert_eq!(game.cards()[third].face, CardFace::Hidden);
    }

    #[test]
    fn test_flipping_same_card_twice_ignored() {
        let mut game = new_game();
        assert_eq!(game.flip(4), FlipOutcome::Revealed);
        assert_eq!(game.flip(4), FlipOutcome::Ignored);
        assert_eq!(game.flip(99), FlipOutcome::Ignored);
        assert!(game.hide_pending().is_empty());
    }

    #[test]
    fn test_all_pairs_complete() {
        let mut game = new_game();
        for symbol in POEM_SYMBOLS {
            let (a, b) = pair_of(&game, symbol);
            game.flip(a);
            game.flip(b);
        }
        assert_eq!(game.matched_pairs(), 8);
        assert!(game.is_complete());
    }
}
