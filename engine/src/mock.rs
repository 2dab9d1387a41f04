//! Scripted engine for tests.
//!
//! Rules are loose: any piece of the side to move may go to any
//! square not holding one of its own pieces. Capturing a general scores the
//! full king value, so a single move can end a game.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use xiangqi::board_display::INITIAL_PLACEMENT;
use xiangqi::notation::{FILES, RANKS};
use xiangqi::{Move, Square};

use crate::{Engine, Estimate, MateBounds, Position};

pub const KING_VALUE: i32 = 60_000;
pub const MATE_BOUNDS: MateBounds = MateBounds {
    lower: KING_VALUE - 6_000,
    upper: KING_VALUE + 6_000,
};

const BOARD_CELLS: usize = 256;
const EMPTY: u8 = b'.';
const PADDING: u8 = b' ';

fn piece_value(piece: u8) -> i32 {
    match piece.to_ascii_uppercase() {
        b'K' => KING_VALUE,
        b'R' => 600,
        b'C' => 285,
        b'N' => 270,
        b'A' | b'B' => 120,
        b'P' => 30,
        _ => 0,
    }
}

fn squares() -> impl Iterator<Item = Square> {
    (0..RANKS)
        .rev()
        .flat_map(|rank| (0..FILES).filter_map(move |file| Square::new(file, rank)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPosition {
    cells: Vec<u8>,
    score: i32,
}

impl MockPosition {
    /// Build a position from a FEN-style placement, uppercase to move.
    pub fn from_placement(placement: &str, score: i32) -> Self {
        let mut cells = vec![PADDING; BOARD_CELLS];
        for (rank_idx, row) in placement.split('/').enumerate() {
            let rank = RANKS - 1 - rank_idx as u8;
            let mut file = 0u8;
            for c in row.bytes() {
                if c.is_ascii_digit() {
                    for _ in 0..(c - b'0') {
                        if let Some(sq) = Square::new(file, rank) {
                            cells[sq.index() as usize] = EMPTY;
                        }
                        file += 1;
                    }
                } else {
                    if let Some(sq) = Square::new(file, rank) {
                        cells[sq.index() as usize] = c;
                    }
                    file += 1;
                }
            }
        }
        Self { cells, score }
    }

    pub fn piece_on(&self, square: Square) -> Option<char> {
        match self.cells[square.index() as usize] {
            EMPTY | PADDING => None,
            piece => Some(char::from(piece)),
        }
    }

    fn captures_general(&self, mv: Move) -> bool {
        self.cells[mv.to.index() as usize] == b'k'
    }
}

impl Position for MockPosition {
    fn legal_moves(&self) -> Vec<Move> {
        let (own, targets): (Vec<Square>, Vec<Square>) =
            squares().partition(|sq| self.cells[sq.index() as usize].is_ascii_uppercase());
        own.iter()
            .flat_map(|&from| targets.iter().map(move |&to| Move::new(from, to)))
            .collect()
    }

    fn play(&self, mv: Move) -> Self {
        let mut cells = self.cells.clone();
        let captured = cells[mv.to.index() as usize];
        cells[mv.to.index() as usize] = cells[mv.from.index() as usize];
        cells[mv.from.index() as usize] = EMPTY;
        Self {
            cells,
            score: self.score + piece_value(captured),
        }
        .rotate()
    }

    fn rotate(&self) -> Self {
        let mut cells = vec![PADDING; BOARD_CELLS];
        for sq in squares() {
            let piece = self.cells[sq.index() as usize];
            let swapped = if piece.is_ascii_uppercase() {
                piece.to_ascii_lowercase()
            } else {
                piece.to_ascii_uppercase()
            };
            cells[sq.rotate().index() as usize] = swapped;
        }
        Self {
            cells,
            score: -self.score,
        }
    }

    fn score(&self) -> i32 {
        self.score
    }

    fn placement(&self) -> String {
        let mut rows = Vec::with_capacity(RANKS as usize);
        for rank in (0..RANKS).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..FILES {
                let piece = Square::new(file, rank).and_then(|sq| self.piece_on(sq));
                match piece {
                    Some(c) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }
        rows.join("/")
    }
}

/// Engine double replaying scripted replies.
///
/// Replies are written from the player's side of the board, the way they
/// would appear in the bot's "my move" line.
pub struct MockEngine {
    replies: Mutex<VecDeque<Move>>,
    max_depth: Option<u32>,
    estimate_delay: Duration,
    searches: AtomicUsize,
    initial: MockPosition,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            max_depth: Some(3),
            estimate_delay: Duration::ZERO,
            searches: AtomicUsize::new(0),
            initial: MockPosition::from_placement(INITIAL_PLACEMENT, 0),
        }
    }

    /// Queue engine replies in player-side notation, e.g. `h7e7`.
    pub fn with_replies<'a>(self, replies: impl IntoIterator<Item = &'a str>) -> Self {
        {
            let mut queue = self.replies.lock().unwrap();
            queue.extend(
                replies
                    .into_iter()
                    .map(|text| Move::parse(text).unwrap().rotate()),
            );
        }
        self
    }

    /// Deepest estimate produced, `None` for an endless search.
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Simulated work before each estimate.
    pub fn with_estimate_delay(mut self, delay: Duration) -> Self {
        self.estimate_delay = delay;
        self
    }

    pub fn with_initial_position(mut self, position: MockPosition) -> Self {
        self.initial = position;
        self
    }

    /// Number of searches started so far.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn choose(&self, position: &MockPosition) -> Option<Move> {
        let legal = position.legal_moves();
        let scripted = self.replies.lock().unwrap().pop_front();
        if let Some(mv) = scripted.filter(|mv| legal.contains(mv)) {
            return Some(mv);
        }
        legal
            .iter()
            .copied()
            .find(|mv| position.piece_on(mv.to).is_none())
            .or_else(|| legal.first().copied())
    }
}

impl Engine for MockEngine {
    type Position = MockPosition;

    fn initial_position(&self) -> MockPosition {
        self.initial.clone()
    }

    fn mate_bounds(&self) -> MateBounds {
        MATE_BOUNDS
    }

    fn search<'a>(
        &'a self,
        position: &'a MockPosition,
        _history: &'a [MockPosition],
    ) -> Box<dyn Iterator<Item = Estimate> + 'a> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let Some(mv) = self.choose(position) else {
            return Box::new(std::iter::empty());
        };
        let score = if position.captures_general(mv) {
            MATE_BOUNDS.upper
        } else {
            position.score + piece_value(position.cells[mv.to.index() as usize])
        };
        let delay = self.estimate_delay;
        let estimate = move |depth| {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            Estimate { depth, mv, score }
        };
        match self.max_depth {
            Some(max) => Box::new((1..=max).map(estimate)),
            None => Box::new((1..).map(estimate)),
        }
    }
}
