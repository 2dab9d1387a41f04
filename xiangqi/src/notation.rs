//! Square and move notation.
//!
//! A square is written as a file letter `a`..`i` followed by a rank digit
//! `0`..`9`, rank 0 being the player's back rank. Internally a square is an
//! index into the engine's padded 16-column board, on which `a0` sits at
//! [`A0`] and each rank up is [`ROW_STRIDE`] cells lower.

use std::fmt;
use std::str::FromStr;

/// Index of `a0` on the padded board.
pub const A0: u8 = 12 * ROW_STRIDE + 3;
/// Distance between two ranks on the padded board.
pub const ROW_STRIDE: u8 = 16;
/// Number of files on a xiangqi board.
pub const FILES: u8 = 9;
/// Number of ranks on a xiangqi board.
pub const RANKS: u8 = 10;

/// `index + rotated index` for every cell of the padded board.
const ROTATION_SUM: u8 = 254;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("Malformed square notation: {0:?}")]
    MalformedNotation(String),
    #[error("Malformed move notation: {0:?}")]
    MalformedMove(String),
    #[error("Square index {0} is off the board")]
    OffBoard(u8),
}

/// A square on the 9x10 board, stored as the engine's native index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Build a square from zero-based file and rank.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file >= FILES || rank >= RANKS {
            return None;
        }
        Some(Self(A0 + file - ROW_STRIDE * rank))
    }

    /// Parse `a0`..`i9`. Anything else, including surrounding whitespace or
    /// uppercase files, is rejected.
    pub fn parse(text: &str) -> Result<Self, NotationError> {
        let malformed = || NotationError::MalformedNotation(text.to_string());
        let &[file, rank] = text.as_bytes() else {
            return Err(malformed());
        };
        Self::new(file.wrapping_sub(b'a'), rank.wrapping_sub(b'0')).ok_or_else(malformed)
    }

    /// Wrap an engine index, rejecting padding cells.
    pub fn from_index(index: u8) -> Result<Self, NotationError> {
        let offset = i16::from(index) - i16::from(A0);
        let stride = i16::from(ROW_STRIDE);
        let file = offset.rem_euclid(stride);
        let rank = -offset.div_euclid(stride);
        if file < i16::from(FILES) && (0..i16::from(RANKS)).contains(&rank) {
            Ok(Self(index))
        } else {
            Err(NotationError::OffBoard(index))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn file(self) -> u8 {
        self.0 + ROW_STRIDE * self.rank() - A0
    }

    pub fn rank(self) -> u8 {
        // Ranks grow towards lower indices; rank r covers
        // [A0 - 16r, A0 - 16r + 8].
        (A0 + ROW_STRIDE - 1 - self.0) / ROW_STRIDE
    }

    /// The same cell seen from the other side of the board.
    pub fn rotate(self) -> Self {
        Self(ROTATION_SUM - self.0)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file()), self.rank())
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An origin/destination pair in the engine's index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Parse two squares written back to back, e.g. `h2e2`.
    pub fn parse(text: &str) -> Result<Self, NotationError> {
        let trimmed = text.trim();
        let malformed = || NotationError::MalformedMove(text.to_string());
        if trimmed.len() != 4 {
            return Err(malformed());
        }
        let (Some(from), Some(to)) = (trimmed.get(..2), trimmed.get(2..)) else {
            return Err(malformed());
        };
        match (Square::parse(from), Square::parse(to)) {
            (Ok(from), Ok(to)) => Ok(Self { from, to }),
            _ => Err(malformed()),
        }
    }

    /// The move as seen by the opponent.
    pub fn rotate(self) -> Self {
        Self {
            from: self.from.rotate(),
            to: self.to.rotate(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
