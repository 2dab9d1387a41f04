//! Text rendering of a board placement for chat replies.

use std::fmt;

use crate::notation::{FILES, RANKS};
use crate::types::{PieceColor, PieceKind};

/// Placement of the standard opening, red to move.
pub const INITIAL_PLACEMENT: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";

const EMPTY_GLYPH: char = '．';
const FILE_LABELS: &str = "ａｂｃｄｅｆｇｈｉ";

/// A 9x10 board for display purposes only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayBoard {
    /// Indexed `[rank][file]`, rank 0 at the bottom.
    squares: [[Option<(PieceKind, PieceColor)>; FILES as usize]; RANKS as usize],
}

impl DisplayBoard {
    /// Parse a FEN-style placement: ranks 9 down to 0 separated by `/`,
    /// digits for runs of empty squares, uppercase for red.
    pub fn from_placement(placement: &str) -> Result<Self, DisplayBoardError> {
        let placement = placement
            .split_whitespace()
            .next()
            .ok_or(DisplayBoardError::InvalidPlacement)?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != RANKS as usize {
            return Err(DisplayBoardError::InvalidPlacement);
        }

        let mut squares = [[None; FILES as usize]; RANKS as usize];
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = RANKS as usize - 1 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    if file >= FILES as usize {
                        return Err(DisplayBoardError::InvalidPlacement);
                    }
                    let color = if c.is_ascii_uppercase() {
                        PieceColor::Red
                    } else {
                        PieceColor::Black
                    };
                    let kind = PieceKind::from_char(c).ok_or(DisplayBoardError::InvalidPiece(c))?;
                    squares[rank][file] = Some((kind, color));
                    file += 1;
                }
            }
            if file != FILES as usize {
                return Err(DisplayBoardError::InvalidPlacement);
            }
        }

        Ok(DisplayBoard { squares })
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file >= FILES || rank >= RANKS {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }
}

impl fmt::Display for DisplayBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, row) in self.squares.iter().enumerate().rev() {
            write!(f, " {} ", rank)?;
            for square in row {
                let glyph = match square {
                    Some((kind, color)) => kind.glyph(*color),
                    None => EMPTY_GLYPH,
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        write!(f, "    {}", FILE_LABELS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayBoardError {
    #[error("Invalid board placement")]
    InvalidPlacement,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position() {
        let board = DisplayBoard::from_placement(INITIAL_PLACEMENT).unwrap();
        assert_eq!(
            board.piece_at(0, 0),
            Some((PieceKind::Chariot, PieceColor::Red))
        );
        assert_eq!(
            board.piece_at(4, 0),
            Some((PieceKind::General, PieceColor::Red))
        );
        assert_eq!(
            board.piece_at(7, 7),
            Some((PieceKind::Cannon, PieceColor::Black))
        );
        assert_eq!(board.piece_at(4, 4), None);
        assert_eq!(board.piece_at(9, 0), None);
    }

    #[test]
    fn test_render_starting_position() {
        let text = DisplayBoard::from_placement(INITIAL_PLACEMENT)
            .unwrap()
            .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], " 9 俥傌象士将士象傌俥");
        assert_eq!(lines[7], " 2 ．炮．．．．．炮．");
        assert_eq!(lines[9], " 0 车马相仕帅仕相马车");
        assert_eq!(lines[10], "    ａｂｃｄｅｆｇｈｉ");
    }

    #[test]
    fn test_rejects_short_rank() {
        let placement = "rnbakabn/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";
        assert_eq!(
            DisplayBoard::from_placement(placement),
            Err(DisplayBoardError::InvalidPlacement)
        );
    }

    #[test]
    fn test_rejects_unknown_piece() {
        let placement = "rnbakabnq/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";
        assert_eq!(
            DisplayBoard::from_placement(placement),
            Err(DisplayBoardError::InvalidPiece('q'))
        );
    }

    #[test]
    fn test_empty_board() {
        let board = DisplayBoard::from_placement("9/9/9/9/9/9/9/9/9/9").unwrap();
        for rank in 0..RANKS {
            for file in 0..FILES {
                assert_eq!(board.piece_at(file, rank), None);
            }
        }
    }
}
