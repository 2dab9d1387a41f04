//! Piece and side types used for rendering.

/// Xiangqi piece kinds, named after their FEN letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Chariot,
    Horse,
    Elephant,
    Advisor,
    General,
    Cannon,
    Soldier,
}

/// Which side owns a piece. Red is always the side the board is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    Red,
    Black,
}

impl PieceKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(Self::Chariot),
            'N' => Some(Self::Horse),
            'B' => Some(Self::Elephant),
            'A' => Some(Self::Advisor),
            'K' => Some(Self::General),
            'C' => Some(Self::Cannon),
            'P' => Some(Self::Soldier),
            _ => None,
        }
    }

    /// Traditional character for this piece on the given side.
    pub fn glyph(self, color: PieceColor) -> char {
        match (color, self) {
            (PieceColor::Red, Self::Chariot) => '车',
            (PieceColor::Red, Self::Horse) => '马',
            (PieceColor::Red, Self::Elephant) => '相',
            (PieceColor::Red, Self::Advisor) => '仕',
            (PieceColor::Red, Self::General) => '帅',
            (PieceColor::Red, Self::Cannon) => '炮',
            (PieceColor::Red, Self::Soldier) => '兵',
            (PieceColor::Black, Self::Chariot) => '俥',
            (PieceColor::Black, Self::Horse) => '傌',
            (PieceColor::Black, Self::Elephant) => '象',
            (PieceColor::Black, Self::Advisor) => '士',
            (PieceColor::Black, Self::General) => '将',
            (PieceColor::Black, Self::Cannon) => '砲',
            (PieceColor::Black, Self::Soldier) => '卒',
        }
    }
}
