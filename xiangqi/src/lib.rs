//! Xiangqi notation and board rendering shared by the engine contract and
//! the chat bot.

pub mod board_display;
pub mod notation;
pub mod types;

pub use board_display::{DisplayBoard, DisplayBoardError};
pub use notation::{Move, NotationError, Square};
pub use types::{PieceColor, PieceKind};
