//! Error types for position parsing and move notation

use thiserror::Error;

use crate::piece::Piece;
use crate::square::Square;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Invalid move token: {0}")]
    InvalidMove(String),

    #[error("No piece on {square} for move {token}")]
    EmptySquare { token: String, square: Square },

    #[error("Invalid promotion in move {0}")]
    InvalidPromotion(String),

    /// The board and the move disagree about what stands on the origin square.
    #[error("{piece:?} is not on {square}")]
    PieceNotOnSquare { piece: Piece, square: Square },

    #[error("Unknown score type: {0}")]
    UnknownScore(String),
}

impl NotationError {
    pub(crate) fn fen(fen: &str, reason: impl Into<String>) -> Self {
        NotationError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}
