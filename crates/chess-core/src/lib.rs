//! Board model and notation for relaying UCI engine analysis.
//!
//! Engines speak in coordinate tokens (`e2e4`, `f7f8q`). This crate tracks a
//! bitboard position and turns those tokens into standard algebraic lines
//! (`1.e4 e5 2.Nf3`), including the score prefix for engine info lines.

pub mod analysis;
pub mod bitboard;
pub mod error;
pub mod fen;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod piece;
pub mod square;

pub use analysis::{AnalysisState, InfoLine, Score};
pub use bitboard::BitBoard;
pub use error::NotationError;
pub use fen::{Fen, STARTPOSITION};
pub use moves::{CastlingType, Move};
pub use notation::render_line;
pub use piece::{Color, Piece, Role};
pub use square::Square;
