//! Algebraic notation for engine lines.
//!
//! - Pieces other than pawns get a letter: `Nf3`, `Qe2`.
//! - Captures are marked with `x`; pawn captures name the origin file (`exd5`).
//! - Two like pieces reaching the same square are told apart by origin file
//!   or rank (`Rae1`, `N5c4`).
//! - Castling is `0-0` / `0-0-0`, promotion appends the piece (`f8Q`), check
//!   appends `+`.

use std::fmt::{self, Write};

use crate::bitboard::BitBoard;
use crate::error::NotationError;
use crate::moves::Move;
use crate::piece::Role;

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(castling) = self.castling {
            return f.write_str(castling.as_str());
        }

        f.write_str(self.piece.role.letter())?;
        f.write_str(&self.disambiguation)?;
        if self.capture {
            if self.piece.role == Role::Pawn {
                f.write_char(self.from.file_char())?;
            }
            f.write_char('x')?;
        }
        write!(f, "{}", self.to)?;
        if let Some(promoted) = self.promotion {
            f.write_str(promoted.role.letter())?;
        }
        if self.check {
            f.write_char('+')?;
        }
        Ok(())
    }
}

/// Resolve and play each token in turn on `board`, marking checks.
pub fn resolve_line<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
    board: &mut BitBoard,
) -> Result<Vec<Move>, NotationError> {
    let mut moves = Vec::new();
    for token in tokens {
        let mut mv = Move::resolve(token, board)?;
        board.apply(&mv)?;
        mv.check = board.is_check(mv.piece.color);
        moves.push(mv);
    }
    Ok(moves)
}

/// Number and join moves: `1.e4 e5 2.Nf3`, or `3...Kh8 4.Qe2` when the line
/// starts with black.
pub fn style_line(moves: &[Move], move_number: u32, white_to_move: bool) -> String {
    let mut result = String::new();
    let mut number = move_number;
    let mut white = white_to_move;

    for (i, mv) in moves.iter().enumerate() {
        if i > 0 {
            result.push(' ');
        }
        if white {
            result.push_str(&format!("{number}."));
        } else if i == 0 {
            result.push_str(&format!("{number}..."));
        }
        result.push_str(&mv.to_string());

        if !white {
            number += 1;
        }
        white = !white;
    }
    result
}

/// Render a space separated engine line from the position on `board`.
/// The board is consumed; pass a clone to keep the original.
pub fn render_line(
    line: &str,
    mut board: BitBoard,
    move_number: u32,
    white_to_move: bool,
) -> Result<String, NotationError> {
    let moves = resolve_line(line.split_whitespace(), &mut board)?;
    Ok(style_line(&moves, move_number, white_to_move))
}
