//! FEN position strings.
//!
//! Six space separated fields: board (rank 8 first, digits for runs of empty
//! squares), side to move, castling rights, en passant target, half-move clock
//! and full-move number. Missing trailing fields default to empty/zero and the
//! side to move defaults to white.

use std::fmt;
use std::str::FromStr;

use crate::bitboard::BitBoard;
use crate::error::NotationError;
use crate::moves::Move;
use crate::piece::{Color, Piece, Role};
use crate::square::Square;

pub const STARTPOSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    board: String,
    pieces: [Option<Piece>; 64],
    pub side: Color,
    /// Castling field as given, empty when absent.
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove: u32,
    pub fullmove: u32,
}

impl Fen {
    pub fn start() -> Fen {
        Self::from_str(STARTPOSITION).expect("start position is valid FEN")
    }

    /// Board field as given.
    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces[square.index() as usize]
    }

    pub fn white_to_move(&self) -> bool {
        self.side == Color::White
    }

    /// Full-move number for display; an absent field counts as move 1.
    pub fn move_number(&self) -> u32 {
        self.fullmove.max(1)
    }

    /// Snapshot a board into a position string.
    pub fn from_board(board: &BitBoard, side: Color, halfmove: u32, fullmove: u32) -> Fen {
        let mut pieces = [None; 64];
        for (index, slot) in pieces.iter_mut().enumerate() {
            *slot = Square::from_index(index as u8).and_then(|sq| board.piece_at(sq));
        }
        Fen {
            board: board.board_fen(),
            pieces,
            side,
            castling: board.castling_fen(),
            en_passant: board.en_passant(),
            halfmove,
            fullmove,
        }
    }

    /// Position reached by playing the given move tokens from this one.
    pub fn after_moves<'a>(
        &self,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Result<Fen, NotationError> {
        let mut board = BitBoard::from_fen(self);
        let mut side = self.side;
        let mut halfmove = self.halfmove;
        let mut fullmove = self.fullmove;

        for token in tokens {
            let mv = Move::resolve(token, &board)?;
            board.apply(&mv)?;
            halfmove = if mv.piece.role == Role::Pawn || mv.capture {
                0
            } else {
                halfmove + 1
            };
            if mv.piece.color == Color::Black {
                fullmove += 1;
            }
            side = !mv.piece.color;
        }

        Ok(Fen::from_board(&board, side, halfmove, fullmove))
    }
}

impl FromStr for Fen {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();

        let board = parts
            .next()
            .ok_or_else(|| NotationError::fen(s, "empty position string"))?;
        let pieces = parse_board(board).map_err(|reason| NotationError::fen(s, reason))?;

        let side = match parts.next() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(NotationError::fen(s, format!("bad side to move '{other}'"))),
        };

        let castling = match parts.next() {
            None | Some("-") => String::new(),
            Some(rights) if rights.chars().all(|c| "KQkq".contains(c)) => rights.to_string(),
            Some(other) => {
                return Err(NotationError::fen(s, format!("bad castling rights '{other}'")))
            }
        };

        let en_passant = match parts.next() {
            None | Some("-") => None,
            Some(name) => Some(
                name.parse::<Square>()
                    .map_err(|_| NotationError::fen(s, format!("bad en passant square '{name}'")))?,
            ),
        };

        let halfmove = parse_counter(s, parts.next(), "half-move clock")?;
        let fullmove = parse_counter(s, parts.next(), "full-move number")?;

        Ok(Fen {
            board: board.to_string(),
            pieces,
            side,
            castling,
            en_passant,
            halfmove,
            fullmove,
        })
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Color::White => "w",
            Color::Black => "b",
        };
        let castling = if self.castling.is_empty() { "-" } else { &self.castling };
        write!(f, "{} {side} {castling} ", self.board)?;
        match self.en_passant {
            Some(square) => write!(f, "{square}")?,
            None => write!(f, "-")?,
        }
        write!(f, " {} {}", self.halfmove, self.fullmove)
    }
}

fn parse_counter(fen: &str, field: Option<&str>, name: &str) -> Result<u32, NotationError> {
    match field {
        None => Ok(0),
        Some(value) => value
            .parse()
            .map_err(|_| NotationError::fen(fen, format!("bad {name} '{value}'"))),
    }
}

/// Expand the board field into 64 squares, a1 first.
fn parse_board(board: &str) -> Result<[Option<Piece>; 64], String> {
    let rows: Vec<&str> = board.split('/').collect();
    if rows.len() != 8 {
        return Err(format!("expected 8 ranks, found {}", rows.len()));
    }

    let mut pieces = [None; 64];
    // The first row is rank 8
    for (i, row) in rows.iter().enumerate() {
        let rank = 7 - i as u8;
        let expanded = expand_row(row)?;
        for (file, piece) in expanded.into_iter().enumerate() {
            pieces[Square::new(file as u8, rank).index() as usize] = piece;
        }
    }
    Ok(pieces)
}

/// `5k2` -> five empty squares, a black king, two empty squares.
pub fn expand_row(row: &str) -> Result<[Option<Piece>; 8], String> {
    let mut squares = [None; 8];
    let mut file = 0usize;

    for c in row.chars() {
        if let Some(run) = c.to_digit(10) {
            if run == 0 || run > 8 {
                return Err(format!("bad run length '{c}' in rank '{row}'"));
            }
            file += run as usize;
        } else {
            let piece = Piece::from_symbol(c)
                .ok_or_else(|| format!("unknown piece '{c}' in rank '{row}'"))?;
            if file < 8 {
                squares[file] = Some(piece);
            }
            file += 1;
        }
        if file > 8 {
            return Err(format!("rank '{row}' is wider than 8 squares"));
        }
    }

    if file != 8 {
        return Err(format!("rank '{row}' covers {file} squares"));
    }
    Ok(squares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_fen() {
        let fen: Fen = "5k2/4n2p/1q2PBp1/p7/Q4P2/6P1/7P/2rR3K b - -".parse().unwrap();
        assert_eq!(fen.board(), "5k2/4n2p/1q2PBp1/p7/Q4P2/6P1/7P/2rR3K");
        assert_eq!(fen.side, Color::Black);
        assert_eq!(fen.castling, "");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove, 0);
        assert_eq!(fen.fullmove, 0);
        assert_eq!(fen.move_number(), 1);

        let sq = |name: &str| name.parse::<Square>().unwrap();
        assert_eq!(fen.piece_at(sq("b6")), Piece::from_symbol('q'));
        assert_eq!(fen.piece_at(sq("a4")), Piece::from_symbol('Q'));
        assert_eq!(fen.piece_at(sq("h2")), Piece::from_symbol('P'));
        assert_eq!(fen.piece_at(sq("a1")), None);
    }

    #[test]
    fn test_board_only_defaults_to_white() {
        let fen: Fen = "8/8/8/8/8/8/8/K6k".parse().unwrap();
        assert!(fen.white_to_move());
        assert_eq!(fen.to_string(), "8/8/8/8/8/8/8/K6k w - - 0 0");
    }

    #[test]
    fn test_expand_row() {
        let row = expand_row("5k2").unwrap();
        assert_eq!(row[5], Piece::from_symbol('k'));
        assert_eq!(row.iter().filter(|p| p.is_some()).count(), 1);
        assert!(expand_row("5k3").is_err());
        assert!(expand_row("7").is_err());
        assert!(expand_row("4x3").is_err());
    }

    #[test]
    fn test_start_position_display() {
        assert_eq!(Fen::start().to_string(), STARTPOSITION);
    }

    #[test]
    fn test_malformed_sections() {
        assert!("".parse::<Fen>().is_err());
        assert!("8/8/8/8/8/8/8 w - - 0 1".parse::<Fen>().is_err());
        assert!("8/8/8/8/8/8/8/8 x - - 0 1".parse::<Fen>().is_err());
        assert!("8/8/8/8/8/8/8/8 w KX - 0 1".parse::<Fen>().is_err());
        assert!("8/8/8/8/8/8/8/8 w - e9 0 1".parse::<Fen>().is_err());
        assert!("8/8/8/8/8/8/8/8 w - - zero 1".parse::<Fen>().is_err());
    }

    #[test]
    fn test_after_moves() {
        let fen = Fen::start().after_moves(["e2e4", "c7c5", "g1f3"]).unwrap();
        assert_eq!(
            fen.to_string(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );

        let fen = Fen::start().after_moves(["e2e4"]).unwrap();
        assert_eq!(
            fen.to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_after_moves_drops_castling_rights() {
        let fen: Fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let fen = fen.after_moves(["e1g1", "a8b8"]).unwrap();
        assert_eq!(fen.to_string(), "1r2k2r/8/8/8/8/8/8/R4RK1 w k - 2 2");
    }
}
