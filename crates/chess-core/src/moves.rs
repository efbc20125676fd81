//! Resolving engine move tokens into annotated moves.

use crate::bitboard::BitBoard;
use crate::error::NotationError;
use crate::movegen;
use crate::piece::{Color, Piece, Role};
use crate::square::{Bits, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastlingType {
    WhiteShort,
    WhiteLong,
    BlackShort,
    BlackLong,
}

impl CastlingType {
    /// Castling implied by a king move, if any.
    pub fn from_king_move(from: Square, to: Square) -> Option<CastlingType> {
        match (from, to) {
            (Square::E1, Square::G1) => Some(CastlingType::WhiteShort),
            (Square::E1, Square::C1) => Some(CastlingType::WhiteLong),
            (Square::E8, Square::G8) => Some(CastlingType::BlackShort),
            (Square::E8, Square::C8) => Some(CastlingType::BlackLong),
            _ => None,
        }
    }

    pub fn king_squares(self) -> (Square, Square) {
        match self {
            CastlingType::WhiteShort => (Square::E1, Square::G1),
            CastlingType::WhiteLong => (Square::E1, Square::C1),
            CastlingType::BlackShort => (Square::E8, Square::G8),
            CastlingType::BlackLong => (Square::E8, Square::C8),
        }
    }

    pub fn rook_squares(self) -> (Square, Square) {
        match self {
            CastlingType::WhiteShort => (Square::H1, Square::F1),
            CastlingType::WhiteLong => (Square::A1, Square::D1),
            CastlingType::BlackShort => (Square::H8, Square::F8),
            CastlingType::BlackLong => (Square::A8, Square::D8),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CastlingType::WhiteShort | CastlingType::BlackShort => "0-0",
            CastlingType::WhiteLong | CastlingType::BlackLong => "0-0-0",
        }
    }
}

/// One engine move token resolved against the board it is played on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub token: String,
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub capture: bool,
    /// Square of the pawn taken en passant.
    pub en_passant: Option<Square>,
    pub castling: Option<CastlingType>,
    pub promotion: Option<Piece>,
    /// Set by the renderer after the move has been applied.
    pub check: bool,
    pub disambiguation: String,
}

impl Move {
    /// Resolve a token such as `e2e4` or `f7f8q` against the board before
    /// the move. Check is not detected here.
    pub fn resolve(token: &str, board: &BitBoard) -> Result<Move, NotationError> {
        if !(4..=5).contains(&token.len()) || !token.is_ascii() {
            return Err(NotationError::InvalidMove(token.to_string()));
        }
        let from: Square = token[0..2]
            .parse()
            .map_err(|_| NotationError::InvalidMove(token.to_string()))?;
        let to: Square = token[2..4]
            .parse()
            .map_err(|_| NotationError::InvalidMove(token.to_string()))?;

        let piece = board.piece_at(from).ok_or_else(|| NotationError::EmptySquare {
            token: token.to_string(),
            square: from,
        })?;

        let mut mv = Move {
            token: token.to_string(),
            from,
            to,
            piece,
            capture: false,
            en_passant: None,
            castling: None,
            promotion: None,
            check: false,
            disambiguation: String::new(),
        };

        if piece.role != Role::Pawn && token.len() == 5 {
            return Err(NotationError::InvalidPromotion(token.to_string()));
        }

        match piece.role {
            Role::King => {
                mv.castling = CastlingType::from_king_move(from, to);
                if mv.castling.is_none() {
                    mv.capture = board.is_capture(to);
                }
            }
            Role::Pawn => {
                let (capture, en_passant) = board.pawn_capture(from, to);
                mv.capture = capture;
                mv.en_passant = en_passant;
                mv.promotion = promotion(token, piece.color, to)?;
            }
            _ => {
                mv.capture = board.is_capture(to);
                mv.disambiguation = disambiguation(board, piece, from, to);
            }
        }

        Ok(mv)
    }
}

fn promotion(token: &str, color: Color, to: Square) -> Result<Option<Piece>, NotationError> {
    let Some(letter) = token.chars().nth(4) else {
        return Ok(None);
    };
    let last_rank = match color {
        Color::White => 7,
        Color::Black => 0,
    };
    match Role::from_promotion(letter) {
        Some(role) if to.rank() == last_rank => Ok(Some(Piece::new(color, role))),
        _ => Err(NotationError::InvalidPromotion(token.to_string())),
    }
}

/// Origin file and/or rank needed to tell the mover apart from other pieces
/// of the same type that reach the same target. The file is used if it is
/// unique among them, else the rank if that is unique, else both.
pub fn disambiguation(board: &BitBoard, piece: Piece, from: Square, to: Square) -> String {
    let Some(mover) = movegen::mover(piece.role) else {
        return String::new();
    };

    let own = board.occupied_by(piece.color);
    let opp = board.occupied_by(!piece.color);
    let others = board.layer(piece) & !from.bit();

    let rivals: Vec<Square> = Bits(others)
        .filter(|&sq| mover.moves(sq, own, opp) & to.bit() != 0)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|sq| sq.file() == from.file());
    let shares_rank = rivals.iter().any(|sq| sq.rank() == from.rank());

    match (shares_file, shares_rank) {
        (false, _) => from.file_char().to_string(),
        (true, false) => from.rank_char().to_string(),
        (true, true) => from.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> BitBoard {
        BitBoard::from_fen(&fen.parse().unwrap())
    }

    #[test]
    fn test_resolve_pawn_push() {
        let mv = Move::resolve("e2e4", &BitBoard::start()).unwrap();
        assert_eq!(mv.piece, Piece::new(Color::White, Role::Pawn));
        assert!(!mv.capture);
        assert!(mv.en_passant.is_none());
        assert!(mv.promotion.is_none());
    }

    #[test]
    fn test_resolve_castling() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        assert_eq!(
            Move::resolve("e8c8", &b).unwrap().castling,
            Some(CastlingType::BlackLong)
        );
        assert_eq!(Move::resolve("e8f8", &b).unwrap().castling, None);
    }

    #[test]
    fn test_resolve_promotion() {
        let b = board("6r1/pkp2P2/1p1b4/6n1/8/1P6/PKP5/8 w - -");
        let mv = Move::resolve("f7g8r", &b).unwrap();
        assert!(mv.capture);
        assert_eq!(mv.promotion, Some(Piece::new(Color::White, Role::Rook)));

        assert_eq!(
            Move::resolve("f7f8x", &b),
            Err(NotationError::InvalidPromotion("f7f8x".into()))
        );
        assert_eq!(
            Move::resolve("b3b4q", &b),
            Err(NotationError::InvalidPromotion("b3b4q".into()))
        );
        assert_eq!(
            Move::resolve("b2b1q", &b),
            Err(NotationError::InvalidPromotion("b2b1q".into()))
        );
    }

    #[test]
    fn test_resolve_rejects_bad_tokens() {
        let b = BitBoard::start();
        assert!(matches!(Move::resolve("e2", &b), Err(NotationError::InvalidMove(_))));
        assert!(matches!(Move::resolve("e2e9", &b), Err(NotationError::InvalidMove(_))));
        assert!(matches!(Move::resolve("e2e4qq", &b), Err(NotationError::InvalidMove(_))));
        assert!(matches!(
            Move::resolve("e4e5", &b),
            Err(NotationError::EmptySquare { .. })
        ));
    }

    #[test]
    fn test_disambiguation_by_file() {
        let b = board("6k1/8/8/2n3n1/8/8/8/R4RK1 w - -");
        assert_eq!(Move::resolve("a1e1", &b).unwrap().disambiguation, "a");
        assert_eq!(Move::resolve("g5e4", &b).unwrap().disambiguation, "g");
        assert_eq!(Move::resolve("g5h3", &b).unwrap().disambiguation, "");
    }

    #[test]
    fn test_disambiguation_by_rank() {
        let b = board("8/8/6nr/8/8/8/6nr/1K4k1 b - -");
        assert_eq!(Move::resolve("h2h4", &b).unwrap().disambiguation, "2");
    }

    #[test]
    fn test_disambiguation_many_queens() {
        let b = board("Q3Q3/8/Q3Q1nr/8/Q3Q3/8/6nr/1K4k1 w - -");
        assert_eq!(Move::resolve("a6c6", &b).unwrap().disambiguation, "a6");
        assert_eq!(Move::resolve("e8c6", &b).unwrap().disambiguation, "e8");
    }

    #[test]
    fn test_blocked_rival_is_ignored() {
        // The h1 rook cannot reach e1 through the f1 bishop
        let b = board("4k3/8/8/8/8/8/8/R4B1R w - -");
        assert_eq!(Move::resolve("a1e1", &b).unwrap().disambiguation, "");
    }
}
