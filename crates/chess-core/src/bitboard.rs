//! Bitboard position: one 64-bit layer per piece type.
//!
//! Bit `i` of a layer is square `i` (a1 = 0). Layers never overlap. Castling
//! rights and the en passant target ride along in a small side channel so a
//! board can be turned back into a FEN after moves are applied.

use crate::error::NotationError;
use crate::fen::Fen;
use crate::movegen::{self, king_mask, pawn_attacks};
use crate::moves::{CastlingType, Move};
use crate::piece::{Color, Piece, Role};
use crate::square::{Bits, Square};

const WHITE_SHORT: u8 = 1;
const WHITE_LONG: u8 = 2;
const BLACK_SHORT: u8 = 4;
const BLACK_LONG: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBoard {
    layers: [u64; 12],
    castling: u8,
    en_passant: Option<Square>,
}

impl BitBoard {
    pub fn from_fen(fen: &Fen) -> BitBoard {
        let mut layers = [0u64; 12];
        for index in 0..64 {
            if let Some(square) = Square::from_index(index) {
                if let Some(piece) = fen.piece_at(square) {
                    layers[piece.index()] |= square.bit();
                }
            }
        }

        let castling = fen.castling.chars().fold(0, |rights, c| {
            rights
                | match c {
                    'K' => WHITE_SHORT,
                    'Q' => WHITE_LONG,
                    'k' => BLACK_SHORT,
                    'q' => BLACK_LONG,
                    _ => 0,
                }
        });

        BitBoard {
            layers,
            castling,
            en_passant: fen.en_passant,
        }
    }

    pub fn start() -> BitBoard {
        BitBoard::from_fen(&Fen::start())
    }

    pub fn layer(&self, piece: Piece) -> u64 {
        self.layers[piece.index()]
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let bit = square.bit();
        self.layers
            .iter()
            .position(|layer| layer & bit != 0)
            .map(Piece::from_index)
    }

    /// Occupancy of any set of piece types.
    pub fn union(&self, pieces: &[Piece]) -> u64 {
        pieces.iter().fold(0, |acc, piece| acc | self.layer(*piece))
    }

    pub fn occupied(&self) -> u64 {
        self.layers.iter().fold(0, |acc, layer| acc | layer)
    }

    pub fn occupied_by(&self, color: Color) -> u64 {
        let pieces = Role::ALL.map(|role| Piece::new(color, role));
        self.union(&pieces)
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.occupied() & square.bit() != 0
    }

    /// Capture test for everything but pawns: the target is occupied.
    pub fn is_capture(&self, target: Square) -> bool {
        self.is_occupied(target)
    }

    /// Capture test for a pawn move. A diagonal step onto an empty square is
    /// en passant; the captured pawn stands on the target file, origin rank.
    pub fn pawn_capture(&self, from: Square, to: Square) -> (bool, Option<Square>) {
        if self.is_occupied(to) {
            (true, None)
        } else if from.file() == to.file() {
            (false, None)
        } else {
            (true, Some(Square::new(to.file(), from.rank())))
        }
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Apply a resolved move. Fails if the moving piece is not where the move
    /// says it is, which means the move was resolved against another board.
    pub fn apply(&mut self, mv: &Move) -> Result<(), NotationError> {
        self.expect_piece(mv.piece, mv.from)?;

        if let Some(castling) = mv.castling {
            return self.castle(castling, mv.piece.color);
        }

        let from = mv.from.bit();
        let to = mv.to.bit();

        self.revoke_castling(mv.from);
        self.revoke_castling(mv.to);

        self.clear_square(to);
        self.shift(mv.piece, from, to);

        if let Some(passed) = mv.en_passant {
            self.clear_square(passed.bit());
        }
        if let Some(promoted) = mv.promotion {
            self.clear_square(to);
            self.layers[promoted.index()] |= to;
        }

        let double_push = mv.piece.role == Role::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2;
        self.en_passant =
            double_push.then(|| Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2));

        Ok(())
    }

    fn castle(&mut self, castling: CastlingType, color: Color) -> Result<(), NotationError> {
        let king = Piece::new(color, Role::King);
        let rook = Piece::new(color, Role::Rook);
        let (king_from, king_to) = castling.king_squares();
        let (rook_from, rook_to) = castling.rook_squares();
        self.expect_piece(rook, rook_from)?;

        self.shift(king, king_from.bit(), king_to.bit());
        self.shift(rook, rook_from.bit(), rook_to.bit());

        self.castling &= match color {
            Color::White => !(WHITE_SHORT | WHITE_LONG),
            Color::Black => !(BLACK_SHORT | BLACK_LONG),
        };
        self.en_passant = None;
        Ok(())
    }

    fn expect_piece(&self, piece: Piece, square: Square) -> Result<(), NotationError> {
        if self.layer(piece) & square.bit() == 0 {
            return Err(NotationError::PieceNotOnSquare { piece, square });
        }
        Ok(())
    }

    fn clear_square(&mut self, bit: u64) {
        for layer in self.layers.iter_mut() {
            *layer &= !bit;
        }
    }

    fn shift(&mut self, piece: Piece, from: u64, to: u64) {
        let layer = &mut self.layers[piece.index()];
        *layer ^= from;
        *layer |= to;
    }

    /// A king or rook leaving its home square, or a rook captured there.
    fn revoke_castling(&mut self, square: Square) {
        let lost = match square {
            Square::E1 => WHITE_SHORT | WHITE_LONG,
            Square::H1 => WHITE_SHORT,
            Square::A1 => WHITE_LONG,
            Square::E8 => BLACK_SHORT | BLACK_LONG,
            Square::H8 => BLACK_SHORT,
            Square::A8 => BLACK_LONG,
            _ => 0,
        };
        self.castling &= !lost;
    }

    /// Every square attacked by `color`.
    pub fn attacks(&self, color: Color) -> u64 {
        let own = self.occupied_by(color);
        let opp = self.occupied_by(!color);

        Role::ALL.iter().fold(0, |acc, &role| {
            let layer = self.layer(Piece::new(color, role));
            let attacked = match (role, movegen::mover(role)) {
                (_, Some(mover)) => mover.attacks(layer, own, opp),
                (Role::Pawn, None) => Bits(layer).fold(0, |a, sq| a | pawn_attacks(color, sq)),
                (_, None) => Bits(layer).fold(0, |a, sq| a | king_mask(sq)),
            };
            acc | attacked
        })
    }

    /// Whether `attacker` gives check. A side without a king is never in check.
    pub fn is_check(&self, attacker: Color) -> bool {
        let king = self.layer(Piece::new(!attacker, Role::King));
        king != 0 && self.attacks(attacker) & king == king
    }

    /// Board field of a FEN.
    pub fn board_fen(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.symbol());
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

    /// Castling field of a FEN, empty when no rights remain.
    pub fn castling_fen(&self) -> String {
        [
            (WHITE_SHORT, 'K'),
            (WHITE_LONG, 'Q'),
            (BLACK_SHORT, 'k'),
            (BLACK_LONG, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.castling & flag != 0)
        .map(|(_, c)| *c)
        .collect()
    }
}
