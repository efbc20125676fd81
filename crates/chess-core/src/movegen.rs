//! Move masks for knights and sliding pieces.
//!
//! Each mover is a row in a small table: its one-step deltas, the mask of
//! squares it reaches on an empty board, and whether it slides. Pawn and king
//! moves are handled by the move resolver; only their attack squares live
//! here, for the check query.

use crate::piece::{Color, Role};
use crate::square::{Bits, Square};

pub const FILE_A: u64 = 0x0101_0101_0101_0101;
pub const RANK_1: u64 = 0xFF;

pub const FILES: [u64; 8] = [
    FILE_A,
    FILE_A << 1,
    FILE_A << 2,
    FILE_A << 3,
    FILE_A << 4,
    FILE_A << 5,
    FILE_A << 6,
    FILE_A << 7,
];

pub const RANKS: [u64; 8] = [
    RANK_1,
    RANK_1 << 8,
    RANK_1 << 16,
    RANK_1 << 24,
    RANK_1 << 32,
    RANK_1 << 40,
    RANK_1 << 48,
    RANK_1 << 56,
];

const N: i8 = 8;
const E: i8 = 1;
const S: i8 = -8;
const W: i8 = -1;

pub const DELTAS_ROOK: [i8; 4] = [N, E, S, W];
pub const DELTAS_BISHOP: [i8; 4] = [N + W, N + E, S + E, S + W];
pub const DELTAS_QUEEN: [i8; 8] = [N, E, S, W, N + W, N + E, S + E, S + W];
pub const DELTAS_KNIGHT: [i8; 8] = [
    2 * N + W,
    2 * N + E,
    2 * E + N,
    2 * E + S,
    2 * S + E,
    2 * S + W,
    2 * W + S,
    2 * W + N,
];

static KNIGHT_MASKS: [u64; 64] = leaper_masks(&DELTAS_KNIGHT, 2);
static KING_MASKS: [u64; 64] = leaper_masks(&DELTAS_QUEEN, 1);
static BISHOP_MASKS: [u64; 64] = bishop_masks();

/// Targets of single steps that stay on the board and move at most
/// `max_file_step` files sideways.
const fn leaper_masks(deltas: &[i8], max_file_step: i8) -> [u64; 64] {
    let mut masks = [0u64; 64];
    let mut sq = 0i8;
    while sq < 64 {
        let mut i = 0;
        while i < deltas.len() {
            let to = sq + deltas[i];
            let file_step = (sq % 8 - (to & 7)).abs();
            if to >= 0 && to < 64 && file_step <= max_file_step {
                masks[sq as usize] |= 1 << to;
            }
            i += 1;
        }
        sq += 1;
    }
    masks
}

/// Walk every diagonal until the board edge; a file jump of more than one
/// means the step wrapped around.
const fn bishop_masks() -> [u64; 64] {
    let mut masks = [0u64; 64];
    let mut sq = 0i8;
    while sq < 64 {
        let mut i = 0;
        while i < DELTAS_BISHOP.len() {
            let delta = DELTAS_BISHOP[i];
            let mut x = sq;
            loop {
                let next = x + delta;
                if next < 0 || next > 63 || (x % 8 - next % 8).abs() > 1 {
                    break;
                }
                masks[sq as usize] |= 1 << next;
                x = next;
            }
            i += 1;
        }
        sq += 1;
    }
    masks
}

pub fn knight_mask(square: Square) -> u64 {
    KNIGHT_MASKS[square.index() as usize]
}

pub fn rook_mask(square: Square) -> u64 {
    FILES[square.file() as usize] ^ RANKS[square.rank() as usize]
}

pub fn bishop_mask(square: Square) -> u64 {
    BISHOP_MASKS[square.index() as usize]
}

pub fn queen_mask(square: Square) -> u64 {
    rook_mask(square) | bishop_mask(square)
}

pub fn king_mask(square: Square) -> u64 {
    KING_MASKS[square.index() as usize]
}

/// Squares a pawn of `color` on `square` attacks.
pub fn pawn_attacks(color: Color, square: Square) -> u64 {
    let forward = match color {
        Color::White => square.rank() < 7,
        Color::Black => square.rank() > 0,
    };
    if !forward {
        return 0;
    }
    let rank = match color {
        Color::White => square.rank() + 1,
        Color::Black => square.rank() - 1,
    };
    let mut attacks = 0;
    if square.file() > 0 {
        attacks |= Square::new(square.file() - 1, rank).bit();
    }
    if square.file() < 7 {
        attacks |= Square::new(square.file() + 1, rank).bit();
    }
    attacks
}

pub struct Mover {
    pub role: Role,
    pub deltas: &'static [i8],
    pub mask: fn(Square) -> u64,
    pub sliding: bool,
}

pub static KNIGHT: Mover = Mover {
    role: Role::Knight,
    deltas: &DELTAS_KNIGHT,
    mask: knight_mask,
    sliding: false,
};

pub static BISHOP: Mover = Mover {
    role: Role::Bishop,
    deltas: &DELTAS_BISHOP,
    mask: bishop_mask,
    sliding: true,
};

pub static ROOK: Mover = Mover {
    role: Role::Rook,
    deltas: &DELTAS_ROOK,
    mask: rook_mask,
    sliding: true,
};

pub static QUEEN: Mover = Mover {
    role: Role::Queen,
    deltas: &DELTAS_QUEEN,
    mask: queen_mask,
    sliding: true,
};

/// Table lookup; pawns and kings have no generic mover.
pub fn mover(role: Role) -> Option<&'static Mover> {
    match role {
        Role::Knight => Some(&KNIGHT),
        Role::Bishop => Some(&BISHOP),
        Role::Rook => Some(&ROOK),
        Role::Queen => Some(&QUEEN),
        Role::Pawn | Role::King => None,
    }
}

impl Mover {
    /// Destinations from `from` given friendly (`own`) and enemy (`opp`)
    /// occupancy. Enemy squares are included, friendly squares are not.
    pub fn moves(&self, from: Square, own: u64, opp: u64) -> u64 {
        let mask = (self.mask)(from);
        if !self.sliding {
            return mask & !own;
        }

        let mut result = 0;
        for &delta in self.deltas {
            let mut x = from.index() as i8;
            loop {
                let next = x + delta;
                // a queen's diagonal can wrap onto a square of its own file mask
                if !(0..64).contains(&next) || (x % 8 - next % 8).abs() > 1 {
                    break;
                }
                x = next;
                let bit = 1u64 << x;
                if bit & mask == 0 || bit & own != 0 {
                    // edge of the board, or our own piece
                    break;
                }
                result |= bit;
                if bit & opp != 0 {
                    break;
                }
            }
        }
        result
    }

    /// Union of moves of every piece in `layer`.
    pub fn attacks(&self, layer: u64, own: u64, opp: u64) -> u64 {
        Bits(layer).fold(0, |acc, sq| acc | self.moves(sq, own, opp))
    }
}
