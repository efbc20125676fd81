//! Colors, roles and the twelve piece types.

use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Pawn,
        Role::Knight,
        Role::Bishop,
        Role::Rook,
        Role::Queen,
        Role::King,
    ];

    /// Letter used in algebraic notation; pawns have none.
    pub fn letter(self) -> &'static str {
        match self {
            Role::Pawn => "",
            Role::Knight => "N",
            Role::Bishop => "B",
            Role::Rook => "R",
            Role::Queen => "Q",
            Role::King => "K",
        }
    }

    /// Role for a UCI promotion suffix (`q`, `r`, `b`, `n`).
    pub fn from_promotion(c: char) -> Option<Role> {
        match c {
            'q' => Some(Role::Queen),
            'r' => Some(Role::Rook),
            'b' => Some(Role::Bishop),
            'n' => Some(Role::Knight),
            _ => None,
        }
    }
}

/// A piece type: shape and color. An empty square is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    pub const fn new(color: Color, role: Role) -> Piece {
        Piece { color, role }
    }

    /// Layer index 0..12: white pieces first, pawn to king.
    pub const fn index(self) -> usize {
        let offset = match self.color {
            Color::White => 0,
            Color::Black => 6,
        };
        offset + self.role as usize
    }

    pub fn from_index(index: usize) -> Piece {
        let color = if index < 6 { Color::White } else { Color::Black };
        Piece::new(color, Role::ALL[index % 6])
    }

    pub fn from_symbol(symbol: char) -> Option<Piece> {
        let role = match symbol.to_ascii_lowercase() {
            'p' => Role::Pawn,
            'n' => Role::Knight,
            'b' => Role::Bishop,
            'r' => Role::Rook,
            'q' => Role::Queen,
            'k' => Role::King,
            _ => return None,
        };
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, role))
    }

    /// FEN symbol, upper case for white.
    pub fn symbol(self) -> char {
        let c = match self.role {
            Role::Pawn => 'p',
            Role::Knight => 'n',
            Role::Bishop => 'b',
            Role::Rook => 'r',
            Role::Queen => 'q',
            Role::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for index in 0..12 {
            assert_eq!(Piece::from_index(index).index(), index);
        }
        assert_eq!(Piece::new(Color::Black, Role::King).index(), 11);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Piece::from_symbol('N'), Some(Piece::new(Color::White, Role::Knight)));
        assert_eq!(Piece::from_symbol('q'), Some(Piece::new(Color::Black, Role::Queen)));
        assert_eq!(Piece::from_symbol('x'), None);
        assert_eq!(Piece::new(Color::White, Role::Rook).symbol(), 'R');
        assert_eq!(Piece::new(Color::Black, Role::Pawn).symbol(), 'p');
    }
}
