use chess_core::{BitBoard, Fen};

/// Board for a position string; panics on malformed test input.
pub fn board(fen: &str) -> BitBoard {
    let fen: Fen = fen.parse().expect("invalid FEN");
    BitBoard::from_fen(&fen)
}

/// Render a line from `fen` the way the engine endpoint does.
pub fn render(fen: &str, line: &str) -> String {
    let parsed: Fen = fen.parse().expect("invalid FEN");
    chess_core::render_line(
        line,
        BitBoard::from_fen(&parsed),
        parsed.move_number(),
        parsed.white_to_move(),
    )
    .unwrap_or_else(|e| panic!("failed to render '{line}': {e}"))
}

