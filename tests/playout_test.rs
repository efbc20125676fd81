//! Integration tests: random legal games played with shakmaty and mirrored on
//! our board, move by move.

mod common;

use chess_core::{BitBoard, Color, Fen, Move, Piece, Role};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shakmaty::{CastlingMode, Chess, Position};

const GAMES: u64 = 40;
const MAX_PLIES: usize = 200;

fn mover_color(pos: &Chess) -> Color {
    match pos.turn() {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

#[test]
fn test_random_games_match_shakmaty() {
    for seed in 0..GAMES {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pos = Chess::default();
        let mut board = BitBoard::start();

        for ply in 0..MAX_PLIES {
            let legals = pos.legal_moves();
            if legals.is_empty() {
                break;
            }
            let legal = legals.choose(&mut rng).unwrap().clone();
            let token = legal.to_uci(CastlingMode::Standard).to_string();
            let color = mover_color(&pos);

            let mv = Move::resolve(&token, &board)
                .unwrap_or_else(|e| panic!("seed {seed} ply {ply}: {token}: {e}"));
            assert_eq!(mv.capture, legal.is_capture(), "seed {seed} ply {ply}: {token}");
            assert_eq!(mv.castling.is_some(), legal.is_castle(), "seed {seed} ply {ply}: {token}");
            assert_eq!(mv.en_passant.is_some(), legal.is_en_passant(), "seed {seed} ply {ply}: {token}");

            board.apply(&mv).unwrap();
            pos.play_unchecked(legal);

            assert_eq!(board.board_fen(), pos.board().to_string(), "seed {seed} ply {ply}: {token}");
            assert_eq!(board.is_check(color), pos.is_check(), "seed {seed} ply {ply}: {token}");

            assert!(board.occupied().count_ones() <= 32);
            for color in [Color::White, Color::Black] {
                assert_eq!(board.layer(Piece::new(color, Role::King)).count_ones(), 1);
            }
        }
    }
}

#[test]
fn test_random_games_advance_fen() {
    for seed in 0..GAMES / 4 {
        let mut rng = StdRng::seed_from_u64(seed + 1000);
        let mut pos = Chess::default();
        let mut tokens = Vec::new();

        for _ in 0..60 {
            let legals = pos.legal_moves();
            if legals.is_empty() {
                break;
            }
            let legal = legals.choose(&mut rng).unwrap().clone();
            tokens.push(legal.to_uci(CastlingMode::Standard).to_string());
            pos.play_unchecked(legal);
        }

        let fen = Fen::start()
            .after_moves(tokens.iter().map(String::as_str))
            .unwrap();
        assert_eq!(fen.board(), pos.board().to_string(), "seed {seed}");
        assert_eq!(fen.white_to_move(), pos.turn() == shakmaty::Color::White);
        assert_eq!(fen.halfmove, pos.halfmoves());
        assert_eq!(fen.fullmove, pos.fullmoves().get());
    }
}

#[test]
fn test_layers_stay_disjoint() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pos = Chess::default();
    let mut board = BitBoard::start();

    for _ in 0..MAX_PLIES {
        let legals = pos.legal_moves();
        if legals.is_empty() {
            break;
        }
        let legal = legals.choose(&mut rng).unwrap().clone();
        let mv = Move::resolve(&legal.to_uci(CastlingMode::Standard).to_string(), &board).unwrap();
        board.apply(&mv).unwrap();
        pos.play_unchecked(legal);

        let total: u32 = (0..12).map(|i| board.layer(Piece::from_index(i)).count_ones()).sum();
        assert_eq!(total, board.occupied().count_ones());
    }
}
