//! Engine analysis state and info-line parsing.
//!
//! The state watches commands sent to the engine to know which position is
//! being analysed, then turns `info ... seldepth ... score ... pv ...` lines
//! into `<score> - <line in algebraic notation>`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::bitboard::BitBoard;
use crate::error::NotationError;
use crate::fen::Fen;
use crate::notation::render_line;

static INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"seldepth (\d+).*?\bscore (\w+) (-?\d+).*?\bpv (.+)$")
        .expect("info line pattern is valid")
});

static DEPTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdepth (\d+)").expect("depth pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

impl Score {
    fn parse(kind: &str, value: i32) -> Result<Score, NotationError> {
        match kind {
            "cp" => Ok(Score::Centipawns(value)),
            "mate" => Ok(Score::Mate(value)),
            other => Err(NotationError::UnknownScore(other.to_string())),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{:.2}", f64::from(*cp) / 100.0),
            Score::Mate(n) => write!(f, "#{n}"),
        }
    }
}

/// Fields of one engine info line that carries a principal variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    /// Nominal search depth; absent when the engine only reports seldepth.
    pub depth: Option<u32>,
    pub seldepth: u32,
    pub score: Score,
    pub pv: Vec<String>,
}

impl InfoLine {
    /// `Ok(None)` when the line lacks the seldepth/score/pv shape.
    pub fn parse(line: &str) -> Result<Option<InfoLine>, NotationError> {
        let Some(caps) = INFO_RE.captures(line.trim_end()) else {
            return Ok(None);
        };
        let (Ok(seldepth), Ok(value)) = (caps[1].parse(), caps[3].parse()) else {
            return Ok(None);
        };
        let depth = DEPTH_RE
            .captures(line)
            .and_then(|d| d[1].parse().ok());
        let score = Score::parse(&caps[2], value)?;
        let pv = caps[4].split_whitespace().map(str::to_string).collect();
        Ok(Some(InfoLine {
            depth,
            seldepth,
            score,
            pv,
        }))
    }

    pub fn pv_line(&self) -> String {
        self.pv.join(" ")
    }
}

/// Position under analysis and whether a search is running.
#[derive(Debug, Clone)]
pub struct AnalysisState {
    pub fen: Fen,
    pub started: bool,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new(Fen::start())
    }
}

impl AnalysisState {
    pub fn new(fen: Fen) -> Self {
        Self {
            fen,
            started: false,
        }
    }

    /// Observe a command on its way to the engine.
    ///
    /// A malformed `position` command leaves the state untouched and is
    /// reported; the command itself still belongs to the engine.
    pub fn command(&mut self, cmd: &str) -> Result<(), NotationError> {
        let cmd = cmd.trim();
        if cmd.starts_with("go") {
            self.started = true;
            return Ok(());
        }

        let mut words = cmd.split_whitespace();
        match words.next() {
            Some("position") => {
                let rest: Vec<&str> = words.collect();
                self.fen = parse_position(&rest)?;
                self.started = false;
            }
            Some("ucinewgame") => {
                self.fen = Fen::start();
                self.started = false;
            }
            _ => {}
        }
        Ok(())
    }

    /// Translate a line coming from the engine. `None` means the line is
    /// not forwarded.
    pub fn engine_line(&self, line: &str) -> Result<Option<String>, NotationError> {
        if !self.started {
            return Ok(Some(line.to_string()));
        }
        if !line.contains("seldepth") {
            return Ok(None);
        }
        let Some(info) = InfoLine::parse(line)? else {
            return Ok(None);
        };

        let board = BitBoard::from_fen(&self.fen);
        let rendered = render_line(
            &info.pv_line(),
            board,
            self.fen.move_number(),
            self.fen.white_to_move(),
        )?;
        Ok(Some(format!("{} - {rendered}", info.score)))
    }
}

/// `startpos [moves ...]` or `fen <fields> [moves ...]`.
fn parse_position(args: &[&str]) -> Result<Fen, NotationError> {
    let split = args.iter().position(|&w| w == "moves");
    let (base, moves) = match split {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => (args, &args[args.len()..]),
    };

    let fen = match base.split_first() {
        Some((&"startpos", _)) => Fen::start(),
        Some((&"fen", fields)) => fields.join(" ").parse()?,
        _ => {
            return Err(NotationError::InvalidFen {
                fen: base.join(" "),
                reason: "expected 'startpos' or 'fen'".into(),
            })
        }
    };

    if moves.is_empty() {
        return Ok(fen);
    }
    fen.after_moves(moves.iter().copied())
}
