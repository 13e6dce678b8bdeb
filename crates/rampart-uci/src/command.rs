//! UCI command parsing.

use std::time::Duration;

use rampart_core::{Board, Move, generate_legal};

use crate::error::UciError;

/// Parameters for the `go` command. All optional; a bare `go` searches
/// without limits.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    /// Moves until the next time control.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Stop once a mate in at most this many moves is found.
    pub mate: Option<u32>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search at most this many nodes.
    pub nodes: Option<u64>,
    /// Search until `stop`.
    pub infinite: bool,
    /// Search in pondering mode.
    pub ponder: bool,
}

/// A position plus the hashes of everything played before it, for
/// repetition detection during search.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    pub board: Board,
    /// Hashes of all positions strictly before `board`.
    pub history: Vec<u64>,
}

/// An engine option set via `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
    /// Number of search threads.
    Threads(usize),
    /// Number of principal variations to report.
    MultiPv(usize),
    /// Milliseconds reserved per move for GUI and transport latency.
    MoveOverhead(Duration),
    /// Whether the GUI may ask the engine to ponder.
    Ponder(bool),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    Uci,
    IsReady,
    UciNewGame,
    Position(PositionInfo),
    Go(GoParams),
    SetOption(UciOption),
    PonderHit,
    Stop,
    Quit,
    /// Unrecognized input, ignored per protocol.
    Unknown(String),
}

/// Find the legal move matching a UCI move string.
pub fn move_from_uci(board: &Board, uci: &str) -> Option<Move> {
    generate_legal(board)
        .iter()
        .copied()
        .find(|mv| mv.to_string() == uci)
}

/// Parse one line of UCI input.
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "ponderhit" => Ok(Command::PonderHit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// `position startpos|fen <fen> [moves ...]`. The moves are applied in
/// order and their positions recorded for repetition detection.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (mut board, rest) = match tokens.first() {
        Some(&"startpos") => (Board::starting_position(), &tokens[1..]),
        Some(&"fen") => {
            // A FEN is six space-separated fields.
            if tokens.len() < 7 {
                return Err(UciError::InvalidFen {
                    fen: tokens[1..].join(" "),
                });
            }
            let fen = tokens[1..7].join(" ");
            let board: Board = fen
                .parse()
                .map_err(|_| UciError::InvalidFen { fen: fen.clone() })?;
            (board, &tokens[7..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    let mut history = Vec::new();
    if rest.first() == Some(&"moves") {
        for uci in &rest[1..] {
            let mv = move_from_uci(&board, uci).ok_or_else(|| UciError::InvalidMove {
                uci_move: uci.to_string(),
            })?;
            history.push(board.hash());
            board = board.make_move(mv);
        }
    }

    Ok(Command::Position(PositionInfo { board, history }))
}

/// `go [wtime n] [btime n] ... [infinite] [ponder]`. Unknown tokens are
/// skipped per UCI convention.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "winc" => {
                params.winc = Some(parse_millis(tokens.get(i + 1), "winc")?);
                i += 2;
            }
            "binc" => {
                params.binc = Some(parse_millis(tokens.get(i + 1), "binc")?);
                i += 2;
            }
            "movestogo" => {
                params.movestogo = Some(parse_int(tokens.get(i + 1), "movestogo")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "mate" => {
                params.mate = Some(parse_int(tokens.get(i + 1), "mate")?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            "nodes" => {
                params.nodes = Some(parse_int(tokens.get(i + 1), "nodes")?);
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "ponder" => {
                params.ponder = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// `setoption name <name> [value <v>]`. Option names compare
/// case-insensitively per protocol.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::InvalidOption {
            reason: "missing name keyword".into(),
        });
    }
    let value_at = tokens.iter().position(|&t| t == "value");
    let name = tokens[1..value_at.unwrap_or(tokens.len())]
        .join(" ")
        .to_ascii_lowercase();
    let value = value_at.map(|i| tokens[i + 1..].join(" "));

    let require = |kind: &str| -> Result<String, UciError> {
        value.clone().ok_or_else(|| UciError::InvalidOption {
            reason: format!("{kind} option requires a value"),
        })
    };
    let numeric = |raw: String| -> Result<u64, UciError> {
        raw.parse().map_err(|_| UciError::InvalidOption {
            reason: format!("bad numeric value {raw} for {name}"),
        })
    };

    let option = match name.as_str() {
        "hash" => UciOption::Hash(numeric(require("spin")?)?.clamp(1, 65_536) as usize),
        "threads" => UciOption::Threads(numeric(require("spin")?)?.clamp(1, 256) as usize),
        "multipv" => UciOption::MultiPv(numeric(require("spin")?)?.clamp(1, 256) as usize),
        "move overhead" => {
            UciOption::MoveOverhead(Duration::from_millis(numeric(require("spin")?)?.min(5_000)))
        }
        "ponder" => UciOption::Ponder(require("check")? == "true"),
        _ => {
            return Err(UciError::InvalidOption {
                reason: format!("unknown option {name}"),
            });
        }
    };
    Ok(Command::SetOption(option))
}

fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    // Some GUIs report a negative clock when flagging; treat it as empty.
    let ms: i64 = value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
