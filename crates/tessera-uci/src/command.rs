//! Command parsing.
//!
//! Keywords are matched case-insensitively; FEN strings, moves and option
//! values keep their case.

use std::path::PathBuf;
use std::time::Duration;

use tessera_control::{Clock, MAX_PLYMAX};
use tessera_core::{Color, Game};

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` uses defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until next time control.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<u8>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search until `stop` (no time limit).
    pub infinite: bool,
}

impl GoParams {
    /// The clock of `side`, the side to move.
    pub fn clock(&self, side: Color) -> Clock {
        let (remaining, increment) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        Clock {
            remaining,
            increment: increment.unwrap_or_default(),
            moves_to_go: self.movestogo,
            move_time: self.movetime,
            infinite: self.infinite,
        }
    }
}

/// A `setoption` the engine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOption {
    /// Search this many plies every move; 0 selects adaptive depth.
    FixedDepth(u8),
    /// Write the log to this file; `None` goes back to stderr.
    LogFileName(Option<PathBuf>),
}

/// A command for the processor.
#[derive(Debug, Clone)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- the next position starts a new game.
    UciNewGame,
    /// `position` -- the game record to search from.
    Position(Game),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// The timer armed as `generation` expired.
    Timeout {
        /// Arm count of the timer when it fired.
        generation: u64,
    },
    /// Unrecognized command.
    Unknown(String),
}

/// Parse a single line of input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match first.to_ascii_lowercase().as_str() {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        _ => Ok(Command::Unknown(first.to_string())),
    }
}

fn is_keyword(token: &str, keyword: &str) -> bool {
    token.eq_ignore_ascii_case(keyword)
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let Some(&kind) = tokens.first() else {
        return Err(UciError::MalformedPosition);
    };
    let moves_at = tokens
        .iter()
        .position(|t| is_keyword(t, "moves"))
        .unwrap_or(tokens.len());

    let mut game = if is_keyword(kind, "startpos") {
        Game::starting_position()
    } else if is_keyword(kind, "fen") {
        Game::from_fen(&tokens[1..moves_at].join(" "))?
    } else {
        return Err(UciError::MalformedPosition);
    };

    for text in tokens.iter().skip(moves_at + 1) {
        game.play_uci(text)?;
    }

    Ok(Command::Position(game))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime and
/// infinite. Unknown tokens are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i].to_ascii_lowercase().as_str() {
            "wtime" => params.wtime = Some(parse_millis(value, "wtime")?),
            "btime" => params.btime = Some(parse_millis(value, "btime")?),
            "winc" => params.winc = Some(parse_millis(value, "winc")?),
            "binc" => params.binc = Some(parse_millis(value, "binc")?),
            "movestogo" => params.movestogo = Some(parse_int(value, "movestogo")?),
            "depth" => {
                let depth: u32 = parse_int(value, "depth")?;
                params.depth = Some(depth.min(u32::from(MAX_PLYMAX)) as u8);
            }
            "movetime" => params.movetime = Some(parse_millis(value, "movetime")?),
            "infinite" => {
                params.infinite = true;
                i += 1;
                continue;
            }
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <name> [value <value>]`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    match tokens.first() {
        Some(t) if is_keyword(t, "name") => {}
        _ => return Err(UciError::MalformedOption),
    }
    let rest = &tokens[1..];
    let value_at = rest
        .iter()
        .position(|t| is_keyword(t, "value"))
        .unwrap_or(rest.len());
    let name = rest[..value_at].join(" ");
    let value = rest.get(value_at + 1..).unwrap_or_default().join(" ");

    if name.is_empty() {
        return Err(UciError::MalformedOption);
    }

    let option = match name.replace(' ', "").to_ascii_lowercase().as_str() {
        "fixeddepth" => {
            let depth = value
                .parse::<u8>()
                .ok()
                .filter(|&d| d <= MAX_PLYMAX)
                .ok_or_else(|| UciError::InvalidOptionValue {
                    name: name.clone(),
                    value: value.clone(),
                })?;
            UciOption::FixedDepth(depth)
        }
        "logfilename" => {
            if value.is_empty() || value == "<empty>" {
                UciOption::LogFileName(None)
            } else {
                UciOption::LogFileName(Some(PathBuf::from(value)))
            }
        }
        _ => return Err(UciError::UnknownOption { name }),
    };

    Ok(Command::SetOption(option))
}

/// Parse a millisecond value from a token.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    parse_int(token, param).map(Duration::from_millis)
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn go(line: &str) -> GoParams {
        match parse_command(line).unwrap() {
            Command::Go(params) => params,
            other => panic!("expected Go, got {other:?}"),
        }
    }

    fn position(line: &str) -> Game {
        match parse_command(line).unwrap() {
            Command::Position(game) => game,
            other => panic!("expected Position, got {other:?}"),
        }
    }

    fn option(line: &str) -> UciOption {
        match parse_command(line).unwrap() {
            Command::SetOption(option) => option,
            other => panic!("expected SetOption, got {other:?}"),
        }
    }

    #[test]
    fn parse_simple_commands() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("ucinewgame").unwrap(), Command::UciNewGame));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn keywords_ignore_case() {
        assert!(matches!(parse_command("ISREADY").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("Quit").unwrap(), Command::Quit));
        assert_eq!(go("GO Depth 4").depth, Some(4));
        assert_eq!(position("Position StartPos Moves E2E4").moves().len(), 1);
    }

    #[test]
    fn parse_position_startpos() {
        let game = position("position startpos");
        assert!(game.moves().is_empty());
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let game = position("position startpos moves e2e4 e7e5");
        assert_eq!(game.moves().len(), 2);
        assert_eq!(game.history().len(), 3);
    }

    #[test]
    fn parse_position_fen() {
        let game =
            position("position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        assert_eq!(game.board().side_to_move(), Color::Black);
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let game = position(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1 moves c7c5 g1f3",
        );
        assert_eq!(game.moves().len(), 2);
        assert_eq!(game.board().side_to_move(), Color::Black);
    }

    #[test]
    fn parse_position_castling_in_move_list() {
        let game = position("position startpos moves e2e4 e7e5 g1f3 b8c6 f1c4 g8f6 e1g1");
        assert_eq!(game.moves().len(), 7);
    }

    #[test]
    fn parse_position_missing_keyword() {
        assert!(matches!(
            parse_command("position"),
            Err(UciError::MalformedPosition)
        ));
        assert!(matches!(
            parse_command("position somewhere"),
            Err(UciError::MalformedPosition)
        ));
    }

    #[test]
    fn parse_position_invalid_fen() {
        assert!(matches!(
            parse_command("position fen invalid"),
            Err(UciError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn parse_position_illegal_move() {
        assert!(matches!(
            parse_command("position startpos moves e2e5"),
            Err(UciError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn parse_go_depth() {
        assert_eq!(go("go depth 6").depth, Some(6));
    }

    #[test]
    fn parse_go_deep_depth_is_clamped() {
        assert_eq!(go("go depth 300").depth, Some(MAX_PLYMAX));
        assert_eq!(go("go depth 21").depth, Some(MAX_PLYMAX));
    }

    #[test]
    fn parse_go_bare_defaults() {
        assert_eq!(go("go"), GoParams::default());
    }

    #[test]
    fn parse_go_wtime_btime_winc_binc() {
        let params = go("go wtime 300000 btime 300000 winc 2000 binc 2000");
        assert_eq!(params.wtime, Some(Duration::from_millis(300000)));
        assert_eq!(params.btime, Some(Duration::from_millis(300000)));
        assert_eq!(params.winc, Some(Duration::from_millis(2000)));
        assert_eq!(params.binc, Some(Duration::from_millis(2000)));
    }

    #[test]
    fn parse_go_movetime() {
        assert_eq!(go("go movetime 5000").movetime, Some(Duration::from_millis(5000)));
    }

    #[test]
    fn parse_go_infinite() {
        assert!(go("go infinite").infinite);
    }

    #[test]
    fn parse_go_movestogo() {
        assert_eq!(go("go wtime 60000 btime 60000 movestogo 20").movestogo, Some(20));
    }

    #[test]
    fn parse_go_skips_unknown_tokens() {
        let params = go("go ponder depth 3 nodes");
        assert_eq!(params.depth, Some(3));
    }

    #[test]
    fn parse_go_missing_wtime_value() {
        assert!(matches!(
            parse_command("go wtime"),
            Err(UciError::MissingGoValue { .. })
        ));
    }

    #[test]
    fn parse_go_invalid_depth_value() {
        assert!(matches!(
            parse_command("go depth abc"),
            Err(UciError::InvalidGoValue { .. })
        ));
    }

    #[test]
    fn clock_picks_the_side_to_move() {
        let params = go("go wtime 1000 btime 2000 winc 10 binc 20 movestogo 5");
        let clock = params.clock(Color::Black);
        assert_eq!(clock.remaining, Some(Duration::from_millis(2000)));
        assert_eq!(clock.increment, Duration::from_millis(20));
        assert_eq!(clock.moves_to_go, Some(5));
        assert!(!clock.infinite);
    }

    #[test]
    fn parse_fixed_depth_option() {
        assert_eq!(
            option("setoption name FixedDepth value 5"),
            UciOption::FixedDepth(5)
        );
        assert_eq!(
            option("SETOPTION NAME fixeddepth VALUE 0"),
            UciOption::FixedDepth(0)
        );
    }

    #[test]
    fn fixed_depth_out_of_range_is_rejected() {
        assert!(matches!(
            parse_command("setoption name FixedDepth value 21"),
            Err(UciError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            parse_command("setoption name FixedDepth value deep"),
            Err(UciError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn parse_log_file_option() {
        assert_eq!(
            option("setoption name LogFileName value /tmp/My Log.txt"),
            UciOption::LogFileName(Some(PathBuf::from("/tmp/My Log.txt")))
        );
        assert_eq!(
            option("setoption name LogFileName value"),
            UciOption::LogFileName(None)
        );
        assert_eq!(
            option("setoption name LogFileName value <empty>"),
            UciOption::LogFileName(None)
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(matches!(
            parse_command("setoption name Hash value 16"),
            Err(UciError::UnknownOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption value 16"),
            Err(UciError::MalformedOption)
        ));
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(parse_command("foobar").unwrap(), Command::Unknown(_)));
    }

    #[test]
    fn parse_empty_line() {
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
