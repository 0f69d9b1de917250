//! The command processor.
//!
//! Commands are executed one at a time, in arrival order; a `go` runs its
//! whole search on the processor thread. `stop` and `quit` reach a running
//! search through the abort flag, set by the input reader.

use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use tessera_control::{MAX_PLYMAX, MoveRequest, Report, Score, SearchController, TimeBudget};
use tessera_core::{Game, notation};
use tessera_engine::{AlphaBetaEngine, SearchControl, SearchEngine};

use crate::command::{Command, GoParams, UciOption};
use crate::error::UciError;
use crate::log::LogSink;
use crate::queue::CommandQueue;
use crate::reader::spawn_reader;
use crate::timer::Timer;

/// Configuration knobs adjustable via `setoption`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Plies to search every move; 0 selects adaptive depth.
    pub fixed_depth: u8,
    /// File the log goes to, stderr when `None`.
    pub log_file: Option<PathBuf>,
}

/// The protocol handler, holding the game and the search controller.
pub struct UciEngine<E = AlphaBetaEngine> {
    controller: SearchController<E>,
    game: Game,
    config: EngineConfig,
    log_sink: Option<LogSink>,
}

impl UciEngine {
    /// Create a new engine with the reference search and the starting
    /// position.
    pub fn new() -> Self {
        Self::with_engine(AlphaBetaEngine::new())
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SearchEngine> UciEngine<E> {
    /// Create a new engine driving `engine`.
    pub fn with_engine(engine: E) -> Self {
        info!(interface = engine.interface_version(), "search engine attached");
        Self {
            controller: SearchController::new(engine),
            game: Game::starting_position(),
            config: EngineConfig::default(),
            log_sink: None,
        }
    }

    /// Let `LogFileName` redirect `sink`.
    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Current option values.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run on stdin and stdout until `quit` or end of input.
    pub fn run(self) -> Result<(), UciError> {
        self.run_with(BufReader::new(io::stdin()), io::stdout())
    }

    /// Run on the given streams until `quit` or end of input.
    pub fn run_with<R, W>(mut self, input: R, mut out: W) -> Result<(), UciError>
    where
        R: io::BufRead + Send + 'static,
        W: Write,
    {
        let queue = Arc::new(CommandQueue::new());
        let control = Arc::new(SearchControl::new());
        let mut timer = Timer::spawn(Arc::clone(&control), Arc::clone(&queue))?;
        // Not joined: it may be blocked on input nobody will send.
        let _reader = spawn_reader(input, Arc::clone(&queue), Arc::clone(&control))?;

        while let Some(command) = queue.pop() {
            match command {
                Command::Uci => self.handle_uci(&mut out)?,
                Command::IsReady => writeln!(out, "readyok")?,
                Command::UciNewGame => self.handle_ucinewgame(),
                Command::Position(game) => self.handle_position(game),
                Command::Go(params) => self.handle_go(&params, &control, &mut timer, &mut out)?,
                Command::SetOption(option) => self.handle_setoption(option),
                Command::Stop => debug!("stop while idle"),
                Command::Timeout { generation } => {
                    debug!(generation, current = timer.generation(), "timeout while idle");
                }
                Command::Unknown(name) => warn!(command = %name, "unknown command"),
                Command::Quit => break,
            }
            out.flush()?;
        }

        timer.shutdown();
        queue.close();
        info!("tessera shutting down");
        Ok(())
    }

    fn handle_uci<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name tessera {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author the tessera developers")?;
        writeln!(
            out,
            "option name FixedDepth type spin default 0 min 0 max {MAX_PLYMAX}"
        )?;
        writeln!(out, "option name LogFileName type string default <empty>")?;
        writeln!(out, "uciok")
    }

    fn handle_ucinewgame(&mut self) {
        self.game = Game::starting_position();
        self.controller.reset();
        debug!("new game");
    }

    fn handle_position(&mut self, game: Game) {
        debug!(fen = %game.board(), plies = game.moves().len(), "position set");
        self.game = game;
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match option {
            UciOption::FixedDepth(depth) => {
                info!(depth, "fixed depth set");
                self.config.fixed_depth = depth;
            }
            UciOption::LogFileName(path) => {
                if let Some(sink) = &self.log_sink
                    && let Err(err) = sink.redirect(path.as_deref())
                {
                    warn!(error = %err, path = ?path, "cannot open log file");
                    return;
                }
                info!(path = ?path, "log destination set");
                self.config.log_file = path;
            }
        }
    }

    /// What the controller is asked for this move.
    fn move_request(&self, params: &GoParams) -> MoveRequest {
        let side = self.game.board().side_to_move();
        let configured = (!params.infinite).then_some(self.config.fixed_depth);
        let fixed_depth = params
            .depth
            .or(configured)
            .filter(|&depth| depth > 0)
            .map(|depth| depth.min(MAX_PLYMAX));
        let budget = match fixed_depth {
            Some(_) => TimeBudget::UNLIMITED,
            None => TimeBudget::from_clock(&params.clock(side)),
        };
        MoveRequest {
            fixed_depth,
            budget,
            infinite: params.infinite,
        }
    }

    fn handle_go<W: Write>(
        &mut self,
        params: &GoParams,
        control: &SearchControl,
        timer: &mut Timer,
        out: &mut W,
    ) -> io::Result<()> {
        let request = self.move_request(params);
        control.clear_timeout();
        debug!(?request, "search started");

        let mut written = Ok(());
        let verdict = self
            .controller
            .choose_move(&self.game, &request, control, timer, |report| {
                if written.is_ok() {
                    written = write_info(out, report);
                }
            });
        written?;

        let board = self.game.board();
        match verdict.best_move {
            Some(mv) => writeln!(out, "bestmove {}", notation::terse(board, mv)),
            None => writeln!(out, "bestmove 0000"),
        }
    }
}

/// Write one `info` line.
fn write_info<W: Write>(out: &mut W, report: &Report<'_>) -> io::Result<()> {
    let score = match report.score {
        Score::Centipawns(cp) => format!("cp {cp}"),
        Score::Mate(moves) => format!("mate {moves}"),
    };
    writeln!(
        out,
        "info depth {} score {} time {} nodes {} nps {} pv {}",
        report.depth,
        score,
        report.elapsed.as_millis(),
        report.nodes,
        report.nps(),
        report.terse_pv().join(" ")
    )?;
    out.flush()
}
