//! The input reader thread.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tessera_engine::SearchControl;
use tracing::{debug, warn};

use crate::command::{Command, parse_command};
use crate::queue::CommandQueue;

/// Read `input` line by line, queueing every parsed command.
///
/// `stop` and `quit` raise the stop bit before they are queued, so a running
/// search unwinds without waiting for the processor. `go` clears it first,
/// so a `stop` aimed at an earlier search does not cut the new one short.
/// End of input queues `quit`.
pub fn spawn_reader<R>(
    input: R,
    queue: Arc<CommandQueue>,
    control: Arc<SearchControl>,
) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("input".into())
        .spawn(move || read_commands(input, &queue, &control))
}

fn read_commands<R: BufRead>(input: R, queue: &CommandQueue, control: &SearchControl) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to read input");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(cmd = %trimmed, "received command");

        match parse_command(trimmed) {
            Ok(command) => {
                let quit = matches!(command, Command::Quit);
                match command {
                    Command::Go(_) => control.clear_stop(),
                    Command::Stop | Command::Quit => control.request_stop(),
                    _ => {}
                }
                queue.push(command);
                if quit {
                    return;
                }
            }
            Err(err) => warn!(error = %err, line = %trimmed, "ignoring malformed command"),
        }
    }
    debug!("input closed");
    queue.push(Command::Quit);
}
