//! The line-oriented command loop behind the shell binary.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::command::ShellCommand;
use crate::shell::PageShell;

/// Runs commands read from `input` until `quit`, or until input ends or
/// fails, writing their output to `output`. Controllers follow every phase
/// change in between. The shell is shut down on every exit path.
pub async fn run_session<R, W>(shell: &mut PageShell, input: R, output: &mut W)
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut snapshots = shell.subscribe();
    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(error) => {
                        warn!(%error, "cannot read input; shutting down");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match ShellCommand::parse(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => match shell.execute(command) {
                        Ok(Some(text)) => {
                            if let Err(error) = writeln!(output, "{text}") {
                                warn!(%error, "cannot write output; shutting down");
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(error) => warn!(%error, "command failed"),
                    },
                    Err(error) => warn!(%error, "cannot parse command"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = snapshots.borrow_and_update().phase;
                info!(%phase, "navigation updated");
                shell.sync_controllers();
            }
        }
    }

    shell.shutdown();
}
