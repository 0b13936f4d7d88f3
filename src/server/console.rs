//! Operator console: reads commands, `stop` shuts the server down.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::server::state::ServerControl;

pub const STOP_COMMAND: &str = "stop";

/// Reads whitespace-separated commands from `input` until `stop` is seen or
/// the input ends. End of input leaves the server running.
pub async fn run<R>(input: R, control: ServerControl) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        for command in line.split_whitespace() {
            if command == STOP_COMMAND {
                info!("Stopping server... please wait");
                control.stop();
                return Ok(());
            }
            warn!(command, "Unknown command");
        }
    }

    tracing::debug!("Console input closed");
    Ok(())
}
