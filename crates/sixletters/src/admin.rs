//! Admin listener: a line-oriented TCP interface for operators.
//!
//! Commands, one per line:
//! - `snapshots`: a count line, then `<solved> <code> <players...>` per round
//! - `phaseout`: stop advertising the server; exit once every round is gone

use std::fmt::Write as _;

use sixletters_room::{HubHandle, RoundSnapshot};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::SixlettersError;

/// Accepts admin clients until the task is aborted.
pub(crate) async fn run_admin(listener: TcpListener, hub: HubHandle) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tracing::debug!(%addr, "admin client connected");
                let hub = hub.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_admin_client(stream, hub).await {
                        tracing::debug!(error = %e, "admin client ended with error");
                    }
                });
            }
            Err(e) => tracing::error!(error = %e, "admin accept failed"),
        }
    }
}

async fn handle_admin_client(
    stream: TcpStream,
    hub: HubHandle,
) -> Result<(), SixlettersError> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim_end_matches('\r') {
            "snapshots" => {
                let snapshots = hub.snapshots().await?;
                write.write_all(render_snapshots(&snapshots).as_bytes()).await?;
            }
            "phaseout" => {
                tracing::info!("phase-out requested");
                hub.phase_out().await?;
            }
            other => tracing::debug!(command = other, "unknown admin command"),
        }
    }
    Ok(())
}

/// Renders the `snapshots` response. Disconnected players carry a
/// trailing `_`.
pub(crate) fn render_snapshots(snapshots: &[RoundSnapshot]) -> String {
    let mut out = format!("{}\n", snapshots.len());
    for snap in snapshots {
        let _ = write!(out, "{} {}", snap.game.words_solved, snap.code);
        for player in &snap.game.players {
            let _ = write!(out, " {player}");
        }
        out.push('\n');
    }
    out
}
