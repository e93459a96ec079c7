//! Per-connection handler: routing, round setup, and the command loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Decode the upgrade path into a [`Route`]
//!   2. Host: read the word list, spawn and register a round, send its code
//!      Join: look the round up, send `:ok`, read names until one is accepted
//!   3. Loop: receive commands → forward them to the round's actor
//!
//! Outbound lines never go through the handler's own task. The round's
//! actor pushes them onto an unbounded channel, and a writer task pumps
//! that channel into the connection.

use std::sync::Arc;

use sixletters_protocol::{
    ClientCommand, PlayerNumber, RoomCode, ServerLine, WordSet,
    decode_command, is_valid_name,
};
use sixletters_room::{
    GameHandle, HubHandle, PlayerSender, RoomError, spawn_game,
};
use sixletters_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::SixlettersError;
use crate::route::Route;

/// Drop guard that detaches a player from its round when the handler
/// exits.
///
/// Cleanup happens even if the handler panics. Since `Drop` is
/// synchronous, we spawn a fire-and-forget task for the async send.
struct PlayerGuard {
    player: PlayerNumber,
    game: GameHandle,
}

impl Drop for PlayerGuard {
    fn drop(&mut self) {
        let player = self.player;
        let game = self.game.clone();
        tokio::spawn(async move {
            let _ = game.quit(player).await;
        });
    }
}

/// Drop guard that gives back the handler's reference on a registered
/// round, so the hub can start its idle timer once nobody holds it.
struct RoundGuard {
    code: RoomCode,
    hub: HubHandle,
}

impl Drop for RoundGuard {
    fn drop(&mut self) {
        let code = self.code.clone();
        let hub = self.hub.clone();
        tokio::spawn(async move {
            let _ = hub.release(&code).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    hub: HubHandle,
) -> Result<(), SixlettersError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();

    let Some(route) = Route::parse(conn.path()) else {
        tracing::debug!(%conn_id, path = conn.path(), "unknown route");
        conn.close().await?;
        return Ok(());
    };
    tracing::debug!(%conn_id, ?route, "handling new connection");

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(pump_outbound(Arc::clone(&conn), rx));

    match route {
        Route::Host { name } => host_round(&conn, &hub, name, tx).await,
        Route::Join { code } => join_round(&conn, &hub, code, tx).await,
    }
}

/// Reads the host's word list, then registers and plays a new round.
async fn host_round(
    conn: &WebSocketConnection,
    hub: &HubHandle,
    name: String,
    tx: PlayerSender,
) -> Result<(), SixlettersError> {
    let Some(raw) = conn.recv().await? else {
        return Ok(());
    };
    let words = match WordSet::parse(&raw, &name) {
        Ok(words) => words,
        Err(e) => {
            tracing::warn!(host = %name, error = %e, "rejected word list");
            return Err(e.into());
        }
    };

    let game = spawn_game(&name, tx.clone(), words);
    let code = hub.register(game.clone()).await?;
    let _round = RoundGuard {
        code: code.clone(),
        hub: hub.clone(),
    };
    tracing::info!(%code, host = %name, "round hosted");

    // Nobody else knows the code yet, so this is the host's first line.
    let _ = tx.send(ServerLine::Code(code));
    drop(tx);

    play(conn, &game, PlayerNumber::HOST).await
}

/// Looks up a round, negotiates a name, then plays it.
async fn join_round(
    conn: &WebSocketConnection,
    hub: &HubHandle,
    code: RoomCode,
    tx: PlayerSender,
) -> Result<(), SixlettersError> {
    let game = match hub.lookup(&code).await {
        Ok(game) => game,
        Err(RoomError::NotFound(_)) => {
            tracing::debug!(%code, "join for unknown round");
            let _ = tx.send(ServerLine::NoExist);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let _round = RoundGuard {
        code: code.clone(),
        hub: hub.clone(),
    };
    let _ = tx.send(ServerLine::Ok);

    let player = loop {
        let Some(name) = conn.recv().await? else {
            return Ok(());
        };
        if !is_valid_name(&name) {
            let _ = tx.send(ServerLine::BadName);
            continue;
        }
        match game.join(&name, tx.clone()).await {
            Ok(player) => break player,
            Err(RoomError::NameTaken(_)) => {
                let _ = tx.send(ServerLine::Taken);
            }
            Err(e) => return Err(e.into()),
        }
    };
    drop(tx);

    tracing::debug!(%code, %player, "joined round");
    play(conn, &game, player).await
}

/// Forwards a joined player's commands to the round until the connection
/// ends. A close, a read error, or a binary frame all count as a quit.
async fn play(
    conn: &WebSocketConnection,
    game: &GameHandle,
    player: PlayerNumber,
) -> Result<(), SixlettersError> {
    let _player = PlayerGuard {
        player,
        game: game.clone(),
    };

    loop {
        let text = match conn.recv().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(%player, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "recv error");
                break;
            }
        };

        match decode_command(&text) {
            Some(ClientCommand::Attempt(word)) => {
                game.attempt(player, &word).await?;
            }
            Some(ClientCommand::GiveUp) => {
                game.set_gave_up(player, true).await?;
            }
            Some(ClientCommand::UnGiveUp) => {
                game.set_gave_up(player, false).await?;
            }
            None => tracing::trace!(%player, "ignoring unknown command"),
        }
    }

    // _player drops here → the round sees a quit.
    Ok(())
}

/// Writes every queued line to the connection, then closes it once all
/// senders are gone.
async fn pump_outbound(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerLine>,
) {
    while let Some(line) = rx.recv().await {
        if let Err(e) = conn.send(&line.to_string()).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
            return;
        }
    }
    let _ = conn.close().await;
}
