//! Game actor: an isolated Tokio task that owns one round.
//!
//! Each round runs in its own task, communicating with the outside world
//! through an mpsc channel. Commands are handled one at a time, so no two
//! requests ever see each other's intermediate state and no locks are
//! needed.

use sixletters_protocol::{
    Guesser, PlayerNumber, RosterEntry, ServerLine, WordSet,
};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomError, RoundState};

/// Default command channel size for game actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Channel sender for delivering lines to a player's connection handler.
///
/// Unbounded, so the actor never waits on a slow connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerLine>;

/// Commands sent to a game actor through its channel.
///
/// The `oneshot::Sender` in some variants is a "reply channel": the
/// caller sends a command and waits for the response on that channel.
pub(crate) enum GameCommand {
    /// Add a player, or reattach a disconnected one by name.
    Join {
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<PlayerNumber, RoomError>>,
    },

    /// Detach a player's connection. Their history stays.
    Quit { player: PlayerNumber },

    /// Guess a word.
    Attempt { player: PlayerNumber, word: String },

    /// Set or clear a player's give-up vote.
    SetGaveUp { player: PlayerNumber, gave_up: bool },

    /// Request a read-only projection of the round.
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
}

/// Who should receive a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recipient {
    /// Every connected player.
    All,
    /// One player, if connected.
    Player(PlayerNumber),
    /// Every connected player except this one.
    AllExcept(PlayerNumber),
}

/// A read-only view of a round, for the admin interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Words solved by a player.
    pub words_solved: usize,
    /// Every player in join order.
    pub players: Vec<RosterEntry>,
}

/// Handle to a running game actor. Used to send commands to it.
///
/// Cheap to clone. The actor stops once every handle is dropped.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    /// Joins the round as `name`.
    ///
    /// A new name gets the next player number. A name whose player is
    /// disconnected gets that player's number back. A name whose player is
    /// connected is rejected with [`RoomError::NameTaken`].
    ///
    /// On success the actor has already queued the catch-up lines on
    /// `sender`.
    pub async fn join(
        &self,
        name: &str,
        sender: PlayerSender,
    ) -> Result<PlayerNumber, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Join {
            name: name.to_string(),
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::GameUnavailable)?
    }

    /// Marks a player as disconnected (fire-and-forget).
    pub async fn quit(&self, player: PlayerNumber) -> Result<(), RoomError> {
        self.send(GameCommand::Quit { player }).await
    }

    /// Guesses a word (fire-and-forget).
    pub async fn attempt(
        &self,
        player: PlayerNumber,
        word: &str,
    ) -> Result<(), RoomError> {
        self.send(GameCommand::Attempt {
            player,
            word: word.to_string(),
        })
        .await
    }

    /// Sets or clears a player's give-up vote (fire-and-forget).
    pub async fn set_gave_up(
        &self,
        player: PlayerNumber,
        gave_up: bool,
    ) -> Result<(), RoomError> {
        self.send(GameCommand::SetGaveUp { player, gave_up }).await
    }

    /// Requests a snapshot of the round.
    ///
    /// Also useful as a barrier: every command sent before it has been
    /// fully handled by the time it returns.
    pub async fn snapshot(&self) -> Result<GameSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::GameUnavailable)
    }

    /// Returns `true` if the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, cmd: GameCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::GameUnavailable)
    }
}

struct Player {
    name: String,
    gave_up: bool,
    /// `None` while disconnected.
    sender: Option<PlayerSender>,
}

impl Player {
    fn is_connected(&self) -> bool {
        self.sender.is_some()
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor {
    state: RoundState,
    players: Vec<Player>,
    words: WordSet,
    receiver: mpsc::Receiver<GameCommand>,
}

impl GameActor {
    /// Runs the actor loop until every handle is dropped or a command
    /// breaks an invariant.
    async fn run(mut self) {
        tracing::info!(words = self.words.len(), "game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            let result = match cmd {
                GameCommand::Join {
                    name,
                    sender,
                    reply,
                } => {
                    let _ = reply.send(self.handle_join(name, sender));
                    Ok(())
                }
                GameCommand::Quit { player } => self.handle_quit(player),
                GameCommand::Attempt { player, word } => {
                    self.handle_attempt(player, &word)
                }
                GameCommand::SetGaveUp { player, gave_up } => {
                    self.handle_set_gave_up(player, gave_up)
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                    Ok(())
                }
            };

            if let Err(e) = result {
                tracing::error!(error = %e, "game actor stopping");
                break;
            }
        }

        tracing::info!("game actor stopped");
    }

    fn handle_join(
        &mut self,
        name: String,
        sender: PlayerSender,
    ) -> Result<PlayerNumber, RoomError> {
        let player = match self.players.iter().position(|p| p.name == name) {
            Some(index) => {
                let existing = &mut self.players[index];
                if existing.is_connected() {
                    tracing::debug!(%name, "join rejected, name in use");
                    return Err(RoomError::NameTaken(name));
                }
                existing.sender = Some(sender);
                PlayerNumber(index)
            }
            None => {
                self.players.push(Player {
                    name,
                    gave_up: false,
                    sender: Some(sender),
                });
                PlayerNumber(self.players.len() - 1)
            }
        };

        let name = self.players[player.0].name.clone();
        tracing::info!(%player, %name, "player joined");

        self.dispatch(Recipient::AllExcept(player), ServerLine::Join(name));
        for line in self.catch_up() {
            self.dispatch(Recipient::Player(player), line);
        }
        Ok(player)
    }

    fn handle_quit(&mut self, player: PlayerNumber) -> Result<(), RoomError> {
        let p = self.player_mut(player)?;
        if p.sender.take().is_none() {
            tracing::debug!(%player, "quit for a disconnected player");
            return Ok(());
        }
        let name = p.name.clone();
        tracing::info!(%player, %name, "player quit");

        self.dispatch(Recipient::AllExcept(player), ServerLine::Quit(name));
        self.check_all_gave_up();
        Ok(())
    }

    fn handle_attempt(
        &mut self,
        player: PlayerNumber,
        word: &str,
    ) -> Result<(), RoomError> {
        let name = self.player_mut(player)?.name.clone();
        if !self.words.solve(word, &name) {
            return Ok(());
        }
        tracing::debug!(%player, word, "word solved");

        self.dispatch(
            Recipient::AllExcept(player),
            ServerLine::Attempt {
                word: word.to_string(),
                guesser: name,
            },
        );
        Ok(())
    }

    fn handle_set_gave_up(
        &mut self,
        player: PlayerNumber,
        gave_up: bool,
    ) -> Result<(), RoomError> {
        let p = self.player_mut(player)?;
        p.gave_up = gave_up;
        let name = p.name.clone();

        let line = if gave_up {
            ServerLine::GiveUp(name)
        } else {
            ServerLine::UnGiveUp(name)
        };
        self.dispatch(Recipient::AllExcept(player), line);
        self.check_all_gave_up();
        Ok(())
    }

    /// Reveals the round if at least one player is connected and every
    /// connected player has given up. A round with nobody connected never
    /// reveals, no matter who gave up before leaving.
    fn check_all_gave_up(&mut self) {
        if !self.state.is_active() {
            return;
        }
        let mut connected =
            self.players.iter().filter(|p| p.is_connected()).peekable();
        if connected.peek().is_none() || !connected.all(|p| p.gave_up) {
            return;
        }

        self.dispatch(Recipient::All, ServerLine::AllGiveUp);
        let revealed = self.words.reveal();
        self.state = RoundState::Revealed;
        tracing::info!(revealed, "every player gave up, round revealed");
    }

    /// Lines a joining player needs to see the round as everyone else does.
    fn catch_up(&self) -> Vec<ServerLine> {
        let mut lines = vec![
            ServerLine::Roster(
                self.players
                    .iter()
                    .map(|p| RosterEntry {
                        name: p.name.clone(),
                        connected: p.is_connected(),
                    })
                    .collect(),
            ),
            ServerLine::Words(self.words.keys().map(str::to_string).collect()),
        ];

        lines.extend(self.words.iter().filter_map(|(word, guesser)| {
            (!matches!(guesser, Guesser::Unsolved)).then(|| {
                ServerLine::Attempt {
                    word: word.to_string(),
                    guesser: guesser.to_string(),
                }
            })
        }));

        lines.extend(
            self.players
                .iter()
                .filter(|p| p.gave_up)
                .map(|p| ServerLine::GiveUp(p.name.clone())),
        );
        lines
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            words_solved: self.words.solved_count(),
            players: self
                .players
                .iter()
                .map(|p| RosterEntry {
                    name: p.name.clone(),
                    connected: p.is_connected(),
                })
                .collect(),
        }
    }

    fn player_mut(
        &mut self,
        player: PlayerNumber,
    ) -> Result<&mut Player, RoomError> {
        self.players
            .get_mut(player.0)
            .ok_or(RoomError::UnknownPlayer(player))
    }

    /// Delivers a line to its recipients. Silently drops lines for
    /// players whose handler has gone away.
    fn dispatch(&self, recipient: Recipient, line: ServerLine) {
        let targets = self.players.iter().enumerate().filter(|(i, _)| {
            match recipient {
                Recipient::All => true,
                Recipient::Player(p) => p.0 == *i,
                Recipient::AllExcept(p) => p.0 != *i,
            }
        });
        for (_, player) in targets {
            if let Some(sender) = &player.sender {
                let _ = sender.send(line.clone());
            }
        }
    }
}

/// Spawns a game actor for a freshly hosted round and returns a handle.
///
/// The host becomes player 0, already connected through `host_sender`.
/// The host gets no catch-up; they wrote the word list.
pub fn spawn_game(
    host: &str,
    host_sender: PlayerSender,
    words: WordSet,
) -> GameHandle {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);

    let actor = GameActor {
        state: RoundState::Active,
        players: vec![Player {
            name: host.to_string(),
            gave_up: false,
            sender: Some(host_sender),
        }],
        words,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    GameHandle { sender: tx }
}
