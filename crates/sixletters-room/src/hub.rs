//! Hub actor: the registry of live rounds.
//!
//! The hub hands out codes, counts how many connections hold each round,
//! and drops rounds that nobody has held for [`HubConfig::idle_timeout`].
//! Like the game actor it processes one command at a time, so arming and
//! disarming expiry timers can never interleave with a lookup.
//!
//! ## Entry lifecycle
//!
//! ```text
//! register() ──→ [refcount 1, timer disarmed]
//!                   │            ▲
//!        release()  │            │ lookup()
//!       (to zero)   ▼            │
//!              [refcount 0, timer armed] ──(idle_timeout)──→ removed
//! ```

use std::collections::HashMap;

use rand::Rng;
use sixletters_protocol::RoomCode;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;

use crate::{GameHandle, GameSnapshot, HubConfig, RoomError};

/// Length of the random part of a code.
const CODE_LEN: usize = 5;

/// Characters a code is drawn from.
const CODE_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub(crate) enum HubCommand {
    /// Register a new round under a fresh code.
    Register {
        game: GameHandle,
        reply: oneshot::Sender<RoomCode>,
    },

    /// Take a reference to a round.
    Lookup {
        code: RoomCode,
        reply: oneshot::Sender<Option<GameHandle>>,
    },

    /// Drop a reference taken by `Register` or `Lookup`.
    Release { code: RoomCode },

    /// An idle timer fired. `generation` identifies which arming it
    /// belongs to, so a fire that lost the race to a lookup is ignored.
    Expire { code: RoomCode, generation: u64 },

    /// Remove a round regardless of its references.
    Remove {
        code: RoomCode,
        reply: oneshot::Sender<bool>,
    },

    /// Request handles to every registered round.
    Rounds {
        reply: oneshot::Sender<Vec<(RoomCode, GameHandle)>>,
    },

    /// Stop advertising for new rounds.
    PhaseOut,
}

/// What the hub publishes about itself for health checks and shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HubStatus {
    /// Rounds currently registered.
    pub rounds: usize,
    /// Phase-out was requested; load balancers should route elsewhere.
    pub draining: bool,
    /// The registry emptied after holding a round, or phase-out was
    /// requested with nothing registered. Once set, it stays set; the
    /// process is expected to exit.
    pub drained: bool,
}

/// One round in a hub snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub code: RoomCode,
    pub game: GameSnapshot,
}

/// Handle to the running hub actor.
///
/// Cheap to clone. Every connection handler holds one.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
    status: watch::Receiver<HubStatus>,
}

impl HubHandle {
    /// Registers a round and returns its code.
    ///
    /// The caller holds the first reference and must
    /// [`release`](Self::release) it when done.
    pub async fn register(
        &self,
        game: GameHandle,
    ) -> Result<RoomCode, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Register {
            game,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::HubUnavailable)
    }

    /// Looks up a round and takes a reference to it.
    ///
    /// # Errors
    /// Returns [`RoomError::NotFound`] if no round has this code.
    pub async fn lookup(
        &self,
        code: &RoomCode,
    ) -> Result<GameHandle, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Lookup {
            code: code.clone(),
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::HubUnavailable)?
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Drops a reference (fire-and-forget).
    pub async fn release(&self, code: &RoomCode) -> Result<(), RoomError> {
        self.send(HubCommand::Release { code: code.clone() }).await
    }

    /// Removes a round immediately, whoever holds it.
    pub async fn remove(&self, code: &RoomCode) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Remove {
            code: code.clone(),
            reply: reply_tx,
        })
        .await?;
        if reply_rx.await.map_err(|_| RoomError::HubUnavailable)? {
            Ok(())
        } else {
            Err(RoomError::NotFound(code.clone()))
        }
    }

    /// Collects a snapshot of every round.
    ///
    /// The hub only hands out handles; the rounds are queried here, so
    /// the hub never waits on a game actor. Rounds that fail to respond
    /// are skipped.
    pub async fn snapshots(&self) -> Result<Vec<RoundSnapshot>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Rounds { reply: reply_tx }).await?;
        let rounds = reply_rx.await.map_err(|_| RoomError::HubUnavailable)?;

        let mut snapshots = Vec::with_capacity(rounds.len());
        for (code, game) in rounds {
            if let Ok(game) = game.snapshot().await {
                snapshots.push(RoundSnapshot { code, game });
            }
        }
        Ok(snapshots)
    }

    /// Starts draining: health checks report `drain` from now on.
    pub async fn phase_out(&self) -> Result<(), RoomError> {
        self.send(HubCommand::PhaseOut).await
    }

    /// Returns the latest published status.
    pub fn status(&self) -> HubStatus {
        *self.status.borrow()
    }

    /// Returns `true` once phase-out has been requested.
    pub fn is_draining(&self) -> bool {
        self.status.borrow().draining
    }

    /// Resolves once the hub reports itself drained, or has stopped.
    pub async fn drained(&self) {
        let mut status = self.status.clone();
        let _ = status.wait_for(|s| s.drained).await;
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::HubUnavailable)
    }
}

struct RoundEntry {
    game: GameHandle,
    refcount: usize,
    /// Armed exactly when `refcount` is 0.
    expiry: Option<AbortHandle>,
    generation: u64,
}

struct HubActor {
    config: HubConfig,
    rounds: HashMap<RoomCode, RoundEntry>,
    receiver: mpsc::Receiver<HubCommand>,
    /// For expiry timers to report back. Weak, so the hub still stops
    /// once every handle is dropped.
    timers: mpsc::WeakSender<HubCommand>,
    status: watch::Sender<HubStatus>,
    draining: bool,
    has_held_rounds: bool,
    next_generation: u64,
}

impl HubActor {
    async fn run(mut self) {
        tracing::info!(prefix = %self.config.prefix, "hub actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Register { game, reply } => {
                    let code = self.handle_register(game);
                    let _ = reply.send(code);
                }
                HubCommand::Lookup { code, reply } => {
                    let _ = reply.send(self.handle_lookup(&code));
                }
                HubCommand::Release { code } => self.handle_release(&code),
                HubCommand::Expire { code, generation } => {
                    self.handle_expire(&code, generation);
                }
                HubCommand::Remove { code, reply } => {
                    let _ = reply.send(self.handle_remove(&code));
                }
                HubCommand::Rounds { reply } => {
                    let rounds = self
                        .rounds
                        .iter()
                        .map(|(code, e)| (code.clone(), e.game.clone()))
                        .collect();
                    let _ = reply.send(rounds);
                }
                HubCommand::PhaseOut => {
                    tracing::info!(rounds = self.rounds.len(), "phasing out");
                    self.draining = true;
                    self.publish();
                }
            }
        }

        for entry in self.rounds.values_mut() {
            disarm(entry);
        }
        tracing::info!("hub actor stopped");
    }

    fn handle_register(&mut self, game: GameHandle) -> RoomCode {
        let code = loop {
            let code = generate_code(&self.config.prefix, &mut rand::rng());
            if !self.rounds.contains_key(&code) {
                break code;
            }
        };

        self.rounds.insert(
            code.clone(),
            RoundEntry {
                game,
                refcount: 1,
                expiry: None,
                generation: 0,
            },
        );
        self.has_held_rounds = true;
        tracing::info!(%code, rounds = self.rounds.len(), "round registered");
        self.publish();
        code
    }

    fn handle_lookup(&mut self, code: &RoomCode) -> Option<GameHandle> {
        let entry = self.rounds.get_mut(code)?;
        disarm(entry);
        entry.refcount += 1;
        tracing::debug!(%code, refcount = entry.refcount, "round looked up");
        Some(entry.game.clone())
    }

    fn handle_release(&mut self, code: &RoomCode) {
        let Some(entry) = self.rounds.get_mut(code) else {
            tracing::debug!(%code, "release for a round that is gone");
            return;
        };
        if entry.refcount == 0 {
            tracing::warn!(%code, "release without a matching reference");
            return;
        }
        entry.refcount -= 1;
        tracing::debug!(%code, refcount = entry.refcount, "round released");
        if entry.refcount == 0 {
            self.arm(code);
        }
    }

    fn handle_expire(&mut self, code: &RoomCode, generation: u64) {
        let live = self.rounds.get(code).is_some_and(|e| {
            e.refcount == 0 && e.generation == generation
        });
        if !live {
            tracing::debug!(%code, generation, "stale expiry ignored");
            return;
        }
        self.rounds.remove(code);
        tracing::info!(%code, rounds = self.rounds.len(), "round expired");
        self.publish();
    }

    fn handle_remove(&mut self, code: &RoomCode) -> bool {
        let Some(mut entry) = self.rounds.remove(code) else {
            return false;
        };
        disarm(&mut entry);
        tracing::info!(%code, rounds = self.rounds.len(), "round removed");
        self.publish();
        true
    }

    /// Starts a fresh idle timer for `code`.
    fn arm(&mut self, code: &RoomCode) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let Some(entry) = self.rounds.get_mut(code) else {
            return;
        };
        disarm(entry);

        let timers = self.timers.clone();
        let timeout = self.config.idle_timeout;
        let expired = code.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(hub) = timers.upgrade() {
                let _ = hub
                    .send(HubCommand::Expire {
                        code: expired,
                        generation,
                    })
                    .await;
            }
        });

        entry.expiry = Some(task.abort_handle());
        entry.generation = generation;
        tracing::debug!(%code, ?timeout, "idle timer armed");
    }

    fn publish(&self) {
        let rounds = self.rounds.len();
        let was_drained = self.status.borrow().drained;
        let drained = was_drained
            || (rounds == 0 && (self.has_held_rounds || self.draining));
        self.status.send_replace(HubStatus {
            rounds,
            draining: self.draining,
            drained,
        });
        if drained && !was_drained {
            tracing::info!("hub drained");
        }
    }
}

fn disarm(entry: &mut RoundEntry) {
    if let Some(timer) = entry.expiry.take() {
        timer.abort();
    }
}

/// Generates `prefix` followed by five random characters from `[0-9a-z]`.
pub(crate) fn generate_code(prefix: &str, rng: &mut impl Rng) -> RoomCode {
    let mut code = String::with_capacity(prefix.len() + CODE_LEN);
    code.push_str(prefix);
    for _ in 0..CODE_LEN {
        let i = rng.random_range(0..CODE_ALPHABET.len());
        code.push(char::from(CODE_ALPHABET[i]));
    }
    RoomCode(code)
}

/// Spawns the hub actor and returns a handle to it.
pub fn spawn_hub(config: HubConfig) -> HubHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let (status_tx, status_rx) = watch::channel(HubStatus::default());

    let actor = HubActor {
        config,
        rounds: HashMap::new(),
        receiver: rx,
        timers: tx.downgrade(),
        status: status_tx,
        draining: false,
        has_held_rounds: false,
        next_generation: 0,
    };

    tokio::spawn(actor.run());

    HubHandle {
        sender: tx,
        status: status_rx,
    }
}
