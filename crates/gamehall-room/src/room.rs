//! The room: lifecycle, player registry, input ingress, and teardown.
//!
//! A room owns one queue, one set of players, and (while `run` is in
//! flight) one loop task. Producers (session read loops, the public
//! API, timers) enqueue envelopes from anywhere; only the loop mutates
//! the player map and calls into the game.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use gamehall_protocol::Packet;
use gamehall_session::{Session, SessionError, SessionHandler};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{oneshot, watch};

use crate::{Envelope, Game, MessageQueue, Player, RoomError, RoomMode, StackError, Waiter};

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room. Strictly monotonic:
///
/// ```text
/// Pending ──run()──▶ Running ──close()/panic/on_tick→false──▶ Closed
/// ```
///
/// There are no other transitions and no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    /// Constructed, loop not started.
    Pending,
    /// The loop is consuming the queue.
    Running,
    /// Terminal. The queue is closed and no new work is accepted.
    Closed,
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`Room`]. Mode defaults to [`RoomMode::Async`].
pub struct RoomBuilder {
    id: u64,
    token: String,
    mode: RoomMode,
    waiter: Option<Arc<dyn Waiter>>,
}

impl RoomBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            token: String::new(),
            mode: RoomMode::default(),
            waiter: None,
        }
    }

    /// Attaches an opaque token callers can use to gate joins.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Picks the loop discipline. Immutable for the room's life.
    pub fn mode(mut self, mode: RoomMode) -> Self {
        self.mode = mode;
        self
    }

    /// Registers the barrier the room reports its loop lifetime to.
    pub fn waiter(mut self, waiter: Arc<dyn Waiter>) -> Self {
        self.waiter = Some(waiter);
        self
    }

    pub fn build<G: Game>(self) -> Arc<Room<G>> {
        Arc::new(Room {
            id: self.id,
            token: self.token,
            mode: self.mode,
            state: RwLock::new(RoomState::Pending),
            players: RwLock::new(HashMap::new()),
            queue: MessageQueue::new(),
            closed_tx: watch::Sender::new(false),
            panic_slot: Mutex::new(None),
            waiter: self.waiter,
        })
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A session container hosting one game and its players.
pub struct Room<G: Game> {
    id: u64,
    token: String,
    mode: RoomMode,
    state: RwLock<RoomState>,
    /// Written only by the loop (admit/depart) and by panic teardown;
    /// read from anywhere.
    players: RwLock<HashMap<i64, Arc<Player>>>,
    pub(crate) queue: MessageQueue<Envelope<G>>,
    /// One-shot broadcast latch observable from outside; releases
    /// `add_player` callers blocked on admission when the room closes.
    closed_tx: watch::Sender<bool>,
    /// A ticker panic parks its error here for `run` to return.
    panic_slot: Mutex<Option<StackError>>,
    waiter: Option<Arc<dyn Waiter>>,
}

impl<G: Game> Room<G> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn mode(&self) -> RoomMode {
        self.mode
    }

    pub fn state(&self) -> RoomState {
        *self.state.read()
    }

    /// Whether the room has reached its terminal state.
    pub fn closed(&self) -> bool {
        self.state() == RoomState::Closed
    }

    // -- player registry reads ---------------------------------------------

    /// Looks up a player by id. Id 0 never matches.
    pub fn player(&self, player_id: i64) -> Option<Arc<Player>> {
        if player_id == 0 {
            return None;
        }
        self.players.read().get(&player_id).cloned()
    }

    /// A snapshot of all players.
    pub fn players(&self) -> Vec<Arc<Player>> {
        self.players.read().values().cloned().collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.read().len()
    }

    /// Visits players under the shared lock until `f` returns `false`.
    /// `f` must not call back into the room — the lock is held.
    pub fn for_each_player<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<Player>) -> bool,
    {
        for player in self.players.read().values() {
            if !f(player) {
                break;
            }
        }
    }

    // -- ingress ------------------------------------------------------------

    /// Requests admission for `player` and waits for the loop's verdict.
    ///
    /// Blocks until the loop admits (the player is then in the map and
    /// `on_join_room` has fired) or the room closes — closing releases
    /// every blocked caller with [`RoomError::RoomClosed`].
    pub async fn add_player(&self, player: Arc<Player>) -> Result<(), RoomError> {
        if player.id() == 0 {
            return Err(RoomError::InvalidPlayer);
        }
        if !player.connected() {
            return Err(RoomError::BadSession);
        }
        match self.state() {
            RoomState::Pending => return Err(RoomError::RoomNotRunning),
            RoomState::Closed => return Err(RoomError::RoomClosed),
            RoomState::Running => {}
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.queue.push(Envelope::PlayerIn {
            player,
            reply: reply_tx,
        });

        // If the envelope was dropped (queue closed under us) the sender
        // side is gone and the recv error maps to RoomClosed.
        tokio::select! {
            biased;
            reply = reply_rx => reply.unwrap_or(Err(RoomError::RoomClosed)),
            _ = self.wait_closed() => Err(RoomError::RoomClosed),
        }
    }

    /// Asks the loop to remove a player. Non-blocking; unknown ids are
    /// tolerated when the envelope is eventually processed.
    pub fn remove_player(&self, player_id: i64) {
        self.queue.push(Envelope::PlayerOut {
            player_id,
            error: None,
        });
    }

    /// Hands a custom value to the loop for [`Game::on_dequeue`].
    pub fn enqueue(&self, value: G::Custom) {
        self.queue.push(Envelope::Custom(value));
    }

    // -- direct session writes (no queue involvement) ------------------------

    /// Writes a packet to one player's session.
    pub fn send_packet(&self, player_id: i64, packet: Packet) -> Result<(), RoomError> {
        let player = self.player(player_id).ok_or(RoomError::PlayerNotExist)?;
        player.send_packet(packet);
        Ok(())
    }

    /// Writes a packet to every player. The registry lock is released
    /// before any session is touched.
    pub fn broadcast_packet(&self, packet: Packet) {
        for player in self.players() {
            player.send_packet(packet.clone());
        }
    }

    // -- lifecycle -----------------------------------------------------------

    /// Runs the game in this room until the room closes.
    ///
    /// Admits the `Pending → Running` transition, invokes
    /// `on_run_in_room`, then drives the mode's loop. Returns when the
    /// loop has fully exited — after `on_close_room`. A recovered panic
    /// is returned as [`RoomError::Panicked`].
    pub async fn run(self: &Arc<Self>, game: Arc<G>) -> Result<(), RoomError> {
        let interval = game.tick_interval();
        if self.mode == RoomMode::Frame && interval.is_zero() {
            // Reject before the state transition so a fixed game can
            // still be run in this room afterwards.
            return Err(RoomError::BadInterval);
        }
        {
            let mut state = self.state.write();
            match *state {
                RoomState::Closed => return Err(RoomError::RoomClosed),
                RoomState::Running => return Err(RoomError::RoomRunning),
                RoomState::Pending => *state = RoomState::Running,
            }
        }

        if let Some(waiter) = &self.waiter {
            waiter.add(1);
        }
        tracing::info!(room_id = self.id, mode = %self.mode, "room running");

        game.on_run_in_room(self);

        let driven = AssertUnwindSafe(self.drive(&game, interval))
            .catch_unwind()
            .await;

        let result = match driven {
            Ok(()) => {
                self.close();
                game.on_close_room(self);
                match self.panic_slot.lock().take() {
                    Some(stack) => Err(RoomError::Panicked(stack)),
                    None => Ok(()),
                }
            }
            Err(payload) => {
                let stack = StackError::from_panic(payload);
                tracing::error!(room_id = self.id, value = %stack.value(), "room loop panicked");
                game.on_panic(self, &stack);
                self.close_abrupt();
                self.teardown_players(game.as_ref());
                game.on_close_room(self);
                Err(RoomError::Panicked(stack))
            }
        };

        if let Some(waiter) = &self.waiter {
            waiter.done();
        }
        tracing::info!(room_id = self.id, "room stopped");
        result
    }

    /// Closes the room. Idempotent and callable from anywhere.
    ///
    /// Marks the state Closed, enqueues a departure for every current
    /// player so the loop can deliver their `on_leave_room`, closes the
    /// queue (the loop drains what is buffered, then exits), and flips
    /// the closed latch to release blocked `add_player` callers.
    pub fn close(&self) {
        if !self.transition_closed() {
            return;
        }
        tracing::info!(room_id = self.id, "room closing");

        let ids: Vec<i64> = self.players.read().keys().copied().collect();
        for player_id in ids {
            self.queue.push(Envelope::PlayerOut {
                player_id,
                error: None,
            });
        }
        self.queue.close();
        self.closed_tx.send_replace(true);
    }

    /// Panic-path close: no departures are enqueued because the loop
    /// that would drain them is gone. Teardown happens inline instead.
    fn close_abrupt(&self) {
        self.transition_closed();
        self.queue.close();
        self.closed_tx.send_replace(true);
    }

    fn transition_closed(&self) -> bool {
        let mut state = self.state.write();
        if *state == RoomState::Closed {
            return false;
        }
        *state = RoomState::Closed;
        true
    }

    /// Resolves once the room is closed.
    pub(crate) async fn wait_closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        if *rx.borrow_and_update() {
            return;
        }
        // The value only ever flips false → true, so one change is
        // conclusive. The sender cannot drop while `self` is alive.
        let _ = rx.changed().await;
    }

    /// Parks a ticker panic for `run` to pick up. First error wins.
    pub(crate) fn set_panic(&self, stack: StackError) {
        let mut slot = self.panic_slot.lock();
        if slot.is_none() {
            *slot = Some(stack);
        }
    }

    // -- loop-side dispatch --------------------------------------------------

    /// Applies one envelope. Only ever called from the loop task (or the
    /// panic teardown that replaces it).
    pub(crate) fn dispatch(self: &Arc<Self>, game: &G, envelope: Envelope<G>) {
        match envelope {
            Envelope::Message { player_id, packet } => {
                if self.closed() {
                    return;
                }
                // The player may have departed with packets still queued
                // behind them; those are dropped here.
                if let Some(player) = self.player(player_id) {
                    game.on_message(&player, packet);
                }
            }
            Envelope::PlayerIn { player, reply } => {
                let _ = reply.send(self.admit(game, player));
            }
            Envelope::PlayerOut { player_id, error } => {
                self.depart(game, player_id, error);
            }
            Envelope::Custom(value) => {
                if self.closed() {
                    return;
                }
                game.on_dequeue(value);
            }
            // Sync mode intercepts ticks before generic dispatch; the
            // other modes never enqueue them.
            Envelope::Tick => {}
        }
    }

    fn admit(self: &Arc<Self>, game: &G, player: Arc<Player>) -> Result<(), RoomError> {
        {
            // Hold the state lock across the insert: either close() sees
            // this player in its snapshot, or we see Closed here. A
            // player admitted concurrently with close must still get a
            // departure.
            let state = self.state.read();
            if *state == RoomState::Closed {
                return Err(RoomError::RoomClosed);
            }
            if self.players.read().contains_key(&player.id()) {
                return Err(RoomError::PlayerExists);
            }
            // The session can have died between add_player's check and now.
            let session = player.session().ok_or(RoomError::BadSession)?;
            if session.is_closed() {
                return Err(RoomError::BadSession);
            }

            session.set_id(player.id());
            session.update_handler(Some(Arc::clone(self) as Arc<dyn SessionHandler>));
            self.players.write().insert(player.id(), Arc::clone(&player));
        }

        tracing::debug!(room_id = self.id, player_id = player.id(), "player joined");
        game.on_join_room(&player);
        Ok(())
    }

    fn depart(&self, game: &G, player_id: i64, error: Option<SessionError>) {
        // Duplicate or late departures are a no-op.
        let Some(player) = self.players.write().remove(&player_id) else {
            return;
        };
        if let Some(session) = player.session() {
            session.update_handler(None);
        }
        player.close();

        tracing::debug!(room_id = self.id, player_id, "player left");
        game.on_leave_room(&player, error);
    }

    /// Panic-path teardown: pop each player under the write lock,
    /// release it, then close the session and notify the game — never
    /// holding the lock across a callback.
    fn teardown_players(&self, game: &G) {
        loop {
            let player = {
                let mut players = self.players.write();
                match players.keys().next().copied() {
                    Some(id) => players.remove(&id),
                    None => None,
                }
            };
            let Some(player) = player else { break };

            if let Some(session) = player.session() {
                session.update_handler(None);
            }
            player.close();
            game.on_leave_room(&player, None);
        }
    }
}

// ---------------------------------------------------------------------------
// Session handler: how the transport reaches the loop
// ---------------------------------------------------------------------------

impl<G: Game> SessionHandler for Room<G> {
    fn on_message(&self, session: &dyn Session, packet: Packet) {
        let player_id = session.id();
        if player_id == 0 {
            return;
        }
        self.queue.push(Envelope::Message { player_id, packet });
    }

    fn on_close(&self, session: &dyn Session, err: Option<SessionError>) {
        let player_id = session.id();
        // Break the room ↔ session cycle before the departure lands.
        session.update_handler(None);
        if player_id == 0 {
            return;
        }
        self.queue.push(Envelope::PlayerOut {
            player_id,
            error: err,
        });
    }
}
