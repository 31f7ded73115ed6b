//! A tiny counter game hosted in one async-mode room.
//!
//! Two in-process players send increments; the game broadcasts the new
//! total after each one and reports the count on every tick. Run with
//! `RUST_LOG=info cargo run -p counter-demo`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use gamehall_protocol::Packet;
use gamehall_room::{Game, Player, Room, RoomManager, RoomMode};
use gamehall_session::LocalSession;

const CMD_INCREMENT: u16 = 1;
const CMD_TOTAL: u16 = 2;

#[derive(Default)]
struct CounterGame {
    total: AtomicU64,
}

impl Game for CounterGame {
    type Custom = ();

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn on_tick(&self) -> bool {
        tracing::info!(total = self.total.load(Ordering::Relaxed), "tick");
        true
    }

    fn on_message(&self, player: &Arc<Player>, packet: Packet) {
        if packet.command != CMD_INCREMENT {
            tracing::warn!(command = packet.command, "unknown command, ignoring");
            return;
        }
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(player_id = player.id(), total, "incremented");
        player.send_packet(Packet::new(CMD_TOTAL, total.to_be_bytes().to_vec()));
    }

    fn on_join_room(&self, player: &Arc<Player>) {
        tracing::info!(player_id = player.id(), "joined");
    }

    fn on_leave_room(
        &self,
        player: &Arc<Player>,
        err: Option<gamehall_session::SessionError>,
    ) {
        tracing::info!(player_id = player.id(), error = ?err, "left");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let manager: RoomManager<CounterGame> = RoomManager::new();
    let room = manager.create_room(RoomMode::Async);
    tokio::spawn({
        let room = Arc::clone(&room);
        async move {
            if let Err(err) = room.run(Arc::new(CounterGame::default())).await {
                tracing::error!(error = %err, "room exited with error");
            }
        }
    });

    // Wait for the loop to come up before joining players.
    while room.state() != gamehall_room::RoomState::Running {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let (alice, mut alice_rx) = LocalSession::open();
    let (bob, _bob_rx) = LocalSession::open();
    room.add_player(Player::new(1, alice.clone())).await.unwrap();
    room.add_player(Player::new(2, bob.clone())).await.unwrap();

    for _ in 0..3 {
        alice.deliver(Packet::new(CMD_INCREMENT, ""));
        bob.deliver(Packet::new(CMD_INCREMENT, ""));
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    while let Ok(reply) = alice_rx.try_recv() {
        let mut total = [0u8; 8];
        total.copy_from_slice(&reply.body);
        tracing::info!(total = u64::from_be_bytes(total), "alice saw total");
    }

    manager.shutdown().await;
}
