//! Room manager: creates, tracks, and shuts down rooms.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;

use crate::{Game, Room, RoomBuilder, RoomMode, WaitGroup, Waiter};

/// Registry of the rooms a server is hosting, all reporting to one
/// shared [`WaitGroup`] so the process can wait for every loop to exit.
pub struct RoomManager<G: Game> {
    rooms: RwLock<HashMap<u64, Arc<Room<G>>>>,
    waiter: Arc<WaitGroup>,
}

impl<G: Game> RoomManager<G> {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            waiter: Arc::new(WaitGroup::new()),
        }
    }

    /// Creates and registers a room with a fresh random id.
    ///
    /// The caller still owns starting it: `tokio::spawn(room.run(game))`
    /// or awaiting `run` directly.
    pub fn create_room(&self, mode: RoomMode) -> Arc<Room<G>> {
        let mut rooms = self.rooms.write();
        let mut id: u64 = rand::rng().random();
        while id == 0 || rooms.contains_key(&id) {
            id = rand::rng().random();
        }

        let room = RoomBuilder::new(id)
            .mode(mode)
            .waiter(Arc::clone(&self.waiter) as Arc<dyn Waiter>)
            .build();
        rooms.insert(id, Arc::clone(&room));
        tracing::info!(room_id = id, %mode, "room created");
        room
    }

    /// Looks up a room by id.
    pub fn room(&self, room_id: u64) -> Option<Arc<Room<G>>> {
        self.rooms.read().get(&room_id).cloned()
    }

    /// Unregisters a room and closes it.
    pub fn remove_room(&self, room_id: u64) -> Option<Arc<Room<G>>> {
        let room = self.rooms.write().remove(&room_id);
        if let Some(room) = &room {
            room.close();
            tracing::info!(room_id, "room removed");
        }
        room
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// A snapshot of every registered room.
    pub fn rooms(&self) -> Vec<Arc<Room<G>>> {
        self.rooms.read().values().cloned().collect()
    }

    /// The barrier every managed room reports to.
    pub fn waiter(&self) -> &Arc<WaitGroup> {
        &self.waiter
    }

    /// Closes every room and waits until all their loops have exited.
    pub async fn shutdown(&self) {
        let rooms: Vec<_> = self.rooms.write().drain().map(|(_, room)| room).collect();
        for room in &rooms {
            room.close();
        }
        self.waiter.wait().await;
        tracing::info!("all rooms stopped");
    }
}

impl<G: Game> Default for RoomManager<G> {
    fn default() -> Self {
        Self::new()
    }
}
