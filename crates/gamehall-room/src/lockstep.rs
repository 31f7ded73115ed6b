//! Lockstep frame accumulation for deterministic simulations.
//!
//! Pairs with [`RoomMode::Frame`](crate::RoomMode::Frame): each tick is
//! one simulation frame, every player contributes at most one input per
//! frame, and the accumulated frames can be replayed to late joiners or
//! spectators.

use std::collections::HashMap;

use gamehall_protocol::FrameData;

/// One simulation frame: the inputs every player submitted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: u64,
    pub data: Vec<FrameData>,
}

impl Frame {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            data: Vec::new(),
        }
    }
}

/// Accumulates player inputs frame by frame.
///
/// Not synchronised: it lives inside a game and is only touched from
/// the room loop, like the rest of the game state.
#[derive(Debug, Default)]
pub struct FrameManager {
    frame_count: u64,
    frames: HashMap<u64, Frame>,
}

impl FrameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one player's input for the current frame.
    ///
    /// Inputs targeting any other frame are dropped — a client racing
    /// ahead or lagging behind does not corrupt the stream. A player's
    /// second submission for the same frame is also dropped.
    pub fn push(&mut self, frame_id: u64, data: FrameData) {
        if frame_id != self.frame_count {
            return;
        }

        let frame = self
            .frames
            .entry(self.frame_count)
            .or_insert_with(|| Frame::new(frame_id));

        if frame.data.iter().any(|d| d.player_id == data.player_id) {
            return;
        }
        frame.data.push(data);
    }

    /// Seals the current frame and advances to the next. Returns the new
    /// frame number.
    pub fn tick(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_count
    }

    /// The current frame number.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// A sealed or in-progress frame by number. Frames nobody submitted
    /// input for were never materialised and yield `None`.
    pub fn frame(&self, id: u64) -> Option<&Frame> {
        self.frames.get(&id)
    }

    /// Drops all history and restarts at frame 0.
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.frames.clear();
    }
}
