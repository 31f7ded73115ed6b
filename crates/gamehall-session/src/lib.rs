//! Session boundary for Gamehall.
//!
//! A session is one player's live connection, whatever the transport
//! underneath. The room core consumes the [`Session`] trait and exposes
//! the [`SessionHandler`] trait; this crate defines both, plus
//! [`LocalSession`] — a channel-backed implementation used by tests,
//! demos, and bots that live in the server process.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)      ← installs itself as the SessionHandler
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below)  ← provides the Packet type
//! ```

mod error;
mod local;
mod session;

pub use error::SessionError;
pub use local::LocalSession;
pub use session::{Session, SessionHandler};
