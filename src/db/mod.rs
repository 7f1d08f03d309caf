//! Local persistence layer (key/value JSON documents).

pub mod local;

pub use local::{FileStore, KeyValueStore, MemoryStore};

/// Storage keys as constants.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    /// Live workout session snapshot
    pub const LIVE_WORKOUT: &str = "liveWorkout";
}
