pub mod calendar;
pub mod config;
pub mod graph;
pub mod serial;
pub mod server;
pub mod wol;

pub use calendar::{EventTimes, RoomAvailability, Verdict};
pub use config::Config;

pub use serial::{AckOutcome, AckReader, Channel};
