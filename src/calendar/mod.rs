pub mod availability;
pub mod event;

pub use availability::{RoomAvailability, Verdict, lookahead_horizon, resolve};
pub use event::{EventTimes, format_instant, parse_event_instant};
