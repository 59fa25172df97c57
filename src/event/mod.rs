pub mod events;
pub mod listener;

pub use events::{DeathEvent, GameEvent};
pub use listener::run_event_loop;
