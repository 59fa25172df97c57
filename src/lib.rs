// Live player statistics and ranking for a multiplayer game server.
//
// The host runtime owns event delivery and presentation; this crate owns the
// concurrent stats cache, the scoring engine and synchronization with the
// PostgreSQL store. Feed `GameEvent`s into the channel consumed by
// `run_event_loop` and query the service for stat lines and leaderboards.

pub mod config;
pub mod event;
pub mod stats;

// Re-export commonly used types for hosts and integration tests
pub use config::{Config, ConfigError, DatabaseConfig};
pub use event::{run_event_loop, DeathEvent, GameEvent};
pub use stats::{
    compute_points, InMemoryStatsRepository, PlayerStats, PointTable, PostgresStatsRepository,
    RankTier, StatsCache, StatsError, StatsRepository, StatsService,
};
