pub mod cache;
pub mod models;
pub mod repository;
pub mod scoring;
pub mod service;

mod errors;

pub use cache::StatsCache;
pub use errors::StatsError;
pub use models::PlayerStats;
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use scoring::{compute_points, PointTable, RankTier};
pub use service::StatsService;
