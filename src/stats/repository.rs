use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::PlayerStats;
use super::scoring::RankTier;
use super::StatsError;

/// Trait for durable player statistics storage.
///
/// A lookup that finds no row is `Ok(None)`, never an error.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Idempotently creates the backing table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), StatsError>;
    async fn load(&self, steam_id: u64) -> Result<Option<PlayerStats>, StatsError>;
    /// Single atomic insert-or-update keyed by steam id, overwriting every
    /// field. Never a separate existence check followed by a write.
    async fn upsert(&self, stats: &PlayerStats) -> Result<(), StatsError>;
    async fn top_players(&self, limit: i64) -> Result<Vec<PlayerStats>, StatsError>;
}

/// In-memory implementation of StatsRepository for development and testing
///
/// Data is stored in memory and lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    rows: Mutex<HashMap<u64, PlayerStats>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of stored rows
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn ensure_schema(&self) -> Result<(), StatsError> {
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, steam_id: u64) -> Result<Option<PlayerStats>, StatsError> {
        let rows = self.rows.lock().unwrap();
        let stats = rows.get(&steam_id).cloned();
        debug!(steam_id, found = stats.is_some(), "Loaded stats from memory");
        Ok(stats)
    }

    #[instrument(skip(self, stats))]
    async fn upsert(&self, stats: &PlayerStats) -> Result<(), StatsError> {
        debug!(steam_id = stats.steam_id, "Upserting stats in memory");
        self.rows
            .lock()
            .unwrap()
            .insert(stats.steam_id, stats.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn top_players(&self, limit: i64) -> Result<Vec<PlayerStats>, StatsError> {
        let mut players: Vec<PlayerStats> = self.rows.lock().unwrap().values().cloned().collect();
        players.sort_by(|a, b| b.points.cmp(&a.points));
        players.truncate(limit.max(0) as usize);
        Ok(players)
    }
}

/// PostgreSQL implementation of the stats repository.
///
/// The pool opens connections lazily on first use, reuses them across calls
/// and replaces stale connections transparently, so callers never see a
/// half-open connection.
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(e: sqlx::Error) -> StatsError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StatsError::Unavailable(e.to_string())
        }
        other => StatsError::Storage(other.to_string()),
    }
}

fn row_to_stats(row: &sqlx::postgres::PgRow) -> PlayerStats {
    PlayerStats {
        steam_id: row.get::<i64, _>("steam_id") as u64,
        name: row.get("name"),
        kills: row.get::<i32, _>("kills") as u32,
        deaths: row.get::<i32, _>("deaths") as u32,
        assists: row.get::<i32, _>("assists") as u32,
        flash_assists: row.get::<i32, _>("flash_assists") as u32,
        headshots: row.get::<i32, _>("headshots") as u32,
        no_scopes: row.get::<i32, _>("no_scopes") as u32,
        incendiary_kills: row.get::<i32, _>("incendiary_kills") as u32,
        he_kills: row.get::<i32, _>("he_kills") as u32,
        points: row.get("points"),
        rank: RankTier::from_repr(row.get::<i32, _>("rank")).unwrap_or(RankTier::Level1),
        last_connected: row.get("last_connected"),
        playtime_secs: row.get("playtime"),
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> Result<(), StatsError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS player_stats (
                steam_id BIGINT PRIMARY KEY,
                name VARCHAR(255),
                kills INT DEFAULT 0,
                deaths INT DEFAULT 0,
                assists INT DEFAULT 0,
                flash_assists INT DEFAULT 0,
                headshots INT DEFAULT 0,
                no_scopes INT DEFAULT 0,
                incendiary_kills INT DEFAULT 0,
                he_kills INT DEFAULT 0,
                points INT DEFAULT 0,
                rank INT DEFAULT 0,
                last_connected BIGINT DEFAULT EXTRACT(EPOCH FROM NOW()),
                playtime BIGINT DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create player_stats table");
            map_sqlx_error(e)
        })?;

        debug!("player_stats table created or already exists");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, steam_id: u64) -> Result<Option<PlayerStats>, StatsError> {
        debug!(steam_id, "Fetching stats from database");

        let row = sqlx::query(
            "SELECT steam_id, name, kills, deaths, assists, flash_assists, headshots, \
             no_scopes, incendiary_kills, he_kills, points, rank, last_connected, playtime \
             FROM player_stats WHERE steam_id = $1",
        )
        .bind(steam_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, steam_id, "Failed to fetch stats from database");
            map_sqlx_error(e)
        })?;

        Ok(row.as_ref().map(row_to_stats))
    }

    #[instrument(skip(self, stats))]
    async fn upsert(&self, stats: &PlayerStats) -> Result<(), StatsError> {
        debug!(steam_id = stats.steam_id, "Upserting stats in database");

        sqlx::query(
            "INSERT INTO player_stats (steam_id, name, kills, deaths, assists, flash_assists, \
             headshots, no_scopes, incendiary_kills, he_kills, points, rank, last_connected, playtime) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (steam_id) DO UPDATE SET \
                name = EXCLUDED.name, \
                kills = EXCLUDED.kills, \
                deaths = EXCLUDED.deaths, \
                assists = EXCLUDED.assists, \
                flash_assists = EXCLUDED.flash_assists, \
                headshots = EXCLUDED.headshots, \
                no_scopes = EXCLUDED.no_scopes, \
                incendiary_kills = EXCLUDED.incendiary_kills, \
                he_kills = EXCLUDED.he_kills, \
                points = EXCLUDED.points, \
                rank = EXCLUDED.rank, \
                last_connected = EXCLUDED.last_connected, \
                playtime = EXCLUDED.playtime",
        )
        .bind(stats.steam_id as i64)
        .bind(&stats.name)
        .bind(stats.kills as i32)
        .bind(stats.deaths as i32)
        .bind(stats.assists as i32)
        .bind(stats.flash_assists as i32)
        .bind(stats.headshots as i32)
        .bind(stats.no_scopes as i32)
        .bind(stats.incendiary_kills as i32)
        .bind(stats.he_kills as i32)
        .bind(stats.points)
        .bind(stats.rank.ordinal())
        .bind(stats.last_connected)
        .bind(stats.playtime_secs)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, steam_id = stats.steam_id, "Failed to upsert stats");
            map_sqlx_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn top_players(&self, limit: i64) -> Result<Vec<PlayerStats>, StatsError> {
        debug!(limit, "Fetching top players from database");

        let rows = sqlx::query(
            "SELECT steam_id, name, kills, deaths, assists, flash_assists, headshots, \
             no_scopes, incendiary_kills, he_kills, points, rank, last_connected, playtime \
             FROM player_stats ORDER BY points DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch top players");
            map_sqlx_error(e)
        })?;

        Ok(rows.iter().map(row_to_stats).collect())
    }
}
