use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use super::cache::StatsCache;
use super::models::PlayerStats;
use super::repository::StatsRepository;
use super::scoring::{PointTable, RankTier};
use crate::event::DeathEvent;

/// Bound on the final flush at shutdown; the process exits regardless.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Coordinates the live statistics cache with durable storage.
///
/// Hydrates the cache from storage on first contact, applies death-event
/// mutations, and flushes records back on round boundaries, disconnect and
/// shutdown. Storage failures degrade gracefully and never propagate to the
/// event-delivery thread.
pub struct StatsService {
    cache: Arc<StatsCache>,
    repository: Arc<dyn StatsRepository>,
    points: PointTable,
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository>, points: PointTable) -> Self {
        Self {
            cache: Arc::new(StatsCache::new()),
            repository,
            points,
        }
    }

    pub fn cache(&self) -> Arc<StatsCache> {
        self.cache.clone()
    }

    /// Creates the backing table if absent. Failure is logged; the service
    /// keeps running on the cache alone.
    pub async fn init_storage(&self) {
        if let Err(e) = self.repository.ensure_schema().await {
            error!(error = %e, "Failed to initialize stats storage");
        }
    }

    /// Hydrates a player's record on connect. A storage miss or a storage
    /// error both fall back to a fresh zero record; connect never fails.
    #[instrument(skip(self, name))]
    pub async fn handle_connect(&self, steam_id: u64, name: &str) {
        if steam_id == 0 {
            return;
        }
        if self.cache.contains(steam_id) {
            debug!(steam_id, "Player already cached");
            return;
        }

        match self.repository.load(steam_id).await {
            Ok(Some(mut stats)) => {
                stats.name = name.to_string();
                stats.last_connected = Utc::now().timestamp();
                self.cache.put(stats);
                debug!(steam_id, "Hydrated player stats from storage");
            }
            Ok(None) => {
                self.cache.get_or_create(steam_id, name);
                debug!(steam_id, "No stored stats, starting fresh");
            }
            Err(e) => {
                warn!(steam_id, error = %e, "Stats load failed, starting fresh");
                self.cache.get_or_create(steam_id, name);
            }
        }
    }

    /// Applies a death event to the attacker, victim and assister records.
    ///
    /// The three mutations are independent; an untracked or zero id drops
    /// its own mutation without affecting the others. Pure cache work, no
    /// I/O, safe to call from the event-delivery thread.
    pub fn handle_death(&self, event: &DeathEvent) {
        if !event.is_attributable() {
            return;
        }

        if event.attacker != 0 {
            self.cache.mutate(event.attacker, |stats| {
                stats.kills += 1;
                if event.headshot {
                    stats.headshots += 1;
                }
                if event.no_scope {
                    stats.no_scopes += 1;
                }
                if event.incendiary {
                    stats.incendiary_kills += 1;
                }
                if event.he {
                    stats.he_kills += 1;
                }
                stats.recompute(&self.points);
            });
        }

        if event.victim != 0 {
            self.cache.mutate(event.victim, |stats| {
                stats.deaths += 1;
                stats.recompute(&self.points);
            });
        }

        if event.assister != 0 {
            self.cache.mutate(event.assister, |stats| {
                stats.assists += 1;
                stats.recompute(&self.points);
            });
        }
    }

    /// Flushes every cached record to storage, accruing playtime first.
    /// Per-record failures are logged and skipped; the sweep continues and
    /// no entry is evicted.
    #[instrument(skip(self))]
    pub async fn flush_all(&self) {
        let records = self.cache.sweep(Utc::now().timestamp());
        if records.is_empty() {
            debug!("No cached stats to flush");
            return;
        }

        let mut flushed = 0usize;
        for stats in &records {
            match self.repository.upsert(stats).await {
                Ok(()) => flushed += 1,
                Err(e) => {
                    warn!(steam_id = stats.steam_id, error = %e, "Failed to flush player stats")
                }
            }
        }

        info!(flushed, total = records.len(), "Player stats flushed to storage");
    }

    /// Evicts a player's record and writes its final state. The record is
    /// dropped even if the write fails; the player is gone.
    #[instrument(skip(self))]
    pub async fn handle_disconnect(&self, steam_id: u64) {
        if steam_id == 0 {
            return;
        }
        let Some(mut stats) = self.cache.remove(steam_id) else {
            debug!(steam_id, "Disconnect for untracked player");
            return;
        };

        stats.accrue_playtime(Utc::now().timestamp());
        if let Err(e) = self.repository.upsert(&stats).await {
            warn!(steam_id, error = %e, "Failed to persist stats on disconnect");
        } else {
            debug!(steam_id, "Persisted final stats on disconnect");
        }
    }

    /// One best-effort full flush, bounded so shutdown never hangs.
    pub async fn shutdown(&self) {
        info!("Flushing player stats before shutdown");
        if timeout(SHUTDOWN_FLUSH_TIMEOUT, self.flush_all()).await.is_err() {
            warn!("Shutdown flush timed out, exiting with unflushed stats");
        }
    }

    /// Current stat line for one cached player, for the presentation layer.
    /// None means "no recorded stats yet".
    pub fn player_stats(&self, steam_id: u64) -> Option<PlayerStats> {
        let mut stats = self.cache.get(steam_id)?;
        stats.rank = RankTier::from_points(stats.points);
        Some(stats)
    }

    /// Top-N players by points from durable storage. Storage failure is
    /// logged and reported as an empty list.
    pub async fn leaderboard(&self, limit: i64) -> Vec<PlayerStats> {
        match self.repository.top_players(limit).await {
            Ok(players) => players,
            Err(e) => {
                warn!(error = %e, "Failed to fetch leaderboard");
                Vec::new()
            }
        }
    }
}
