use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::scoring::{compute_points, PointTable, RankTier};

/// Live statistics record for one player, keyed by steam id.
///
/// `points` and `rank` are derived values: they are only ever written by
/// `recompute`, never mutated directly, so the record can always be rebuilt
/// from its raw counters and the point table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    pub steam_id: u64,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub flash_assists: u32,
    pub headshots: u32,
    pub no_scopes: u32,
    pub incendiary_kills: u32,
    pub he_kills: u32,
    pub points: i32,
    pub rank: RankTier,
    /// Epoch seconds of the last connect or the last flush.
    pub last_connected: i64,
    /// Cumulative playtime in seconds, only ever advances.
    pub playtime_secs: i64,
}

impl PlayerStats {
    /// Creates a fresh zero-valued record stamped with the current time.
    pub fn new(steam_id: u64, name: &str) -> Self {
        Self {
            steam_id,
            name: name.to_string(),
            kills: 0,
            deaths: 0,
            assists: 0,
            flash_assists: 0,
            headshots: 0,
            no_scopes: 0,
            incendiary_kills: 0,
            he_kills: 0,
            points: 0,
            rank: RankTier::Level1,
            last_connected: Utc::now().timestamp(),
            playtime_secs: 0,
        }
    }

    /// Re-derives points and rank from the raw counters.
    pub fn recompute(&mut self, table: &PointTable) {
        self.points = compute_points(self, table);
        self.rank = RankTier::from_points(self.points);
    }

    /// Folds the elapsed time since `last_connected` into cumulative playtime
    /// and restamps `last_connected` to `now`. A clock that appears to have
    /// gone backwards accrues nothing.
    pub fn accrue_playtime(&mut self, now: i64) {
        self.playtime_secs += (now - self.last_connected).max(0);
        self.last_connected = now;
    }

    /// Kill/death ratio with assists weighted at half a kill. With zero
    /// deaths the kill count itself is reported.
    pub fn kd_ratio(&self) -> f64 {
        if self.deaths > 0 {
            (self.kills as f64 + 0.5 * self.assists as f64) / self.deaths as f64
        } else {
            self.kills as f64
        }
    }
}
