use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, FromRepr};

use super::models::PlayerStats;

/// Point weights applied to each raw counter.
///
/// Bonus weights (headshot, no-scope, incendiary, HE) are additive on top of
/// the base kill credit and are not mutually exclusive: a single kill can
/// earn several bonuses at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointTable {
    pub kill_points: i32,
    pub headshot_points: i32,
    pub no_scope_points: i32,
    pub assist_points: i32,
    pub death_points: i32,
    pub he_points: i32,
    pub incendiary_points: i32,
}

impl Default for PointTable {
    fn default() -> Self {
        Self {
            kill_points: 2,
            headshot_points: 3,
            no_scope_points: 4,
            assist_points: 1,
            death_points: 1,
            he_points: 1,
            incendiary_points: 1,
        }
    }
}

/// Rank tier derived from points. Stored in the database as its ordinal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    FromRepr,
    EnumIter,
    Default,
)]
#[repr(i32)]
pub enum RankTier {
    #[default]
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
}

impl RankTier {
    /// Classifies points into a tier. Thresholds are strict less-than
    /// comparisons evaluated in ascending order.
    pub fn from_points(points: i32) -> Self {
        if points < 100 {
            RankTier::Level1
        } else if points < 1000 {
            RankTier::Level2
        } else if points < 2000 {
            RankTier::Level3
        } else if points < 3000 {
            RankTier::Level4
        } else {
            RankTier::Level5
        }
    }

    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Computes the points total from raw counters. Pure: never reads the cached
/// `points` field, so a record's score is always recomputable from its
/// counters alone.
pub fn compute_points(stats: &PlayerStats, table: &PointTable) -> i32 {
    stats.kills as i32 * table.kill_points
        + stats.headshots as i32 * table.headshot_points
        + stats.no_scopes as i32 * table.no_scope_points
        + stats.incendiary_kills as i32 * table.incendiary_points
        + stats.he_kills as i32 * table.he_points
        + stats.assists as i32 * table.assist_points
        - stats.deaths as i32 * table.death_points
}
