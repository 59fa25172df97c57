use std::collections::HashMap;
use std::sync::Mutex;

use super::models::PlayerStats;

/// Concurrent map of live statistics for connected players.
///
/// The cache is the single authoritative in-memory copy while a player is
/// connected. All mutation goes through its atomic operations; none of them
/// touch storage or block on I/O. The mutex is held only for the duration of
/// the map operation itself.
#[derive(Debug, Default)]
pub struct StatsCache {
    players: Mutex<HashMap<u64, PlayerStats>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a point-in-time copy of one player's record.
    pub fn get(&self, steam_id: u64) -> Option<PlayerStats> {
        self.players.lock().unwrap().get(&steam_id).cloned()
    }

    pub fn contains(&self, steam_id: u64) -> bool {
        self.players.lock().unwrap().contains_key(&steam_id)
    }

    /// Inserts a fresh zero record if the id is absent; an existing entry
    /// wins and is returned untouched.
    pub fn get_or_create(&self, steam_id: u64, name: &str) -> PlayerStats {
        self.players
            .lock()
            .unwrap()
            .entry(steam_id)
            .or_insert_with(|| PlayerStats::new(steam_id, name))
            .clone()
    }

    /// Installs a record loaded from storage, replacing any existing entry.
    pub fn put(&self, stats: PlayerStats) {
        self.players.lock().unwrap().insert(stats.steam_id, stats);
    }

    /// Removes and returns a player's record, if cached.
    pub fn remove(&self, steam_id: u64) -> Option<PlayerStats> {
        self.players.lock().unwrap().remove(&steam_id)
    }

    /// Applies an in-place update to one player's record. An event for an
    /// untracked id is dropped silently; no entry is created.
    pub fn mutate<F>(&self, steam_id: u64, f: F)
    where
        F: FnOnce(&mut PlayerStats),
    {
        let mut players = self.players.lock().unwrap();
        if let Some(stats) = players.get_mut(&steam_id) {
            f(stats);
        }
    }

    /// Point-in-time snapshot of the top `limit` records by points,
    /// descending. The lock is held only while cloning the entries.
    pub fn top_by_points(&self, limit: usize) -> Vec<PlayerStats> {
        let mut snapshot: Vec<PlayerStats> =
            self.players.lock().unwrap().values().cloned().collect();
        snapshot.sort_by(|a, b| b.points.cmp(&a.points));
        snapshot.truncate(limit);
        snapshot
    }

    /// Accrues elapsed playtime into every cached record and returns clones
    /// of the updated records for flushing. Entries are not removed; players
    /// remain connected through a flush.
    pub fn sweep(&self, now: i64) -> Vec<PlayerStats> {
        let mut players = self.players.lock().unwrap();
        players
            .values_mut()
            .map(|stats| {
                stats.accrue_playtime(now);
                stats.clone()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn get_or_create_keeps_existing_entry() {
        let cache = StatsCache::new();
        cache.mutate(1, |s| s.kills += 1); // absent: dropped
        let first = cache.get_or_create(1, "alpha");
        assert_eq!(first.kills, 0);

        cache.mutate(1, |s| s.kills += 3);
        let again = cache.get_or_create(1, "renamed");
        assert_eq!(again.kills, 3);
        assert_eq!(again.name, "alpha");
    }

    #[test]
    fn mutate_on_absent_id_is_a_noop() {
        let cache = StatsCache::new();
        cache.mutate(99, |s| s.kills += 1);
        assert!(cache.get(99).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn remove_evicts_entry() {
        let cache = StatsCache::new();
        cache.get_or_create(7, "gone");
        let removed = cache.remove(7);
        assert!(removed.is_some());
        assert!(cache.get(7).is_none());
        assert!(cache.remove(7).is_none());
    }

    #[test]
    fn top_by_points_orders_descending_and_truncates() {
        let cache = StatsCache::new();
        for (id, points) in [(1u64, 50), (2, 300), (3, 120), (4, 10)] {
            cache.get_or_create(id, &format!("p{id}"));
            cache.mutate(id, |s| s.points = points);
        }

        let top = cache.top_by_points(3);
        let points: Vec<i32> = top.iter().map(|s| s.points).collect();
        assert_eq!(points, vec![300, 120, 50]);
    }

    #[test]
    fn sweep_accrues_playtime_without_evicting() {
        let cache = StatsCache::new();
        cache.get_or_create(1, "a");
        cache.get_or_create(2, "b");
        cache.mutate(1, |s| s.last_connected = 100);
        cache.mutate(2, |s| s.last_connected = 160);

        let flushed = cache.sweep(220);
        assert_eq!(flushed.len(), 2);
        assert_eq!(cache.len(), 2);

        let a = cache.get(1).unwrap();
        assert_eq!(a.playtime_secs, 120);
        assert_eq!(a.last_connected, 220);
        let b = cache.get(2).unwrap();
        assert_eq!(b.playtime_secs, 60);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_mutations_converge_without_lost_updates() {
        const PLAYERS: u64 = 1000;
        const ROUNDS: u32 = 10;

        let cache = Arc::new(StatsCache::new());
        for id in 1..=PLAYERS {
            cache.get_or_create(id, &format!("p{id}"));
        }

        let mut handles = Vec::new();
        for round in 0..ROUNDS {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for id in 1..=PLAYERS {
                    cache.mutate(id, |s| {
                        s.kills += 1;
                        if round % 2 == 0 {
                            s.deaths += 1;
                        }
                    });
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for id in 1..=PLAYERS {
            let stats = cache.get(id).unwrap();
            assert_eq!(stats.kills, ROUNDS);
            assert_eq!(stats.deaths, ROUNDS / 2);
        }
    }
}
