use crate::{Db, Result};

use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

type HealthCheck<T> = Arc<dyn Fn(&T) -> Result<()> + Send + Sync>;
type Close<T> = Arc<dyn Fn(&T) -> Result<()> + Send + Sync>;

/// Open connections keyed by a hash of the configuration that opened them.
///
/// The cache is an ordinary value owned by the caller; nothing is global.
/// Entries expire `ttl` after they were opened, the least recently used
/// entry is closed when a new one would exceed `capacity`, and an entry that
/// fails its health check on lookup is closed and dropped.
pub struct ConnectionCache<T = Db> {
    entries: Mutex<HashMap<u64, Entry<T>>>,
    capacity: usize,
    ttl: Duration,
    health_check: Option<HealthCheck<T>>,
    close: Option<Close<T>>,
}

struct Entry<T> {
    conn: T,
    created_at: Instant,
    last_used: Instant,
}

impl<T: Clone> ConnectionCache<T> {
    pub const DEFAULT_CAPACITY: usize = 100;
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn new() -> ConnectionCache<T> {
        ConnectionCache {
            entries: Mutex::new(HashMap::new()),
            capacity: Self::DEFAULT_CAPACITY,
            ttl: Self::DEFAULT_TTL,
            health_check: None,
            close: None,
        }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Called on every lookup; an error evicts the entry.
    pub fn health_check(mut self, check: impl Fn(&T) -> Result<()> + Send + Sync + 'static) -> Self {
        self.health_check = Some(Arc::new(check));
        self
    }

    /// Called for every entry leaving the cache. Errors are logged.
    pub fn on_close(mut self, close: impl Fn(&T) -> Result<()> + Send + Sync + 'static) -> Self {
        self.close = Some(Arc::new(close));
        self
    }

    /// A live connection opened for `config`, if one is cached.
    pub fn get<K: Hash + ?Sized>(&self, config: &K) -> Option<T> {
        let key = key_of(config);

        let conn = {
            let mut entries = self.entries.lock();
            let entry = entries.get(&key)?;

            if entry.created_at.elapsed() >= self.ttl {
                let expired = entries.remove(&key);
                drop(entries);

                if let Some(entry) = expired {
                    tracing::debug!(key, "connection expired");
                    self.close_entry(&entry.conn);
                }
                return None;
            }

            entry.conn.clone()
        };

        if let Some(check) = &self.health_check {
            if let Err(err) = check(&conn) {
                tracing::warn!(key, error = %err, "cached connection failed health check");
                let removed = self.entries.lock().remove(&key);
                if let Some(entry) = removed {
                    self.close_entry(&entry.conn);
                }
                return None;
            }
        }

        if let Some(entry) = self.entries.lock().get_mut(&key) {
            entry.last_used = Instant::now();
        }

        Some(conn)
    }

    /// Caches `conn` for `config`, closing the least recently used entry
    /// first when the cache is full.
    pub fn insert<K: Hash + ?Sized>(&self, config: &K, conn: T) {
        let key = key_of(config);
        let now = Instant::now();

        let mut closed = vec![];
        {
            let mut entries = self.entries.lock();

            if let Some(previous) = entries.remove(&key) {
                closed.push(previous.conn);
            }

            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(key, _)| *key);

                if let Some((oldest, entry)) = oldest.and_then(|key| entries.remove_entry(&key)) {
                    tracing::debug!(key = oldest, "evicting least recently used connection");
                    closed.push(entry.conn);
                }
            }

            entries.insert(
                key,
                Entry {
                    conn,
                    created_at: now,
                    last_used: now,
                },
            );
        }

        for conn in &closed {
            self.close_entry(conn);
        }
    }

    /// Returns the cached connection for `config`, or opens one with `open`
    /// and caches it.
    pub fn get_or_open<K: Hash + ?Sized>(&self, config: &K, open: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(conn) = self.get(config) {
            return Ok(conn);
        }

        let conn = open()?;
        self.insert(config, conn.clone());
        Ok(conn)
    }

    /// Closes and drops every expired entry. Returns how many were dropped.
    pub fn evict_stale(&self) -> usize {
        let stale: Vec<Entry<T>> = {
            let mut entries = self.entries.lock();
            let keys: Vec<u64> = entries
                .iter()
                .filter(|(_, entry)| entry.created_at.elapsed() >= self.ttl)
                .map(|(key, _)| *key)
                .collect();
            keys.iter().filter_map(|key| entries.remove(key)).collect()
        };

        for entry in &stale {
            self.close_entry(&entry.conn);
        }

        stale.len()
    }

    /// Closes every entry. The first close error is returned; the rest are
    /// logged.
    pub fn clear(&self) -> Result<()> {
        let drained: Vec<Entry<T>> = self.entries.lock().drain().map(|(_, entry)| entry).collect();

        let mut first = None;
        for entry in &drained {
            if let Some(close) = &self.close {
                if let Err(err) = close(&entry.conn) {
                    tracing::warn!(error = %err, "closing cached connection failed");
                    first.get_or_insert(err);
                }
            }
        }

        first.map_or(Ok(()), Err)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn close_entry(&self, conn: &T) {
        if let Some(close) = &self.close {
            if let Err(err) = close(conn) {
                tracing::warn!(error = %err, "closing cached connection failed");
            }
        }
    }
}

impl ConnectionCache<Db> {
    /// A cache of database handles that pings each handle before reuse.
    pub fn for_databases() -> ConnectionCache<Db> {
        ConnectionCache::new().health_check(Db::ping)
    }

    /// The cached handle for `url`, connecting on a miss.
    pub fn connect(&self, url: &str) -> Result<Db> {
        self.get_or_open(url, || Db::connect(url))
    }
}

impl<T: Clone> Default for ConnectionCache<T> {
    fn default() -> Self {
        ConnectionCache::new()
    }
}

impl<T> fmt::Debug for ConnectionCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("len", &self.entries.lock().len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn key_of<K: Hash + ?Sized>(config: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.hash(&mut hasher);
    hasher.finish()
}
