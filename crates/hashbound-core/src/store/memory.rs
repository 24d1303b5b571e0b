use crate::{
    script::Script,
    store::{HashStore, Reply, StoreError},
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

///
/// MemoryStore
///
/// In-memory reference backend. One `RwLock`-guarded record table;
/// expiry deadlines are checked lazily on access and dead records are
/// purged on the next write that touches their key.
///
/// Scripts are registered native handlers keyed by the script body's
/// digest and executed while holding the table's write lock, which
/// reproduces the store-side serialization guarantee of real script
/// evaluation (the store runs scripts one at a time).
///

pub struct MemoryStore {
    state: RwLock<StoreState>,
    clock: Clock,
}

#[derive(Default)]
struct StoreState {
    records: HashMap<String, Record>,
    scripts: HashMap<String, NativeScript>,
}

type NativeScript =
    Arc<dyn Fn(&mut ScriptCtx<'_>, &[String], &[String]) -> Result<Reply, String> + Send + Sync>;

///
/// Record
/// One hash plus its optional expiry deadline (unix millis).
///

#[derive(Clone, Debug, Default)]
struct Record {
    fields: BTreeMap<String, String>,
    expires_at: Option<u64>,
}

impl Record {
    const fn is_live(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(deadline) => deadline > now_ms,
            None => true,
        }
    }
}

///
/// Clock
///
/// System time by default; a manual millisecond counter for
/// deterministic expiry tests.
///

enum Clock {
    System,
    Manual(AtomicU64),
}

impl Clock {
    fn now_ms(&self) -> u64 {
        match self {
            Self::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            Self::Manual(ms) => ms.load(Ordering::SeqCst),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock: Clock::System,
        }
    }

    /// A store whose clock only moves via [`Self::advance`].
    #[must_use]
    pub fn with_manual_clock() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock: Clock::Manual(AtomicU64::new(0)),
        }
    }

    /// Advance the manual clock. Misuse on a system-clock store is a
    /// programming error.
    pub fn advance(&self, by: Duration) {
        match &self.clock {
            Clock::Manual(ms) => {
                let delta = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
                ms.fetch_add(delta, Ordering::SeqCst);
            }
            Clock::System => panic!("advance() requires a manual-clock store"),
        }
    }

    /// Register a native handler for a script, keyed by its digest.
    pub fn install_script<F>(&self, script: &Script, handler: F)
    where
        F: Fn(&mut ScriptCtx<'_>, &[String], &[String]) -> Result<Reply, String>
            + Send
            + Sync
            + 'static,
    {
        let mut state = self.state.write().expect("memory store lock poisoned");
        state
            .scripts
            .insert(script.digest().to_string(), Arc::new(handler));
    }

    fn read<R>(&self, f: impl FnOnce(&StoreState, u64) -> R) -> R {
        let now_ms = self.clock.now_ms();
        let state = self.state.read().expect("memory store lock poisoned");

        f(&state, now_ms)
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreState, u64) -> R) -> R {
        let now_ms = self.clock.now_ms();
        let mut state = self.state.write().expect("memory store lock poisoned");

        f(&mut state, now_ms)
    }
}

impl StoreState {
    fn live_record(&self, key: &str, now_ms: u64) -> Option<&Record> {
        self.records.get(key).filter(|r| r.is_live(now_ms))
    }

    /// Drop the record under `key` if its deadline has passed.
    fn purge_dead(&mut self, key: &str, now_ms: u64) {
        if let Some(record) = self.records.get(key)
            && !record.is_live(now_ms)
        {
            self.records.remove(key);
        }
    }
}

impl HashStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.read(|state, now| state.live_record(key, now).is_some()))
    }

    fn write_fields(&self, key: &str, entries: &[(String, String)]) -> Result<(), StoreError> {
        // An empty write must not create an empty hash; empty hashes
        // do not exist in the store's model.
        if entries.is_empty() {
            return Ok(());
        }

        self.write(|state, now| {
            state.purge_dead(key, now);
            let record = state.records.entry(key.to_string()).or_default();
            for (field, value) in entries {
                record.fields.insert(field.clone(), value.clone());
            }
        });

        Ok(())
    }

    fn read_all(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.read(|state, now| {
            state.live_record(key, now).map_or_else(Vec::new, |record| {
                record
                    .fields
                    .iter()
                    .map(|(f, v)| (f.clone(), v.clone()))
                    .collect()
            })
        }))
    }

    fn read_fields(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        Ok(self.read(|state, now| {
            let record = state.live_record(key, now);
            fields
                .iter()
                .map(|field| record.and_then(|r| r.fields.get(field).cloned()))
                .collect()
        }))
    }

    fn delete_fields(&self, key: &str, fields: &[String]) -> Result<u64, StoreError> {
        Ok(self.write(|state, now| {
            state.purge_dead(key, now);
            let Some(record) = state.records.get_mut(key) else {
                return 0;
            };

            let mut removed = 0;
            for field in fields {
                if record.fields.remove(field).is_some() {
                    removed += 1;
                }
            }
            // An emptied hash disappears, as it does in the real store.
            if record.fields.is_empty() {
                state.records.remove(key);
            }

            removed
        }))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.write(|state, now| {
            state.purge_dead(key, now);
            state.records.remove(key).is_some()
        }))
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        Ok(self.write(|state, now| {
            state.purge_dead(key, now);
            match state.records.get_mut(key) {
                Some(record) => {
                    let delta = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
                    record.expires_at = Some(now.saturating_add(delta));
                    true
                }
                None => false,
            }
        }))
    }

    fn eval(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<Reply, StoreError> {
        self.write(|state, now| {
            let handler = state
                .scripts
                .get(script.digest())
                .cloned()
                .ok_or_else(|| StoreError::ScriptNotFound {
                    digest: script.digest().to_string(),
                })?;

            let mut ctx = ScriptCtx {
                records: &mut state.records,
                now_ms: now,
            };

            handler(&mut ctx, keys, args).map_err(|message| StoreError::ScriptFailed { message })
        })
    }
}

///
/// ScriptCtx
///
/// Store view handed to native script handlers. All access happens under
/// the table's write lock, so a handler observes and mutates a frozen
/// store, exactly like a server-side script.
///

pub struct ScriptCtx<'a> {
    records: &'a mut HashMap<String, Record>,
    now_ms: u64,
}

impl ScriptCtx<'_> {
    /// Number of fields in the hash at `key` (0 when absent).
    #[must_use]
    pub fn field_count(&self, key: &str) -> u64 {
        self.records
            .get(key)
            .filter(|r| r.is_live(self.now_ms))
            .map_or(0, |r| r.fields.len() as u64)
    }

    /// All fields of the hash at `key`.
    #[must_use]
    pub fn read_all(&self, key: &str) -> Vec<(String, String)> {
        self.records
            .get(key)
            .filter(|r| r.is_live(self.now_ms))
            .map_or_else(Vec::new, |r| {
                r.fields.iter().map(|(f, v)| (f.clone(), v.clone())).collect()
            })
    }

    /// Upsert fields into the hash at `key`. An empty entry slice is a
    /// no-op; it never materializes an empty hash.
    pub fn write_fields(&mut self, key: &str, entries: &[(String, String)]) {
        if entries.is_empty() {
            return;
        }

        let now = self.now_ms;
        if let Some(record) = self.records.get(key)
            && !record.is_live(now)
        {
            self.records.remove(key);
        }

        let record = self.records.entry(key.to_string()).or_default();
        for (field, value) in entries {
            record.fields.insert(field.clone(), value.clone());
        }
    }

    /// Delete the hash at `key`; returns how many fields it held.
    pub fn delete(&mut self, key: &str) -> u64 {
        let live = self
            .records
            .get(key)
            .is_some_and(|r| r.is_live(self.now_ms));

        match self.records.remove(key) {
            Some(record) if live => record.fields.len() as u64,
            _ => 0,
        }
    }

    /// Delete selected fields of the hash at `key`.
    pub fn delete_fields(&mut self, key: &str, fields: &[String]) -> u64 {
        let now = self.now_ms;
        let Some(record) = self.records.get_mut(key).filter(|r| r.is_live(now)) else {
            return 0;
        };

        let mut removed = 0;
        for field in fields {
            if record.fields.remove(field).is_some() {
                removed += 1;
            }
        }
        if record.fields.is_empty() {
            self.records.remove(key);
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptModel;

    fn entries(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(f, v)| ((*f).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn write_then_read_all_returns_every_field() {
        let store = MemoryStore::new();
        store
            .write_fields("h:1", &entries(&[("a", "1"), ("b", "2")]))
            .unwrap();

        let mut fields = store.read_all("h:1").unwrap();
        fields.sort();

        assert_eq!(fields, entries(&[("a", "1"), ("b", "2")]));
        assert!(store.exists("h:1").unwrap());
    }

    #[test]
    fn absent_key_reads_empty_everywhere() {
        let store = MemoryStore::new();

        assert!(!store.exists("h:none").unwrap());
        assert!(store.read_all("h:none").unwrap().is_empty());
        assert_eq!(
            store
                .read_fields("h:none", &["a".to_string()])
                .unwrap(),
            vec![None]
        );
        assert_eq!(store.delete_fields("h:none", &["a".to_string()]).unwrap(), 0);
        assert!(!store.delete("h:none").unwrap());
    }

    #[test]
    fn read_fields_is_position_aligned() {
        let store = MemoryStore::new();
        store
            .write_fields("h:1", &entries(&[("a", "1"), ("c", "3")]))
            .unwrap();

        let got = store
            .read_fields(
                "h:1",
                &["a".to_string(), "b".to_string(), "c".to_string()],
            )
            .unwrap();

        assert_eq!(
            got,
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn empty_write_never_creates_a_record() {
        let store = MemoryStore::new();
        store.write_fields("h:empty", &[]).unwrap();

        assert!(!store.exists("h:empty").unwrap());
        assert!(store.read_all("h:empty").unwrap().is_empty());
    }

    #[test]
    fn deleting_last_field_drops_the_record() {
        let store = MemoryStore::new();
        store.write_fields("h:1", &entries(&[("a", "1")])).unwrap();

        assert_eq!(store.delete_fields("h:1", &["a".to_string()]).unwrap(), 1);
        assert!(!store.exists("h:1").unwrap());
    }

    #[test]
    fn expired_records_vanish_on_every_surface() {
        let store = MemoryStore::with_manual_clock();
        store.write_fields("h:1", &entries(&[("a", "1")])).unwrap();
        assert!(store.expire("h:1", Duration::from_secs(10)).unwrap());

        store.advance(Duration::from_secs(9));
        assert!(store.exists("h:1").unwrap());

        store.advance(Duration::from_secs(2));
        assert!(!store.exists("h:1").unwrap());
        assert!(store.read_all("h:1").unwrap().is_empty());
        assert!(!store.delete("h:1").unwrap());
    }

    #[test]
    fn expire_on_absent_key_returns_false() {
        let store = MemoryStore::with_manual_clock();

        assert!(!store.expire("h:none", Duration::from_secs(1)).unwrap());
    }

    #[test]
    fn rewriting_an_expired_record_starts_fresh() {
        let store = MemoryStore::with_manual_clock();
        store
            .write_fields("h:1", &entries(&[("old", "x")]))
            .unwrap();
        store.expire("h:1", Duration::from_secs(1)).unwrap();
        store.advance(Duration::from_secs(2));

        store
            .write_fields("h:1", &entries(&[("new", "y")]))
            .unwrap();

        assert_eq!(store.read_all("h:1").unwrap(), entries(&[("new", "y")]));
    }

    #[test]
    fn unregistered_script_is_reported() {
        let store = MemoryStore::new();
        let script = Script::new(ScriptModel {
            name: "missing",
            body: "return 0",
            key_arity: 1,
        });

        assert!(matches!(
            store.eval(&script, &["h:1".to_string()], &[]),
            Err(StoreError::ScriptNotFound { .. })
        ));
    }

    #[test]
    fn script_runs_atomically_under_the_write_lock() {
        let store = Arc::new(MemoryStore::new());
        let script = Script::new(ScriptModel {
            name: "drain",
            body: "local n = redis.call('HLEN', KEYS[1]); redis.call('DEL', KEYS[1]); return n",
            key_arity: 1,
        });
        store.install_script(&script, |ctx, keys, _args| {
            Ok(Reply::Integer(ctx.delete(&keys[0]) as i64))
        });

        let seed: Vec<(String, String)> = (0..64)
            .map(|i| (format!("k{i}"), i.to_string()))
            .collect();
        store.write_fields("h:drain", &seed).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let script = script.clone();
            handles.push(std::thread::spawn(move || {
                match store.eval(&script, &["h:drain".to_string()], &[]).unwrap() {
                    Reply::Integer(n) => n,
                    other => panic!("unexpected reply: {other:?}"),
                }
            }));
        }

        let total: i64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // Exactly one invocation saw the fields; the rest saw an empty key.
        assert_eq!(total, 64);
        assert!(!store.exists("h:drain").unwrap());
    }
}
