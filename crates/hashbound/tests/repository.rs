//! End-to-end coverage through the facade: derive an entity, build a
//! repository, and drive the full operation vocabulary against the
//! in-memory backend.

use hashbound::{
    obs, prelude::*,
    registry,
    store::{MemoryStore, Reply},
};
use std::{collections::BTreeMap, sync::Arc, time::Duration};

#[derive(Clone, Debug, PartialEq, HashEntity)]
#[hash(name = "device")]
struct Device {
    #[hash(id)]
    serial: String,
    label: String,
    online: bool,
    #[hash(map)]
    attributes: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, HashEntity)]
#[hash(name = "lease", ttl(amount = 2, unit = "minutes"))]
struct Lease {
    #[hash(id)]
    id: u64,
    holder: String,
}

fn probe() -> Device {
    Device {
        serial: "sn-100".to_string(),
        label: "probe".to_string(),
        online: true,
        attributes: BTreeMap::from([
            ("fw".to_string(), "1.4.2".to_string()),
            ("zone".to_string(), "eu".to_string()),
        ]),
    }
}

#[test]
fn full_vocabulary_through_the_facade() {
    let store = Arc::new(MemoryStore::new());
    let repo = RepositoryBuilder::<Device, MemoryStore>::new(Arc::clone(&store))
        .build()
        .unwrap();

    let device = probe();
    let id = repo.save(&device).unwrap();
    assert_eq!(repo.find_by_id(&id).unwrap().unwrap(), device);
    assert!(repo.exists_by_id(&id).unwrap());

    repo.save_map_by_id(&id, &[("zone".to_string(), "us".to_string())])
        .unwrap();
    let attrs = repo
        .find_hash_fields_by_id(&id, &["zone".to_string(), "absent".to_string()])
        .unwrap();
    assert_eq!(
        attrs,
        BTreeMap::from([("zone".to_string(), "us".to_string())])
    );

    assert_eq!(repo.delete_map_by_id(&id, &["fw".to_string()]).unwrap(), 1);

    let batch = repo
        .find_all_by_id(&[id.clone(), "sn-missing".to_string()])
        .unwrap();
    assert_eq!(batch.len(), 1);

    repo.delete_by_id(&id).unwrap();
    assert!(repo.find_by_id(&id).unwrap().is_none());
}

#[test]
fn declared_ttl_governs_record_lifetime() {
    let store = Arc::new(MemoryStore::with_manual_clock());
    let repo = RepositoryBuilder::<Lease, MemoryStore>::new(Arc::clone(&store))
        .build()
        .unwrap();

    let lease = Lease {
        id: 1,
        holder: "worker-a".to_string(),
    };
    repo.save(&lease).unwrap();

    store.advance(Duration::from_secs(119));
    assert!(repo.exists_by_id(&1).unwrap());

    store.advance(Duration::from_secs(2));
    assert!(!repo.exists_by_id(&1).unwrap());
}

#[test]
fn declared_scripts_and_registry_lookup() {
    const PURGE: ScriptModel = ScriptModel {
        name: "purge_device",
        body: "local n = redis.call('HLEN', KEYS[1]); redis.call('DEL', KEYS[1]); return n",
        key_arity: 1,
    };

    let store = Arc::new(MemoryStore::new());
    let repo = RepositoryBuilder::<Device, MemoryStore>::new(Arc::clone(&store))
        .script(PURGE)
        .build()
        .unwrap();
    store.install_script(repo.script("purge_device").unwrap(), |ctx, keys, _args| {
        Ok(Reply::Integer(ctx.delete(&keys[0]) as i64))
    });

    registry::register_repository(repo).unwrap();
    let repo = registry::lookup::<Device, MemoryStore>().unwrap();

    let device = probe();
    repo.save(&device).unwrap();

    // 3 scalar cells (serial, label, online) plus 2 map entries.
    let purged: i64 = repo
        .run_script("purge_device", &device.serial, &[])
        .unwrap();
    assert_eq!(purged, 5);
    assert!(!repo.exists_by_id(&device.serial).unwrap());
}

#[test]
fn operation_counters_export_as_json() {
    let store = Arc::new(MemoryStore::new());
    let repo = RepositoryBuilder::<Device, MemoryStore>::new(store)
        .build()
        .unwrap();
    repo.save(&probe()).unwrap();

    let json = serde_json::to_value(obs::metrics_report()).unwrap();

    // Other tests in this binary touch "device" too, so only a floor is
    // asserted.
    assert!(json["entities"]["device"]["save_calls"].as_u64().unwrap() >= 1);
    assert!(json["ops"]["save_calls"].as_u64().unwrap() >= 1);
}
