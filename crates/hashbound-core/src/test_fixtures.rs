//! Entity fixtures shared across runtime tests. These exercise the
//! derive end-to-end, so the executors are always tested through the
//! same code path applications use.

use hashbound_derive::HashEntity;
use std::collections::BTreeMap;

///
/// Member
/// The full shape: id, scalars of mixed kinds, and a map field.
///

#[derive(Clone, Debug, PartialEq, HashEntity)]
#[hash(name = "member")]
pub(crate) struct Member {
    #[hash(id)]
    pub id: String,
    pub name: String,
    pub age: u32,
    pub active: bool,
    #[hash(map)]
    pub metadata: BTreeMap<String, String>,
}

impl Member {
    pub fn alice() -> Self {
        Self {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            age: 30,
            active: true,
            metadata: BTreeMap::from([
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]),
        }
    }
}

///
/// Session
/// TTL-bearing entity with no map field.
///

#[derive(Clone, Debug, PartialEq, HashEntity)]
#[hash(name = "session", ttl(amount = 30, unit = "seconds"))]
pub(crate) struct Session {
    #[hash(id)]
    pub token: String,
    pub member_id: u64,
}

///
/// CounterPage
/// Numeric id and a typed (non-string-valued) map field.
///

#[derive(Clone, Debug, PartialEq, HashEntity)]
#[hash(name = "counter_page")]
pub(crate) struct CounterPage {
    #[hash(id)]
    pub page: u64,
    #[hash(map)]
    pub counters: BTreeMap<String, u64>,
}
