//! Property Store (§4.1): a keyed, typed lookup scoped per-session with a
//! global fallback. Read-only from the core's perspective — nothing here
//! ever writes a value on the core's own initiative; values arrive from an
//! out-of-scope backing configuration loader via [`PropertyStore::set`].

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Number(i64),
    Str(String),
}

#[derive(Debug, Default, Hash, PartialEq, Eq, Clone)]
struct Key {
    session_id: Option<u32>,
    path: String,
}

#[derive(Debug, Default)]
pub struct PropertyStore {
    values: Mutex<HashMap<Key, PropertyValue>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property. `session_id = None` sets the global default.
    pub fn set(&self, session_id: Option<u32>, path: &str, value: PropertyValue) {
        let key = Key {
            session_id,
            path: path.to_string(),
        };
        self.values.lock().unwrap().insert(key, value);
    }

    fn lookup(&self, session_id: u32, path: &str) -> Option<PropertyValue> {
        let values = self.values.lock().unwrap();
        let scoped = Key {
            session_id: Some(session_id),
            path: path.to_string(),
        };
        if let Some(v) = values.get(&scoped) {
            return Some(v.clone());
        }
        let global = Key {
            session_id: None,
            path: path.to_string(),
        };
        values.get(&global).cloned()
    }

    pub fn get_bool(&self, session_id: u32, path: &str) -> Option<bool> {
        match self.lookup(session_id, path)? {
            PropertyValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn get_number(&self, session_id: u32, path: &str) -> Option<i64> {
        match self.lookup(session_id, path)? {
            PropertyValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn get_string(&self, session_id: u32, path: &str) -> Option<String> {
        match self.lookup(session_id, path)? {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }
}
