use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use uplink_server::{KeyedSource, Value};

/// In-memory map lane
#[derive(Default)]
pub struct TestMapSource {
    entries: RwLock<BTreeMap<Value, Value>>,
}

impl TestMapSource {
    pub fn new(entries: &[(&str, i64)]) -> Arc<Self> {
        let source = Self::default();
        for (key, value) in entries {
            source.put(key, *value);
        }
        Arc::new(source)
    }

    pub fn put(&self, key: &str, value: i64) {
        self.entries
            .write()
            .unwrap()
            .insert(Value::from(key), Value::from(value));
    }

    pub fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(&Value::from(key));
    }
}

impl KeyedSource for TestMapSource {
    fn snapshot(&self) -> Vec<(Value, Value)> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn get(&self, key: &Value) -> Option<Value> {
        self.entries.read().unwrap().get(key).cloned()
    }
}
