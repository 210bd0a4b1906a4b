//! Client-side session state kept between simulation steps.
//!
//! A [`SessionStore`] is a small key-value map that survives restarts of the
//! client. [`Session`] layers typed access for the two keys the flow uses and
//! resets them when a new simulation starts.

use serde_json::Value;
use sim_core::OutcomeSnapshot;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const SIMULATION_ID_KEY: &str = "simulationId";
pub const LAST_ORDER_KEY: &str = "lastOrderDetails";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session data is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persisted key-value store.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// Store that lives only as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    entries: BTreeMap<String, Value>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.entries.clear();
        Ok(())
    }
}

/// JSON file backed store; every mutation is written through.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileSessionStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "session opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.entries.clear();
        self.flush()
    }
}

/// Typed view over a store.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
}

impl<S: SessionStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Id of the simulation being edited, if one was created.
    pub fn simulation_id(&self) -> Option<i64> {
        self.store.get(SIMULATION_ID_KEY).and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn set_simulation_id(&mut self, id: i64) -> Result<(), SessionError> {
        self.store.set(SIMULATION_ID_KEY, Value::from(id))
    }

    /// Last submitted order, if any.
    pub fn last_order(&self) -> Result<Option<OutcomeSnapshot>, SessionError> {
        match self.store.get(LAST_ORDER_KEY) {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    pub fn set_last_order(&mut self, snapshot: &OutcomeSnapshot) -> Result<(), SessionError> {
        self.store.set(LAST_ORDER_KEY, serde_json::to_value(snapshot)?)
    }

    /// Forget the current simulation and its last order.
    pub fn start_new_simulation(&mut self) -> Result<(), SessionError> {
        self.store.remove(SIMULATION_ID_KEY)?;
        self.store.remove(LAST_ORDER_KEY)
    }
}
