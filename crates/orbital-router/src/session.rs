//! Key/value session data on top of a platform session store.

use serde_json::{Map, Value};
use tracing::debug;

/// A platform session backend.
pub trait SessionStore {
    /// Starts (or resumes) the session and returns its id.
    fn start(&mut self) -> String;

    /// Returns the id of the running session, if one is started.
    fn current_id(&self) -> Option<String>;

    /// Issues a new id for the running session, keeping its data.
    fn regenerate(&mut self) -> String;

    /// Destroys the session. Returns false if there was nothing to destroy.
    fn destroy(&mut self) -> bool;

    /// The store's own session data.
    fn data(&mut self) -> &mut Map<String, Value>;
}

/// An in-process session store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    id: Option<String>,
    data: Map<String, Value>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id() -> String {
        format!("{:032x}", rand::random::<u128>())
    }
}

impl SessionStore for MemoryStore {
    fn start(&mut self) -> String {
        self.id.get_or_insert_with(Self::fresh_id).clone()
    }

    fn current_id(&self) -> Option<String> {
        self.id.clone()
    }

    fn regenerate(&mut self) -> String {
        let id = Self::fresh_id();
        self.id = Some(id.clone());
        id
    }

    fn destroy(&mut self) -> bool {
        self.data.clear();
        self.id.take().is_some()
    }

    fn data(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }
}

/// Session data access.
///
/// With `overload` the session reads and writes the store's own data;
/// without it, values live in a private map that the store never sees.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    overload: bool,
    local: Map<String, Value>,
    id: Option<String>,
}

impl<S: SessionStore> Session<S> {
    /// Starts the store's session if needed and wraps it.
    pub fn init(mut store: S, overload: bool) -> Self {
        if store.current_id().is_none() {
            store.start();
        }

        let mut session = Self {
            store,
            overload,
            local: Map::new(),
            id: None,
        };
        let id = session.id().to_string();
        debug!(id = %id, overload, "session started");
        session
    }

    fn data_mut(&mut self) -> &mut Map<String, Value> {
        if self.overload {
            self.store.data()
        } else {
            &mut self.local
        }
    }

    /// Returns the session id, read from the store on first use.
    pub fn id(&mut self) -> &str {
        if self.id.is_none() {
            self.id = self.store.current_id();
        }
        self.id.as_deref().unwrap_or_default()
    }

    /// Issues a new session id and returns it.
    pub fn regenerate(&mut self) -> &str {
        self.store.regenerate();
        self.id = None;
        self.id()
    }

    /// Sets a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data_mut().insert(key.into(), value.into());
    }

    /// Merges `values` into the session; incoming keys win.
    pub fn extend(&mut self, values: Map<String, Value>) {
        self.data_mut().extend(values);
    }

    /// Returns the value for `key`.
    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.data_mut().get(key)
    }

    /// Returns all session values.
    pub fn all(&mut self) -> &Map<String, Value> {
        self.data_mut()
    }

    /// Removes `key`.
    pub fn delete(&mut self, key: &str) {
        self.data_mut().remove(key);
    }

    /// Destroys the session in the store.
    pub fn destroy(&mut self) -> bool {
        self.id = None;
        self.local.clear();
        self.store.destroy()
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
