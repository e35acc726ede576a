//! In-memory stand-ins for the remote content store and its change feed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

use noornest::content::{
    ChangeAction, ChangeEvent, ChangeFeed, ContentError, ContentKind, Profile, RemoteStore,
    UserRole,
};

#[derive(Default)]
struct MockState {
    rows: Mutex<HashMap<ContentKind, Vec<serde_json::Value>>>,
    profiles: Mutex<HashMap<Uuid, Profile>>,
    missing_tables: Mutex<Vec<ContentKind>>,
    next_id: Mutex<u32>,
}

/// Remote store holding rows in memory. Inserts assign ids like the real one.
#[derive(Clone, Default)]
pub struct MockRemote {
    state: Arc<MockState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make selects on `kind` fail as if the table had never been created.
    pub fn drop_table(&self, kind: ContentKind) {
        self.state.missing_tables.lock().unwrap().push(kind);
    }

    pub fn add_profile(&self, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        self.state.profiles.lock().unwrap().insert(
            id,
            Profile {
                id,
                role,
                avatar_url: None,
            },
        );
        id
    }

    pub fn row_count(&self, kind: ContentKind) -> usize {
        self.state
            .rows
            .lock()
            .unwrap()
            .get(&kind)
            .map_or(0, |rows| rows.len())
    }
}

impl RemoteStore for MockRemote {
    async fn select(&self, kind: ContentKind) -> Result<Vec<serde_json::Value>, ContentError> {
        if self.state.missing_tables.lock().unwrap().contains(&kind) {
            return Err(ContentError::SchemaMissing {
                table: kind.table().to_string(),
            });
        }

        let mut rows = self
            .state
            .rows
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        if kind == ContentKind::Printables {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn insert(&self, kind: ContentKind, mut row: serde_json::Value) -> Result<(), ContentError> {
        let id = {
            let mut next = self.state.next_id.lock().unwrap();
            *next += 1;
            format!("row-{}", next)
        };
        row["id"] = serde_json::Value::String(id);
        row["created_at"] = serde_json::Value::String("2026-02-18T18:00:00+00:00".to_string());

        self.state
            .rows
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(row);
        Ok(())
    }

    async fn delete(&self, kind: ContentKind, id: &str) -> Result<(), ContentError> {
        if let Some(rows) = self.state.rows.lock().unwrap().get_mut(&kind) {
            rows.retain(|row| row["id"] != id);
        }
        Ok(())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ContentError> {
        Ok(self.state.profiles.lock().unwrap().get(&user_id).cloned())
    }
}

/// Change feed driven by the test.
#[derive(Clone, Default)]
pub struct MockFeed {
    listeners: Arc<Mutex<Vec<mpsc::UnboundedSender<ChangeEvent>>>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every listener that `kind` changed.
    pub fn notify(&self, kind: ContentKind, action: ChangeAction) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|tx| tx.send(ChangeEvent { kind, action }).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl ChangeFeed for MockFeed {
    async fn listen(
        &self,
        _kind: ContentKind,
    ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, ContentError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().unwrap().push(tx);
        Ok(rx)
    }
}
