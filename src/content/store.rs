//! Read-through cache of remote content.
//!
//! Lists are served synchronously from the cache, which starts out seeded
//! with built-in defaults. Writes go straight to the remote and never touch
//! the cache: the visible list only changes when a refresh (usually fired by
//! a realtime notification) brings back confirmed remote state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;

use super::auth::AdminCapability;
use super::client::{ContentError, RemoteStore, RestClient};
use super::realtime::{ChangeFeed, RealtimeFeed};
use super::types::{
    filter_printables, CategoryFilter, ContentKind, ContentRecord, NewPrintable, NewTradition,
    Printable, Tradition,
};
use crate::storage::RemoteSettings;

/// Content store backed by the REST and realtime endpoints.
pub type RemoteContentStore = ContentStore<RestClient, RealtimeFeed>;

/// Cached rows of every collection.
#[derive(Debug, Clone)]
pub struct Collections {
    printables: Vec<Printable>,
    traditions: Vec<Tradition>,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            printables: Printable::defaults(),
            traditions: Tradition::defaults(),
        }
    }
}

/// Record types that have a slot in the cache.
pub trait Cached: ContentRecord {
    fn slot(collections: &Collections) -> &Vec<Self>;
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

impl Cached for Printable {
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.printables
    }

    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.printables
    }
}

impl Cached for Tradition {
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.traditions
    }

    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.traditions
    }
}

fn slot_index(kind: ContentKind) -> usize {
    match kind {
        ContentKind::Printables => 0,
        ContentKind::Traditions => 1,
    }
}

/// What a refresh did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// Remote rows (or defaults, for an empty table) are now cached
    Applied,
    /// No remote configured; defaults stay in place
    Offline,
    /// Result arrived after teardown or after a newer refresh started
    Discarded,
}

struct Inner<R, F> {
    remote: Option<R>,
    feed: Option<F>,
    cache: RwLock<Collections>,
    generations: [AtomicU64; 2],
    live: AtomicBool,
}

/// Cached view of the printables and traditions collections.
pub struct ContentStore<R, F> {
    inner: Arc<Inner<R, F>>,
}

impl<R, F> Clone for ContentStore<R, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl RemoteContentStore {
    /// Build a store from configuration. Without a usable remote the store
    /// serves defaults only.
    pub fn from_settings(settings: &RemoteSettings) -> Result<Self, ContentError> {
        Self::connect(settings, None)
    }

    /// Like [`from_settings`](Self::from_settings), acting as a signed-in user.
    ///
    /// Admin writes need this: row-level security checks the user's token,
    /// not the anonymous key.
    pub fn from_settings_with_token(
        settings: &RemoteSettings,
        access_token: &str,
    ) -> Result<Self, ContentError> {
        Self::connect(settings, Some(access_token))
    }

    fn connect(
        settings: &RemoteSettings,
        access_token: Option<&str>,
    ) -> Result<Self, ContentError> {
        let client = RestClient::from_settings(settings)?
            .map(|client| match access_token {
                Some(token) => client.with_access_token(token),
                None => client,
            });
        let feed = match (&client, settings.realtime_enabled) {
            (Some(client), true) => Some(RealtimeFeed::for_client(client)),
            _ => None,
        };
        Ok(Self::new(client, feed))
    }

    /// The REST client, when a remote is configured.
    pub fn client(&self) -> Option<&RestClient> {
        self.inner.remote.as_ref()
    }
}

impl<R: RemoteStore, F: ChangeFeed> ContentStore<R, F> {
    /// Create a store seeded with built-in content.
    pub fn new(remote: Option<R>, feed: Option<F>) -> Self {
        Self {
            inner: Arc::new(Inner {
                remote,
                feed,
                cache: RwLock::new(Collections::default()),
                generations: [AtomicU64::new(0), AtomicU64::new(0)],
                live: AtomicBool::new(true),
            }),
        }
    }

    /// Store that never talks to a remote.
    pub fn offline() -> Self {
        Self::new(None, None)
    }

    pub fn is_remote(&self) -> bool {
        self.inner.remote.is_some()
    }

    /// Whether `subscribe` can deliver change notifications.
    pub fn has_change_feed(&self) -> bool {
        self.inner.feed.is_some()
    }

    /// Current cached items of one collection.
    pub fn list<T: Cached>(&self) -> Vec<T> {
        match self.inner.cache.read() {
            Ok(cache) => T::slot(&cache).clone(),
            Err(poisoned) => T::slot(&poisoned.into_inner()).clone(),
        }
    }

    pub fn printables(&self) -> Vec<Printable> {
        self.list()
    }

    /// Printables visible under a gallery tab.
    pub fn printables_in(&self, filter: CategoryFilter) -> Vec<Printable> {
        filter_printables(&self.printables(), filter)
    }

    pub fn traditions(&self) -> Vec<Tradition> {
        self.list()
    }

    /// Re-fetch one collection from the remote.
    pub async fn refresh(&self, kind: ContentKind) -> Result<RefreshStatus, ContentError> {
        match kind {
            ContentKind::Printables => self.refresh_typed::<Printable>().await,
            ContentKind::Traditions => self.refresh_typed::<Tradition>().await,
        }
    }

    /// Refresh every collection, stopping at the first error.
    pub async fn refresh_all(&self) -> Result<(), ContentError> {
        for kind in ContentKind::ALL {
            self.refresh(kind).await?;
        }
        Ok(())
    }

    async fn refresh_typed<T: Cached>(&self) -> Result<RefreshStatus, ContentError> {
        let Some(remote) = self.inner.remote.as_ref() else {
            return Ok(RefreshStatus::Offline);
        };

        let counter = &self.inner.generations[slot_index(T::KIND)];
        let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;

        let rows = match remote.select(T::KIND).await {
            Ok(rows) => rows,
            Err(e) if e.is_schema_missing() => {
                tracing::warn!("{} table not found, using defaults", T::KIND);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Error fetching {}: {}", T::KIND, e);
                return Err(e);
            }
        };

        let fetched = rows.len();
        let mut items = Vec::with_capacity(fetched);
        let mut last_error = None;
        for row in rows {
            match serde_json::from_value::<T>(row) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!("Skipping undecodable {} row: {}", T::KIND, e);
                    last_error = Some(e);
                }
            }
        }

        // Every row failed: the table shape is wrong, not just one record
        if let (true, Some(e)) = (items.is_empty(), last_error) {
            return Err(ContentError::InvalidResponse(e.to_string()));
        }

        let items = if items.is_empty() { T::defaults() } else { items };

        if !self.inner.live.load(Ordering::SeqCst) || counter.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale {} result", T::KIND);
            return Ok(RefreshStatus::Discarded);
        }

        let count = items.len();
        match self.inner.cache.write() {
            Ok(mut cache) => *T::slot_mut(&mut cache) = items,
            Err(poisoned) => *T::slot_mut(&mut poisoned.into_inner()) = items,
        }

        tracing::debug!("Cached {} {}", count, T::KIND);
        Ok(RefreshStatus::Applied)
    }

    fn remote(&self) -> Result<&R, ContentError> {
        self.inner.remote.as_ref().ok_or(ContentError::NotConfigured)
    }

    /// Publish a printable. The list updates once the change notification arrives.
    pub async fn create_printable(
        &self,
        _admin: &AdminCapability,
        item: NewPrintable,
    ) -> Result<(), ContentError> {
        let row = serde_json::to_value(&item)
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))?;
        self.remote()?.insert(ContentKind::Printables, row).await?;
        tracing::info!("Printable '{}' published", item.title);
        Ok(())
    }

    /// Publish a tradition. The list updates once the change notification arrives.
    pub async fn create_tradition(
        &self,
        _admin: &AdminCapability,
        item: NewTradition,
    ) -> Result<(), ContentError> {
        let row = serde_json::to_value(&item)
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))?;
        self.remote()?.insert(ContentKind::Traditions, row).await?;
        tracing::info!("Tradition '{}' published", item.title);
        Ok(())
    }

    /// Remove a row. The list updates once the change notification arrives.
    pub async fn delete(
        &self,
        _admin: &AdminCapability,
        kind: ContentKind,
        id: &str,
    ) -> Result<(), ContentError> {
        self.remote()?.delete(kind, id).await?;
        tracing::info!("Deleted {} from {}", id, kind);
        Ok(())
    }

    /// Refresh `kind` whenever the remote reports a change to it.
    pub async fn subscribe(&self, kind: ContentKind) -> Result<Subscription, ContentError> {
        let feed = self.inner.feed.as_ref().ok_or(ContentError::NotConfigured)?;
        let mut events = feed.listen(kind).await?;

        let active = Arc::new(AtomicBool::new(true));
        let task_active = Arc::clone(&active);
        let store = self.clone();

        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if !task_active.load(Ordering::SeqCst) {
                    break;
                }
                tracing::debug!("{:?} on {}, refreshing", event.action, event.kind);
                if let Err(e) = store.refresh(event.kind).await {
                    tracing::error!("Refresh of {} after change failed: {}", event.kind, e);
                }
            }
        });

        Ok(Subscription {
            kind,
            active,
            task: Some(task),
        })
    }

    /// Tear down the view: refreshes still in flight will not be applied.
    pub fn close(&self) {
        self.inner.live.store(false, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        !self.inner.live.load(Ordering::SeqCst)
    }
}

/// Live change subscription. Cancelled on drop.
pub struct Subscription {
    kind: ContentKind,
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop listening. Safe to call more than once.
    pub fn cancel(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Unsubscribed from {} changes", self.kind);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
