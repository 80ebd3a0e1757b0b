//! Entity Store: an in-process cache of one record family.
//!
//! The store keeps the last fetched collection together with `loading` and
//! `error` flags and mirrors every successful Gateway write into the cache.
//! It never writes to the cache before the Gateway has confirmed the
//! change, so a failed call leaves the cached rows exactly as they were.
//!
//! Fetches are generation-guarded: [`EntityStore::begin_fetch`] issues a
//! ticket and [`EntityStore::finish_fetch`] only applies the response of the
//! most recently issued one.

use thiserror::Error;

use crate::domain::record::{Parented, Record, SoftDelete};
use crate::domain::types::Money;
use crate::repository::{
    ListQuery, RecordDeactivator, RecordDeleter, RecordReader, RecordWriter, RepositoryError,
    RepositoryResult,
};

pub mod tickets;

/// Failures surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Gateway(#[from] RepositoryError),
    /// Refused locally by a business rule before any write.
    #[error("{0}")]
    Rejected(String),
    #[error("record not found")]
    NotFound,
}

/// Cache transition delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent<R: Record> {
    Loading,
    Loaded(usize),
    Created(R),
    Updated(R),
    Deleted(R::Id),
    Failed(String),
}

/// Handle returned by [`EntityStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Proof that a fetch was started; compared against the latest generation
/// when the response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

type Listener<R> = Box<dyn FnMut(&StoreEvent<R>) + Send>;

pub struct EntityStore<R: Record> {
    items: Vec<R>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Listener<R>)>,
}

impl<R: Record> Default for EntityStore<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
            next_subscription: 0,
            listeners: Vec::new(),
        }
    }
}

impl<R: Record> std::fmt::Debug for EntityStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("entity", &R::ENTITY)
            .field("items", &self.items.len())
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<R: Record> EntityStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the most recent failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Registers `listener` for every subsequent cache transition.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<R>) + Send + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Marks the store as loading and issues a ticket for the response.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        self.emit(StoreEvent::Loading);
        FetchTicket(self.generation)
    }

    /// Applies a fetch response.
    ///
    /// Returns `Ok(false)` when the ticket is stale; the response is then
    /// dropped and the cache left alone. On success the cache is replaced and
    /// `error` cleared. On failure `error` is set and the cache kept.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: RepositoryResult<Vec<R>>,
    ) -> Result<bool, StoreError> {
        if ticket.0 != self.generation {
            log::debug!(
                "discarding stale {} fetch #{} (latest #{})",
                R::ENTITY,
                ticket.0,
                self.generation
            );
            return Ok(false);
        }
        self.loading = false;
        match result {
            Ok(items) => {
                log::debug!("loaded {} {} records", items.len(), R::ENTITY);
                self.items = items;
                self.error = None;
                self.emit(StoreEvent::Loaded(self.items.len()));
                Ok(true)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Loads the full collection matching `query`.
    pub fn fetch_all<G>(&mut self, gateway: &G, query: &ListQuery) -> Result<&[R], StoreError>
    where
        G: RecordReader<R> + ?Sized,
    {
        let ticket = self.begin_fetch();
        let result = gateway.list_records(query);
        self.finish_fetch(ticket, result)?;
        Ok(&self.items)
    }

    /// Inserts through the Gateway and prepends the persisted record.
    pub fn create<G>(&mut self, gateway: &G, new: &R::New) -> Result<R, StoreError>
    where
        G: RecordWriter<R> + ?Sized,
    {
        match gateway.create_record(new) {
            Ok(record) => {
                self.cache_created(record.clone());
                Ok(record)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Updates through the Gateway and replaces the cached element.
    pub fn update<G>(&mut self, gateway: &G, id: R::Id, patch: &R::Patch) -> Result<R, StoreError>
    where
        G: RecordWriter<R> + ?Sized,
    {
        match gateway.update_record(id, patch) {
            Ok(record) => {
                self.cache_updated(record.clone());
                Ok(record)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    pub fn delete<G>(&mut self, gateway: &G, id: R::Id) -> Result<(), StoreError>
    where
        G: RecordDeleter<R> + ?Sized,
    {
        match gateway.delete_record(id) {
            Ok(()) => {
                self.items.retain(|item| item.id() != id);
                log::debug!("removed {} {id} from cache", R::ENTITY);
                self.emit(StoreEvent::Deleted(id));
                Ok(())
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Synchronous filter over the cache.
    pub fn by_parent(&self, parent: R::ParentId) -> Vec<&R>
    where
        R: Parented,
    {
        self.items
            .iter()
            .filter(|item| item.parent_id() == Some(parent))
            .collect()
    }

    /// Sum of `value` over the cached children of `parent`.
    pub fn total_by_parent<F>(&self, parent: R::ParentId, value: F) -> Money
    where
        R: Parented,
        F: Fn(&R) -> Money,
    {
        self.by_parent(parent).into_iter().map(value).sum()
    }

    pub(crate) fn cache_created(&mut self, record: R) {
        log::debug!("cached new {} {}", R::ENTITY, record.id());
        self.items.insert(0, record.clone());
        self.emit(StoreEvent::Created(record));
    }

    /// Replaces the cached element with the same id. Records that were never
    /// fetched are not added.
    pub(crate) fn cache_updated(&mut self, record: R) {
        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == record.id()) {
            *slot = record.clone();
            log::debug!("refreshed {} {} in cache", R::ENTITY, record.id());
        }
        self.emit(StoreEvent::Updated(record));
    }

    pub(crate) fn fail<T>(&mut self, error: StoreError) -> Result<T, StoreError> {
        let message = error.to_string();
        log::debug!("{} store error: {message}", R::ENTITY);
        self.error = Some(message.clone());
        self.emit(StoreEvent::Failed(message));
        Err(error)
    }

    fn emit(&mut self, event: StoreEvent<R>) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl<R: SoftDelete> EntityStore<R> {
    pub fn deactivate<G>(&mut self, gateway: &G, id: R::Id) -> Result<R, StoreError>
    where
        G: RecordDeactivator<R> + ?Sized,
    {
        self.set_active(gateway, id, false)
    }

    pub fn reactivate<G>(&mut self, gateway: &G, id: R::Id) -> Result<R, StoreError>
    where
        G: RecordDeactivator<R> + ?Sized,
    {
        self.set_active(gateway, id, true)
    }

    fn set_active<G>(&mut self, gateway: &G, id: R::Id, active: bool) -> Result<R, StoreError>
    where
        G: RecordDeactivator<R> + ?Sized,
    {
        match gateway.set_record_active(id, active) {
            Ok(record) => {
                self.cache_updated(record.clone());
                Ok(record)
            }
            Err(err) => self.fail(err.into()),
        }
    }
}
