//! Ticket stores.
//!
//! [`InMemoryStore`] is the `HashMap`-backed collection with `&mut self`
//! operations and JSONL persistence. [`SharedStore`] wraps it behind a
//! mutex and implements [`TicketStore`], the trait the HTTP layer is
//! handed.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Result, TicketError};
use crate::jsonl;
use crate::model::{NewTicket, Ticket};
use crate::query::{TicketFilter, TicketPatch};
use crate::util;

/// Document-collection operations over tickets.
///
/// Each call is atomic with respect to other calls on the same store.
pub trait TicketStore: Send + Sync {
    /// Return every ticket matching the filter, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn find(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// Persist a new ticket, assigning its ID and timestamps.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a required field is blank, or a storage error.
    fn insert(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Apply `patch` to the first ticket matching `filter`.
    ///
    /// Returns `Ok(None)` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the filter's ID is malformed, or a storage error.
    fn update_one(&self, filter: &TicketFilter, patch: &TicketPatch) -> Result<Option<Ticket>>;

    /// Remove the first ticket matching `filter`.
    ///
    /// Returns `Ok(false)` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the filter's ID is malformed, or a storage error.
    fn delete_one(&self, filter: &TicketFilter) -> Result<bool>;
}

/// In-memory ticket collection.
///
/// All data lives in memory. Use `open()` to load from a JSONL file
/// and `save()` to persist back.
#[derive(Debug)]
pub struct InMemoryStore {
    tickets: HashMap<String, Ticket>,
    dirty_ids: HashSet<String>,
    jsonl_path: Option<PathBuf>,
}

impl InMemoryStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tickets: HashMap::new(),
            dirty_ids: HashSet::new(),
            jsonl_path: None,
        }
    }

    /// Open and load from a JSONL file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, holds a
    /// duplicate ID, or holds a ticket that breaks the record invariants.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded = jsonl::load(path)?;

        let mut store = Self::new();
        store.jsonl_path = Some(path.to_path_buf());

        for ticket in loaded {
            if let Err(errors) = ticket.validate() {
                warn!(id = %ticket.id, ?errors, "Rejecting invalid ticket in JSONL file");
                return Err(TicketError::from_validation_errors(errors));
            }
            if store.tickets.contains_key(&ticket.id) {
                return Err(TicketError::IdCollision { id: ticket.id });
            }
            store.tickets.insert(ticket.id.clone(), ticket);
        }

        debug!(path = %path.display(), count = store.tickets.len(), "Loaded tickets");
        Ok(store)
    }

    /// Open a JSONL file, creating an empty one if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or created.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Err(TicketError::FileNotFound(_)) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let mut store = Self::new();
                store.jsonl_path = Some(path.to_path_buf());
                store.save()?;
                debug!(path = %path.display(), "Created empty ticket file");
                Ok(store)
            }
            other => other,
        }
    }

    /// The JSONL file this store was opened from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.jsonl_path.as_deref()
    }

    /// Save to the file that was opened.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if no file path is set, or `Io` on write failure.
    pub fn save(&self) -> Result<()> {
        let path = self
            .jsonl_path
            .as_ref()
            .ok_or_else(|| TicketError::Storage("No file path set; use save_to()".to_string()))?;
        self.save_to(path)
    }

    /// Save to a specific file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` on write failure.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let tickets = Self::sorted(self.tickets.values().collect());
        jsonl::save(path.as_ref(), &tickets)
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Insert a new ticket.
    ///
    /// Assigns a fresh ID, sets both timestamps to now and marks it open.
    ///
    /// # Errors
    ///
    /// Returns `Validation`/`ValidationErrors` if a required field is blank.
    pub fn insert(&mut self, new: NewTicket) -> Result<Ticket> {
        new.validate().map_err(TicketError::from_validation_errors)?;

        let now = Utc::now();
        let id = util::generate_id(
            &new.project,
            &new.issue_title,
            &new.created_by,
            now,
            |id| self.tickets.contains_key(id),
        );

        let ticket = Ticket {
            id: id.clone(),
            project: new.project,
            issue_title: new.issue_title,
            issue_text: new.issue_text,
            created_on: now,
            updated_on: now,
            created_by: new.created_by,
            assigned_to: new.assigned_to,
            open: true,
            status_text: new.status_text,
        };

        self.tickets.insert(id.clone(), ticket.clone());
        self.dirty_ids.insert(id);

        Ok(ticket)
    }

    /// Return tickets matching the filter, ordered by `created_on` then ID.
    #[must_use]
    pub fn find(&self, filter: &TicketFilter) -> Vec<&Ticket> {
        if let Some(ref id) = filter.id {
            return self
                .tickets
                .get(id)
                .filter(|ticket| filter.matches(ticket))
                .into_iter()
                .collect();
        }

        let matching = self
            .tickets
            .values()
            .filter(|ticket| filter.matches(ticket))
            .collect();
        Self::sorted(matching)
    }

    /// Return the first ticket matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the filter carries a malformed ID.
    pub fn find_one(&self, filter: &TicketFilter) -> Result<Option<&Ticket>> {
        check_filter_id(filter)?;
        Ok(self.find(filter).into_iter().next())
    }

    /// Apply a patch to the first ticket matching the filter.
    ///
    /// `updated_on` is refreshed even when the patch is empty and never
    /// moves backwards.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the filter carries a malformed ID.
    pub fn update_one(
        &mut self,
        filter: &TicketFilter,
        patch: &TicketPatch,
    ) -> Result<Option<Ticket>> {
        let Some(id) = self.find_one(filter)?.map(|ticket| ticket.id.clone()) else {
            return Ok(None);
        };
        let ticket = self
            .tickets
            .get_mut(&id)
            .ok_or_else(|| TicketError::TicketNotFound { id: id.clone() })?;

        patch.apply_to(ticket);
        ticket.updated_on = Utc::now().max(ticket.updated_on);

        let updated = ticket.clone();
        self.dirty_ids.insert(id);
        Ok(Some(updated))
    }

    /// Remove the first ticket matching the filter and return it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the filter carries a malformed ID.
    pub fn delete_one(&mut self, filter: &TicketFilter) -> Result<Option<Ticket>> {
        let Some(id) = self.find_one(filter)?.map(|ticket| ticket.id.clone()) else {
            return Ok(None);
        };
        let removed = self.tickets.remove(&id);
        self.dirty_ids.insert(id);
        Ok(removed)
    }

    /// Put a ticket back exactly as given, replacing any current version.
    pub fn restore(&mut self, ticket: Ticket) {
        self.dirty_ids.insert(ticket.id.clone());
        self.tickets.insert(ticket.id.clone(), ticket);
    }

    /// Drop a ticket by ID without filter checks.
    pub fn remove(&mut self, id: &str) -> Option<Ticket> {
        self.dirty_ids.insert(id.to_string());
        self.tickets.remove(id)
    }

    // ========================================================================
    // Dirty Tracking
    // ========================================================================

    /// Whether any ticket changed since the last `clear_dirty`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty_ids.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty_ids.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn sorted(mut tickets: Vec<&Ticket>) -> Vec<&Ticket> {
        tickets.sort_by(|a, b| a.created_on.cmp(&b.created_on).then(a.id.cmp(&b.id)));
        tickets
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_filter_id(filter: &TicketFilter) -> Result<()> {
    match filter.id {
        Some(ref id) if !util::is_valid_id(id) => Err(TicketError::InvalidId { id: id.clone() }),
        _ => Ok(()),
    }
}

/// Thread-safe ticket store.
///
/// Wraps an [`InMemoryStore`] in a mutex. When opened from a file, every
/// successful mutation is written back before the call returns; if the
/// write fails the in-memory change is rolled back.
#[derive(Debug)]
pub struct SharedStore {
    inner: Mutex<InMemoryStore>,
}

impl SharedStore {
    /// Create a store that only lives in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    /// Open (or create) a JSONL-backed store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        InMemoryStore::open_or_create(path).map(Self::from_store)
    }

    #[must_use]
    pub fn from_store(store: InMemoryStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Number of stored tickets.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryStore>> {
        self.inner
            .lock()
            .map_err(|_| TicketError::Storage("ticket store lock poisoned".to_string()))
    }

    /// Write dirty state to disk if the store is file-backed.
    fn persist(store: &mut InMemoryStore) -> Result<()> {
        if store.path().is_none() || !store.is_dirty() {
            store.clear_dirty();
            return Ok(());
        }
        store.save()?;
        store.clear_dirty();
        Ok(())
    }
}

impl TicketStore for SharedStore {
    fn find(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let store = self.lock()?;
        Ok(store.find(filter).into_iter().cloned().collect())
    }

    fn insert(&self, ticket: NewTicket) -> Result<Ticket> {
        let mut store = self.lock()?;
        let created = store.insert(ticket)?;
        if let Err(err) = Self::persist(&mut store) {
            warn!(id = %created.id, error = %err, "Failed to persist insert; rolling back");
            store.remove(&created.id);
            store.clear_dirty();
            return Err(err);
        }
        Ok(created)
    }

    fn update_one(&self, filter: &TicketFilter, patch: &TicketPatch) -> Result<Option<Ticket>> {
        let mut store = self.lock()?;
        let previous = store.find_one(filter)?.cloned();
        let updated = store.update_one(filter, patch)?;
        if let Err(err) = Self::persist(&mut store) {
            if let Some(previous) = previous {
                warn!(id = %previous.id, error = %err, "Failed to persist update; rolling back");
                store.restore(previous);
            }
            store.clear_dirty();
            return Err(err);
        }
        Ok(updated)
    }

    fn delete_one(&self, filter: &TicketFilter) -> Result<bool> {
        let mut store = self.lock()?;
        let removed = store.delete_one(filter)?;
        if let Err(err) = Self::persist(&mut store) {
            if let Some(removed) = removed {
                warn!(id = %removed.id, error = %err, "Failed to persist delete; rolling back");
                store.restore(removed);
            }
            store.clear_dirty();
            return Err(err);
        }
        Ok(removed.is_some())
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
