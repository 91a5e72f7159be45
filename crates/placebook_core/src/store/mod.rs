//! Relational in-process store backing the place-discovery application.
//!
//! # Responsibility
//! - Own every entity collection and enforce cross-entity consistency.
//! - Compute derived values (ratings, distances, integrity scores).
//! - Fan out notifications synchronously as part of the triggering write.
//! - Mirror full state to the key-value medium after every mutation and
//!   restore it on open.
//!
//! # Invariants
//! - All access goes through one mutex; operations never interleave within a
//!   process. Separate instances over a shared medium are last-write-wins.
//! - A persistence write failure is logged and swallowed; memory stays
//!   authoritative for the rest of the process lifetime.
//! - Authorization mismatches are `Ok(false)`/`Ok(None)`, never errors.

pub mod codec;
pub mod fanout;
pub mod geo;
pub mod scoring;
pub mod seed;
pub mod state;

mod announcements;
mod notifications;
mod places;
mod questions;
mod reviews;
mod users;

use crate::repo::kv_repo::{KeyValueMedium, MediumError};
use chrono::{Utc, Weekday};
use codec::{decode_state, encode_state, CodecError};
use log::{error, info, warn};
use state::StoreState;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    /// Referenced id is absent from its collection.
    NotFound { entity: &'static str, id: String },
    /// Restoring from or clearing the medium failed.
    Medium(MediumError),
    /// A stored blob could not be decoded.
    Codec(CodecError),
    /// A previous operation panicked while holding the state lock.
    LockPoisoned,
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Medium(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "store state lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Medium(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::NotFound { .. } | Self::LockPoisoned => None,
        }
    }
}

impl From<MediumError> for StoreError {
    fn from(value: MediumError) -> Self {
        Self::Medium(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Store behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Seed canonical users/content on open when missing.
    pub seed_on_open: bool,
    /// First day of the calendar week used by weekly counters.
    pub week_starts_on: Weekday,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_on_open: true,
            week_starts_on: Weekday::Sun,
        }
    }
}

struct StoreInner {
    state: StoreState,
    medium: Box<dyn KeyValueMedium>,
}

impl StoreInner {
    /// Mirrors every collection into the medium. Failures are logged only.
    fn persist(&mut self, operation: &'static str) {
        let entries = match encode_state(&self.state) {
            Ok(entries) => entries,
            Err(err) => {
                error!(
                    "event=store_persist module=store status=error op={operation} error_code=encode_failed error={err}"
                );
                return;
            }
        };
        if let Err(err) = self.medium.write_entries(&entries) {
            error!(
                "event=store_persist module=store status=error op={operation} error_code=write_failed error={err}"
            );
        }
    }
}

/// The single owner of all application entities.
///
/// Construct once per process and share by reference.
pub struct RelationalStore {
    inner: Mutex<StoreInner>,
    config: StoreConfig,
}

impl RelationalStore {
    /// Restores state from `medium` and seeds it with default settings.
    pub fn open(medium: impl KeyValueMedium + 'static) -> StoreResult<Self> {
        Self::open_with_config(medium, StoreConfig::default())
    }

    /// Restores state from `medium`, then seeds according to `config`.
    ///
    /// # Errors
    /// - `StoreError::Medium`/`StoreError::Codec` when restoration fails.
    pub fn open_with_config(
        medium: impl KeyValueMedium + 'static,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let started_at = Instant::now();
        let medium: Box<dyn KeyValueMedium> = Box::new(medium);
        let state = decode_state(medium.as_ref()).map_err(|err| {
            error!("event=store_open module=store status=error error_code=restore_failed error={err}");
            err
        })?;

        let mut inner = StoreInner { state, medium };
        if config.seed_on_open && ensure_seeded(&mut inner.state) {
            inner.persist("seed");
        }

        info!(
            "event=store_open module=store status=ok duration_ms={} places={} reviews={} users={} seed_version={}",
            started_at.elapsed().as_millis(),
            inner.state.places.len(),
            inner.state.reviews.len(),
            inner.state.users.len(),
            inner.state.seed_version
        );

        Ok(Self {
            inner: Mutex::new(inner),
            config,
        })
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Returns a copy of every collection.
    pub fn snapshot(&self) -> StoreResult<StoreState> {
        self.read(StoreState::clone)
    }

    /// Replaces in-memory state with what the medium currently holds.
    ///
    /// Used when another instance may have written to a shared medium.
    pub fn reload(&self) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let state = decode_state(inner.medium.as_ref())?;
        inner.state = state;
        info!("event=store_reload module=store status=ok");
        Ok(())
    }

    /// Clears every collection and the medium, then seeds again.
    ///
    /// Seeding happens even when `seed_on_open` is off; that flag only
    /// governs `open`.
    pub fn reset(&self) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.medium.clear()?;
        inner.state = StoreState::default();
        ensure_seeded(&mut inner.state);
        inner.persist("reset");
        warn!(
            "event=store_reset module=store status=ok places={} users={}",
            inner.state.places.len(),
            inner.state.users.len()
        );
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| {
            error!("event=store_lock module=store status=error error_code=lock_poisoned");
            StoreError::LockPoisoned
        })
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> StoreResult<T> {
        let inner = self.lock()?;
        Ok(f(&inner.state))
    }

    fn try_read<T>(&self, f: impl FnOnce(&StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let inner = self.lock()?;
        f(&inner.state)
    }

    /// Runs one mutation under the lock and mirrors state on success.
    fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut StoreState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut inner = self.lock()?;
        let value = f(&mut inner.state)?;
        inner.persist(operation);
        Ok(value)
    }
}

/// Seeds users and content as needed. Returns whether anything changed.
fn ensure_seeded(state: &mut StoreState) -> bool {
    let now = Utc::now();
    let users_added = seed::seed_users(state, now);
    let mut changed = users_added > 0;
    if state.seed_version < seed::SEED_VERSION {
        seed::seed_content(state, now);
        changed = true;
    }
    changed
}
