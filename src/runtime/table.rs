//! Bidirectional name ⇄ handle table for one symbol kind.
//!
//! # Thread Safety
//!
//! Both directions live in concurrent hash maps (`DashMap`). Lookups are pure reads and
//! run in parallel with each other and with registrations. A registration holds the
//! write guard of the name's entry while it binds the reverse entry, so:
//!
//! - concurrent registrations of disjoint names never lose an update
//! - a reader observes either the state before or after a registration, and once the
//!   handle resolves to its name, resolving the name yields the handle
//! - two registrations racing for one handle bind it at most once
//!
//! Diagnostics are emitted only after every map guard has been released, so a sink may
//! call back into the table, including registrations that report replacements themselves.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    runtime::{ConflictPolicy, Diagnostics, RuntimeHandle},
    Error, Result,
};

/// First raw value handed out by [`SymbolTable::intern`]
const FIRST_INTERNED_HANDLE: u64 = 1;

/// Counter value once every raw handle up to `u32::MAX` has been handed out
const HANDLES_EXHAUSTED: u64 = u32::MAX as u64 + 1;

/// Registry of the names of one handle kind
pub struct SymbolTable<H: RuntimeHandle> {
    /// Forward index, the authoritative binding of a name
    by_name: DashMap<Arc<str>, H>,
    /// Reverse index
    by_handle: DashMap<H, Arc<str>>,
    /// Next raw value tried by interning
    next_handle: AtomicU64,
    policy: ConflictPolicy,
    diagnostics: Arc<Diagnostics>,
}

impl<H: RuntimeHandle> SymbolTable<H> {
    /// Create an empty table
    ///
    /// ## Arguments
    /// * 'policy' - What to do when a name is re-registered with a different handle
    /// * 'diagnostics' - Where replacements are reported
    #[must_use]
    pub fn new(policy: ConflictPolicy, diagnostics: Arc<Diagnostics>) -> Self {
        SymbolTable {
            by_name: DashMap::new(),
            by_handle: DashMap::new(),
            next_handle: AtomicU64::new(FIRST_INTERNED_HANDLE),
            policy,
            diagnostics,
        }
    }

    /// The conflict policy of this table
    #[must_use]
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Look up the handle registered for `name`, exact and case-sensitive
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<H> {
        self.by_name.get(name).map(|entry| *entry.value())
    }

    /// Look up the name registered for `handle`
    #[must_use]
    pub fn name_of(&self, handle: H) -> Option<String> {
        self.by_handle
            .get(&handle)
            .map(|entry| entry.value().to_string())
    }

    /// Returns `true` if `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered names
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Snapshot of all bindings, sorted by name
    #[must_use]
    pub fn symbols(&self) -> Vec<(String, H)> {
        let mut symbols: Vec<(String, H)> = self
            .by_name
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect();
        symbols.sort_by(|a, b| a.0.cmp(&b.0));
        symbols
    }

    /// Bind `name` to `handle`
    ///
    /// Registering an identical binding again is a no-op.
    ///
    /// # Errors
    /// - [`Error::EmptyName`] for an empty name
    /// - [`Error::NilHandle`] for the nil handle
    /// - [`Error::ConflictingRegistration`] if `handle` already names another symbol, or
    ///   `name` is bound to another handle and the policy is [`ConflictPolicy::Reject`]
    pub fn register(&self, name: &str, handle: H) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyName(H::KIND));
        }
        if handle.is_nil() {
            return Err(Error::NilHandle(H::KIND));
        }

        let replaced = match self.by_name.entry(Arc::from(name)) {
            Entry::Occupied(mut entry) => {
                let existing = *entry.get();
                if existing == handle {
                    return Ok(());
                }
                if self.policy == ConflictPolicy::Reject {
                    return Err(self.conflict(
                        name,
                        format!("already bound to {existing}, refusing {handle}"),
                    ));
                }

                self.bind_handle(entry.key(), handle)?;
                self.by_handle.remove(&existing);
                entry.insert(handle);
                existing
            }
            Entry::Vacant(entry) => {
                self.bind_handle(entry.key(), handle)?;
                entry.insert(handle);
                return Ok(());
            }
        };

        self.diagnostics.emit(&format!(
            "Re-registered {} '{}': {} replaced by {}",
            H::KIND,
            name,
            replaced,
            handle
        ));
        Ok(())
    }

    /// Return the handle of `name`, registering it under a fresh handle first if needed
    ///
    /// Fresh handles come from a counter that skips values already bound by
    /// [`SymbolTable::register`].
    ///
    /// # Errors
    /// - [`Error::EmptyName`] for an empty name
    /// - [`Error::HandleExhausted`] once every raw value has been used
    pub fn intern(&self, name: &str) -> Result<H> {
        if name.is_empty() {
            return Err(Error::EmptyName(H::KIND));
        }
        if let Some(handle) = self.resolve(name) {
            return Ok(handle);
        }

        match self.by_name.entry(Arc::from(name)) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => loop {
                let raw = self
                    .next_handle
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |raw| {
                        (raw < HANDLES_EXHAUSTED).then_some(raw + 1)
                    })
                    .ok()
                    .and_then(|raw| u32::try_from(raw).ok())
                    .ok_or(Error::HandleExhausted(H::KIND))?;

                let handle = H::from_raw(raw);
                if let Entry::Vacant(slot) = self.by_handle.entry(handle) {
                    slot.insert(entry.key().clone());
                    entry.insert(handle);
                    return Ok(handle);
                }
            },
        }
    }

    /// Bind the reverse entry of `handle`, failing if it already names another symbol
    fn bind_handle(&self, name: &Arc<str>, handle: H) -> Result<()> {
        match self.by_handle.entry(handle) {
            Entry::Occupied(entry) if entry.get() != name => Err(self.conflict(
                name,
                format!("{handle} already names '{}'", entry.get()),
            )),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(name.clone());
                Ok(())
            }
        }
    }

    fn conflict(&self, name: &str, message: String) -> Error {
        Error::ConflictingRegistration {
            kind: H::KIND,
            name: name.to_string(),
            message,
        }
    }
}

impl<H: RuntimeHandle> std::fmt::Debug for SymbolTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("kind", &H::KIND)
            .field("len", &self.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
