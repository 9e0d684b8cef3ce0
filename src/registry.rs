//! Handle-addressed collections of posets and the boolean call surface.
//!
//! [`Registry`] is the plain owned variant, injected wherever it is needed.
//! [`SharedRegistry`] serves concurrent callers: a registry-wide `RwLock`
//! guards the handle map, and each poset sits behind its own `Mutex`.
//!
//! Every surface call emits one `debug` line describing its outcome.
//! Diagnostics never change what a call returns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::RegistryConfig;
use crate::error::PosetError;
use crate::graph::GraphViolation;
use crate::poset::Poset;
use crate::PosetHandle;

fn report<T>(
    call: &'static str,
    handle: PosetHandle,
    args: &[&str],
    result: Result<T, PosetError>,
) -> Option<T> {
    match result {
        Ok(value) => {
            tracing::debug!(call, handle, ?args, outcome = "ok", "poset_{call}: done");
            Some(value)
        }
        Err(e) => {
            tracing::debug!(call, handle, ?args, outcome = e.code(), "poset_{call}: {e}");
            None
        }
    }
}

/// Re-checks `poset` when verification is enabled; logs and returns the
/// violation found.
fn verify(
    config: &RegistryConfig,
    handle: PosetHandle,
    poset: &Poset,
) -> Option<GraphViolation> {
    if !config.verify_invariants {
        return None;
    }
    let violation = poset.check_invariants().err()?;
    tracing::error!(handle, %violation, "poset invariant violated");
    Some(violation)
}

/// Runs a mutating call against one poset, then optionally re-checks it.
fn mutate<T>(
    config: &RegistryConfig,
    handle: PosetHandle,
    poset: &mut Poset,
    f: impl FnOnce(&mut Poset) -> Result<T, PosetError>,
) -> Result<T, PosetError> {
    let out = f(poset)?;
    verify(config, handle, poset);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owned handle -> poset map. Handles start at 0 and are never reused.
#[derive(Debug, Default)]
pub struct Registry {
    posets: HashMap<PosetHandle, Poset>,
    next_handle: PosetHandle,
    config: RegistryConfig,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of live posets.
    pub fn len(&self) -> usize {
        self.posets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posets.is_empty()
    }

    /// Live handles in ascending order.
    pub fn handles(&self) -> Vec<PosetHandle> {
        let mut handles: Vec<_> = self.posets.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    pub fn get(&self, handle: PosetHandle) -> Result<&Poset, PosetError> {
        self.posets.get(&handle).ok_or(PosetError::UnknownHandle(handle))
    }

    pub fn get_mut(&mut self, handle: PosetHandle) -> Result<&mut Poset, PosetError> {
        self.posets
            .get_mut(&handle)
            .ok_or(PosetError::UnknownHandle(handle))
    }

    fn run_mut<T>(
        &mut self,
        call: &'static str,
        handle: PosetHandle,
        args: &[&str],
        f: impl FnOnce(&mut Poset) -> Result<T, PosetError>,
    ) -> Option<T> {
        let config = &self.config;
        let result = match self.posets.get_mut(&handle) {
            Some(poset) => mutate(config, handle, poset, f),
            None => Err(PosetError::UnknownHandle(handle)),
        };
        report(call, handle, args, result)
    }

    fn run<T>(
        &self,
        call: &'static str,
        handle: PosetHandle,
        args: &[&str],
        f: impl FnOnce(&Poset) -> Result<T, PosetError>,
    ) -> Option<T> {
        report(call, handle, args, self.get(handle).and_then(f))
    }

    pub fn new_poset(&mut self) -> PosetHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.posets.insert(handle, Poset::new());
        tracing::debug!(call = "new", handle, outcome = "ok", "poset_new: created");
        handle
    }

    /// Forgets a poset. Unknown handles are a no-op.
    pub fn delete(&mut self, handle: PosetHandle) {
        let result = self
            .posets
            .remove(&handle)
            .map(drop)
            .ok_or(PosetError::UnknownHandle(handle));
        report("delete", handle, &[], result);
    }

    /// Element count, 0 for unknown handles.
    pub fn size(&self, handle: PosetHandle) -> usize {
        self.run("size", handle, &[], |p| Ok(p.len())).unwrap_or(0)
    }

    pub fn insert(&mut self, handle: PosetHandle, label: &str) -> bool {
        self.run_mut("insert", handle, &[label], |p| p.insert(label)).is_some()
    }

    pub fn remove(&mut self, handle: PosetHandle, label: &str) -> bool {
        self.run_mut("remove", handle, &[label], |p| p.remove(label)).is_some()
    }

    pub fn add(&mut self, handle: PosetHandle, a: &str, b: &str) -> bool {
        self.run_mut("add", handle, &[a, b], |p| p.add_relation(a, b)).is_some()
    }

    pub fn del(&mut self, handle: PosetHandle, a: &str, b: &str) -> bool {
        self.run_mut("del", handle, &[a, b], |p| p.delete_relation(a, b)).is_some()
    }

    pub fn test(&self, handle: PosetHandle, a: &str, b: &str) -> bool {
        self.run("test", handle, &[a, b], |p| p.test(a, b)).unwrap_or(false)
    }

    /// Wipes a poset. Unknown handles are a no-op.
    pub fn clear(&mut self, handle: PosetHandle) {
        self.run_mut("clear", handle, &[], |p| {
            p.clear();
            Ok(())
        });
    }
}

// ---------------------------------------------------------------------------
// SharedRegistry
// ---------------------------------------------------------------------------

type Slot = Arc<Mutex<Poset>>;

/// Thread-safe registry. Calls on different handles only contend on the
/// short read lock that resolves the handle.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    posets: RwLock<HashMap<PosetHandle, Slot>>,
    next_handle: AtomicU64,
    config: RegistryConfig,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.posets.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, handle: PosetHandle) -> Result<Slot, PosetError> {
        self.posets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
            .ok_or(PosetError::UnknownHandle(handle))
    }

    fn run_mut<T>(
        &self,
        call: &'static str,
        handle: PosetHandle,
        args: &[&str],
        f: impl FnOnce(&mut Poset) -> Result<T, PosetError>,
    ) -> Option<T> {
        let result = self.slot(handle).and_then(|slot| {
            let mut poset = slot.lock().unwrap_or_else(PoisonError::into_inner);
            mutate(&self.config, handle, &mut *poset, f)
        });
        report(call, handle, args, result)
    }

    fn run<T>(
        &self,
        call: &'static str,
        handle: PosetHandle,
        args: &[&str],
        f: impl FnOnce(&Poset) -> Result<T, PosetError>,
    ) -> Option<T> {
        let result = self.slot(handle).and_then(|slot| {
            let poset = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f(&*poset)
        });
        report(call, handle, args, result)
    }

    /// Runs `f` with exclusive access to one poset.
    pub fn with_poset<T>(
        &self,
        handle: PosetHandle,
        f: impl FnOnce(&mut Poset) -> T,
    ) -> Result<T, PosetError> {
        let slot = self.slot(handle)?;
        let mut poset = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut *poset))
    }

    pub fn new_poset(&self) -> PosetHandle {
        let mut posets = self.posets.write().unwrap_or_else(PoisonError::into_inner);
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        posets.insert(handle, Arc::new(Mutex::new(Poset::new())));
        tracing::debug!(call = "new", handle, outcome = "ok", "poset_new: created");
        handle
    }

    pub fn delete(&self, handle: PosetHandle) {
        let removed = self
            .posets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);
        let result = removed.map(drop).ok_or(PosetError::UnknownHandle(handle));
        report("delete", handle, &[], result);
    }

    pub fn size(&self, handle: PosetHandle) -> usize {
        self.run("size", handle, &[], |p| Ok(p.len())).unwrap_or(0)
    }

    pub fn insert(&self, handle: PosetHandle, label: &str) -> bool {
        self.run_mut("insert", handle, &[label], |p| p.insert(label)).is_some()
    }

    pub fn remove(&self, handle: PosetHandle, label: &str) -> bool {
        self.run_mut("remove", handle, &[label], |p| p.remove(label)).is_some()
    }

    pub fn add(&self, handle: PosetHandle, a: &str, b: &str) -> bool {
        self.run_mut("add", handle, &[a, b], |p| p.add_relation(a, b)).is_some()
    }

    pub fn del(&self, handle: PosetHandle, a: &str, b: &str) -> bool {
        self.run_mut("del", handle, &[a, b], |p| p.delete_relation(a, b)).is_some()
    }

    pub fn test(&self, handle: PosetHandle, a: &str, b: &str) -> bool {
        self.run("test", handle, &[a, b], |p| p.test(a, b)).unwrap_or(false)
    }

    pub fn clear(&self, handle: PosetHandle) {
        self.run_mut("clear", handle, &[], |p| {
            p.clear();
            Ok(())
        });
    }
}
