use std::sync::{Arc, RwLock};

use crate::types::PhysicsParams;

/// Latest slider snapshot, shared between the writer (controls) and the
/// reader (frame driver). Each write replaces the whole snapshot.
#[derive(Clone, Debug, Default)]
pub struct ParamsCell {
    inner: Arc<RwLock<PhysicsParams>>,
}

impl ParamsCell {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    pub fn load(&self) -> PhysicsParams {
        read_copy(&self.inner)
    }

    pub fn store(&self, params: PhysicsParams) {
        write_copy(&self.inner, params);
    }

    /// Edits a copy of the current snapshot and stores it back.
    pub fn update(&self, edit: impl FnOnce(&mut PhysicsParams)) {
        let mut params = self.load();
        edit(&mut params);
        self.store(params);
    }
}

fn read_copy<T: Copy>(lock: &RwLock<T>) -> T {
    match lock.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_copy<T: Copy>(lock: &RwLock<T>, value: T) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}
