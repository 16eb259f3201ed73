//! # Click targets of registered modules.
//!
//! The registry maps a module index to what a click action needs: the
//! module's name, its [`Refresh`] handle, its action gate and admission
//! policy. `Bar::add` writes it; the [`ClickRouter`](super::ClickRouter)
//! reads it on every dispatch.
//!
//! ## Rules
//! - Indices are registration indices; entries are never removed.
//! - The gate is a `tokio::sync::Mutex<()>`: holding it means "an action of
//!   this module is running".

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use super::admission::ActionAdmission;
use crate::module::Refresh;

/// What the router needs to run actions of one module.
pub(crate) struct ActionTarget {
    pub name: Arc<str>,
    pub refresh: Refresh,
    pub gate: Arc<Mutex<()>>,
    pub admission: ActionAdmission,
}

impl ActionTarget {
    pub fn new(name: Arc<str>, refresh: Refresh, admission: ActionAdmission) -> Self {
        Self {
            name,
            refresh,
            gate: Arc::new(Mutex::new(())),
            admission,
        }
    }
}

/// Registration-ordered click targets.
#[derive(Default)]
pub(crate) struct Registry {
    targets: RwLock<Vec<Arc<ActionTarget>>>,
}

impl Registry {
    /// Appends a target and returns its module index.
    pub fn register(&self, target: ActionTarget) -> usize {
        let mut targets = self.targets.write().unwrap_or_else(PoisonError::into_inner);
        targets.push(Arc::new(target));
        targets.len() - 1
    }

    pub fn get(&self, module: usize) -> Option<Arc<ActionTarget>> {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
            .cloned()
    }
}
