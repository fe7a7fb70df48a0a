use crate::interceptor::Interception;
use crate::realm::Realm;
use serde_json::json;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Active interceptions of one realm, keyed by install order. Draining
/// yields newest first so stacked interceptions unwind correctly.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<u64, Rc<Interception>>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, interception: Rc<Interception>) {
        self.entries.insert(interception.id(), interception);
    }

    pub(crate) fn remove(&mut self, id: u64) -> Option<Rc<Interception>> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn drain(&mut self) -> Vec<Rc<Interception>> {
        std::mem::take(&mut self.entries).into_values().rev().collect()
    }
}

impl Realm {
    pub fn active_interceptions(&self) -> usize {
        self.registry.len()
    }

    /// Restores every active interception and empties the registry. Returns
    /// how many were restored; a second call restores nothing.
    pub fn restore_all(&mut self) -> usize {
        let entries = self.registry.drain();
        let mut restored = 0;
        for interception in entries {
            match interception.restore(self) {
                Ok(()) => restored += 1,
                Err(err) => self.log(
                    "warn",
                    "interception.restore_failed",
                    json!({ "id": interception.id(), "error": err.to_string() }),
                ),
            }
        }
        if restored > 0 {
            self.log(
                "info",
                "registry.restore_all",
                json!({ "restored": restored }),
            );
        }
        restored
    }
}
