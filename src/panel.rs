//! Panel session — selection and derived-view consistency for one panel.
//!
//! DESIGN
//! ======
//! Every management panel carries the same transient UI state: an optional
//! selected record, an active detail tab, and a modal that is either closed,
//! creating a new record, or editing a snapshot of an existing one. The
//! session owns that state and keeps it coherent while the underlying
//! collection mutates: deleting the selected record repairs the selection,
//! deleting the modal target forces the modal closed.
//!
//! Edits are snapshot-isolated — `open_edit` clones the record, so a
//! concurrent external update to the same record never bleeds into an open
//! form. Destructive operations consume an explicit [`Confirmation`] result,
//! decoupling the store logic from however the UI asks "are you sure?".

use tracing::debug;

use crate::record::{Fields, Record, RecordId};
use crate::store::Store;

// =============================================================================
// TYPES
// =============================================================================

/// Outcome of the external confirmation step that gates destructive
/// operations. `Cancelled` leaves the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// What to do with the selection when the selected record disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Clear the selection.
    #[default]
    Clear,
    /// Fall back to the first remaining record in display order.
    FirstRemaining,
}

/// Modal state machine: `Idle` → `Creating`/`Editing` → `Idle`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState {
    #[default]
    Idle,
    /// Modal open over a brand-new draft (freshly generated id + defaults).
    Creating { draft: Record },
    /// Modal open over a snapshot of an existing record, isolated from
    /// concurrent external updates.
    Editing { snapshot: Record },
}

// =============================================================================
// PANEL SESSION
// =============================================================================

/// Per-panel transient state bound to one collection of the shared store.
#[derive(Debug)]
pub struct PanelSession {
    store: Store,
    collection: String,
    selection: Option<RecordId>,
    active_tab: Option<String>,
    modal: ModalState,
    policy: SelectionPolicy,
}

impl PanelSession {
    #[must_use]
    pub fn new(store: Store, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            selection: None,
            active_tab: None,
            modal: ModalState::Idle,
            policy: SelectionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn selection(&self) -> Option<&RecordId> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn active_tab(&self) -> Option<&str> {
        self.active_tab.as_deref()
    }

    #[must_use]
    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn set_tab(&mut self, tab: impl Into<String>) {
        self.active_tab = Some(tab.into());
    }

    /// Select a record if it currently exists in the collection.
    pub async fn select(&mut self, id: RecordId) -> bool {
        let slice = self.store.slice(&self.collection).await;
        if slice.contains(&id) {
            self.selection = Some(id);
            true
        } else {
            debug!(collection = %self.collection, id = %id, "panel: select ignored, id not in slice");
            false
        }
    }

    // =========================================================================
    // MODAL TRANSITIONS
    // =========================================================================

    /// Open the modal over a new draft with a freshly generated id.
    pub fn open_create(&mut self, defaults: Fields) {
        let draft = Record { id: RecordId::generate(), fields: defaults };
        self.modal = ModalState::Creating { draft };
    }

    /// Open the modal over a snapshot of an existing record. The snapshot is
    /// a clone — in-progress edits stay isolated from external updates.
    pub fn open_edit(&mut self, record: &Record) {
        self.selection = Some(record.id.clone());
        self.modal = ModalState::Editing { snapshot: record.clone() };
    }

    /// The open form value, mutable, if a modal is open.
    pub fn draft_mut(&mut self) -> Option<&mut Record> {
        match &mut self.modal {
            ModalState::Idle => None,
            ModalState::Creating { draft } => Some(draft),
            ModalState::Editing { snapshot } => Some(snapshot),
        }
    }

    /// Commit the open form value through the upsert protocol and close the
    /// modal. Returns `false` when no modal is open or the store dropped the
    /// mutation.
    pub async fn save(&mut self) -> bool {
        let record = match std::mem::take(&mut self.modal) {
            ModalState::Idle => {
                debug!(collection = %self.collection, "panel: save ignored, no modal open");
                return false;
            }
            ModalState::Creating { draft } => draft,
            ModalState::Editing { snapshot } => snapshot,
        };

        self.selection = Some(record.id.clone());
        self.store.upsert(&self.collection, record).await
    }

    /// Close the modal and discard the form value. No store mutation.
    pub fn cancel(&mut self) {
        self.modal = ModalState::Idle;
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Remove a record after an explicit confirmation.
    ///
    /// If the modal target is the deleted record the modal is forced back to
    /// `Idle`; if the selection pointed at it, the selection is repaired per
    /// the panel's [`SelectionPolicy`]. A `Cancelled` confirmation is a
    /// complete no-op.
    pub async fn delete(&mut self, id: RecordId, confirmation: Confirmation) -> bool {
        if confirmation == Confirmation::Cancelled {
            debug!(collection = %self.collection, id = %id, "panel: delete cancelled at confirmation");
            return false;
        }

        let modal_target = match &self.modal {
            ModalState::Idle => None,
            ModalState::Creating { draft } => Some(&draft.id),
            ModalState::Editing { snapshot } => Some(&snapshot.id),
        };
        if modal_target == Some(&id) {
            self.modal = ModalState::Idle;
        }

        let removed = self.store.remove(&self.collection, id.clone()).await;
        if removed && self.selection.as_ref() == Some(&id) {
            self.repair_selection().await;
        }
        removed
    }

    // =========================================================================
    // RE-DERIVATION
    // =========================================================================

    /// Re-derive selection and modal after an external mutation to the same
    /// collection (another panel, or a resolved generation job).
    ///
    /// A live `Editing` snapshot survives external *updates* to its record —
    /// only deletion of the record closes the modal.
    pub async fn sync(&mut self) {
        let slice = self.store.slice(&self.collection).await;

        if let ModalState::Editing { snapshot } = &self.modal {
            if !slice.contains(&snapshot.id) {
                debug!(collection = %self.collection, id = %snapshot.id, "panel: edit target deleted externally, modal closed");
                self.modal = ModalState::Idle;
            }
        }

        if let Some(selected) = &self.selection {
            if !slice.contains(selected) {
                self.repair_selection().await;
            }
        }
    }

    async fn repair_selection(&mut self) {
        let slice = self.store.slice(&self.collection).await;
        self.selection = match self.policy {
            SelectionPolicy::Clear => None,
            SelectionPolicy::FirstRemaining => slice.first().map(|r| r.id.clone()),
        };
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
