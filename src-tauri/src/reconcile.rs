//! Feature reconciliation store.
//!
//! Holds the canonical extracted feature set and an optional editable
//! working copy. Edits only ever touch the working copy; `commit_edit`
//! swaps it in atomically and `cancel_edit` discards it, so the canonical
//! draft is never partially updated.

use crate::models::features::{FeatureDraft, FeatureField, ValidationError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("No edit is in progress")]
    NotEditing,
    #[error("An edit is already in progress")]
    AlreadyEditing,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Canonical feature snapshot source plus edit-mode working copy.
#[derive(Debug, Default)]
pub struct FeatureStore {
    canonical: FeatureDraft,
    working: Option<FeatureDraft>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current canonical feature draft — what analysis submits.
    pub fn canonical(&self) -> &FeatureDraft {
        &self.canonical
    }

    /// The draft the UI should render: the working copy while editing,
    /// the canonical draft otherwise.
    pub fn visible(&self) -> &FeatureDraft {
        self.working.as_ref().unwrap_or(&self.canonical)
    }

    pub fn is_editing(&self) -> bool {
        self.working.is_some()
    }

    /// Replace the canonical draft wholesale (a fresh extraction arrived).
    /// Last write wins; any in-progress edit of the old draft is dropped.
    pub fn replace_canonical(&mut self, draft: FeatureDraft) {
        self.working = None;
        self.canonical = draft;
    }

    /// Snapshot the canonical draft into an editable working copy.
    pub fn begin_edit(&mut self) -> Result<(), EditError> {
        if self.working.is_some() {
            return Err(EditError::AlreadyEditing);
        }
        self.working = Some(self.canonical.clone());
        Ok(())
    }

    /// Mutate one field of the working copy. Numeric fields reject
    /// non-numeric input here, at the boundary.
    pub fn update_field(&mut self, field: FeatureField, value: &str) -> Result<(), EditError> {
        let working = self.working.as_mut().ok_or(EditError::NotEditing)?;
        working.set(field, value)?;
        Ok(())
    }

    /// Atomically replace the canonical draft with the working copy.
    pub fn commit_edit(&mut self) -> Result<(), EditError> {
        let working = self.working.take().ok_or(EditError::NotEditing)?;
        self.canonical = working;
        Ok(())
    }

    /// Discard the working copy, reverting to the canonical draft.
    pub fn cancel_edit(&mut self) -> Result<(), EditError> {
        self.working.take().ok_or(EditError::NotEditing)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::features::complete_draft;

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        store.replace_canonical(complete_draft());
        store
    }

    #[test]
    fn cancel_after_any_edits_restores_canonical_exactly() {
        let mut store = store();
        let before = store.canonical().clone();

        store.begin_edit().unwrap();
        store.update_field(FeatureField::Age, "99").unwrap();
        store.update_field(FeatureField::Sex, "F").unwrap();
        store.update_field(FeatureField::Oldpeak, "3.5").unwrap();
        store.cancel_edit().unwrap();

        assert_eq!(store.canonical(), &before);
        assert!(!store.is_editing());
    }

    #[test]
    fn commit_is_all_or_nothing() {
        let mut store = store();
        store.begin_edit().unwrap();
        store.update_field(FeatureField::Age, "50").unwrap();

        // Canonical untouched until commit.
        assert_eq!(store.canonical().get(FeatureField::Age), Some("45"));
        assert_eq!(store.visible().get(FeatureField::Age), Some("50"));

        store.commit_edit().unwrap();
        assert_eq!(store.canonical().get(FeatureField::Age), Some("50"));
        assert!(!store.is_editing());
    }

    #[test]
    fn update_outside_edit_mode_is_rejected() {
        let mut store = store();
        assert_eq!(
            store.update_field(FeatureField::Age, "50"),
            Err(EditError::NotEditing)
        );
        assert_eq!(store.commit_edit(), Err(EditError::NotEditing));
        assert_eq!(store.cancel_edit(), Err(EditError::NotEditing));
    }

    #[test]
    fn double_begin_edit_is_rejected() {
        let mut store = store();
        store.begin_edit().unwrap();
        assert_eq!(store.begin_edit(), Err(EditError::AlreadyEditing));
    }

    #[test]
    fn numeric_rejection_leaves_working_copy_unchanged() {
        let mut store = store();
        store.begin_edit().unwrap();
        assert!(matches!(
            store.update_field(FeatureField::RestingBp, "one-forty"),
            Err(EditError::Invalid(_))
        ));
        assert_eq!(store.visible().get(FeatureField::RestingBp), Some("140"));
    }

    #[test]
    fn replace_canonical_drops_in_progress_edit() {
        let mut store = store();
        store.begin_edit().unwrap();
        store.update_field(FeatureField::Age, "50").unwrap();

        store.replace_canonical(FeatureDraft::new());
        assert!(!store.is_editing());
        assert!(store.canonical().is_empty());
    }
}
