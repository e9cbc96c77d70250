use crate::services::catalog::ScholarshipCatalog;
use crate::services::resume_store::ResumeStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared state handed to every handler. The resume store is selected once
/// at startup; handlers never re-check the backend.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResumeStore>,
    pub catalog: Arc<ScholarshipCatalog>,
    saved_scholarships: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new(store: ResumeStore) -> Self {
        Self {
            store: Arc::new(store),
            catalog: Arc::new(ScholarshipCatalog::seeded()),
            saved_scholarships: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Saved-scholarship ids. The lock is held for map access only and
    /// never across an await point.
    pub fn saved(&self) -> MutexGuard<'_, HashSet<String>> {
        self.saved_scholarships
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
