// ============================================================================
// PERSISTENCE - Blob único de sesión en almacenamiento durable
// ============================================================================

use std::rc::Rc;

use crate::error::StorageError;
use crate::state::{PersistedSession, PersistedState};
use crate::utils::KeyValueStorage;

/// Lectura/escritura del blob `{ state, version }` bajo una clave fija.
/// Lo comparten el store y el adaptador HTTP.
#[derive(Clone)]
pub struct SessionPersistence {
    storage: Rc<dyn KeyValueStorage>,
    key: String,
}

impl SessionPersistence {
    pub fn new(storage: Rc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cargar el blob. Un blob ausente o corrupto equivale a "sin sesión".
    pub fn load(&self) -> Option<PersistedSession> {
        let json = self.storage.get_item(&self.key)?;
        match serde_json::from_str::<PersistedSession>(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("⚠️ Sesión persistida ilegible, se ignora: {}", e);
                None
            }
        }
    }

    pub fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let json = serde_json::to_string(&PersistedSession::new(state.clone()))
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set_item(&self.key, &json)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)?;
        log::info!("🗑️ Sesión persistida eliminada");
        Ok(())
    }

    /// Token de acceso y empresa activa para las cabeceras de cada petición
    pub fn request_scope(&self) -> (Option<String>, Option<i64>) {
        match self.load() {
            Some(PersistedSession { state, .. }) => {
                let company = state.empresa_actual.map(|company| company.id);
                (state.token, company)
            }
            None => (None, None),
        }
    }
}
