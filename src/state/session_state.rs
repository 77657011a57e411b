// ============================================================================
// SESSION STATE - Sesión de autenticación y su forma persistida
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::{Company, Role, User};
use crate::utils::constants::PERSIST_VERSION;

/// Estado completo de la sesión. `error` e `is_loading` son transitorios
/// y nunca se persisten.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub empresas: Vec<Company>,
    pub empresa_actual: Option<Company>,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl Session {
    /// Sesión vacía (estado tras logout)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rol efectivo, solo si hay usuario
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.rol)
    }

    /// Id de la empresa activa
    pub fn empresa_actual_id(&self) -> Option<i64> {
        self.empresa_actual.as_ref().map(|company| company.id)
    }

    pub fn has_company(&self, id: i64) -> bool {
        self.empresas.iter().any(|company| company.id == id)
    }

    /// `empresa_actual` debe ser null o un elemento de `empresas`:
    /// si desaparece de la lista se elige la primera disponible.
    pub fn reconcile_active_company(&mut self) {
        let current = self.empresa_actual_id();
        self.empresa_actual = current
            .and_then(|id| self.empresas.iter().find(|company| company.id == id))
            .or_else(|| self.empresas.first())
            .cloned();
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            user: self.user.clone(),
            token: self.token.clone(),
            refresh_token: self.refresh_token.clone(),
            is_authenticated: self.is_authenticated,
            empresas: self.empresas.clone(),
            empresa_actual: self.empresa_actual.clone(),
        }
    }

    /// Rehidratar: los campos transitorios vuelven a sus valores vacíos.
    /// `is_authenticated` solo se acepta si hay usuario y token; un blob
    /// incoherente se rehidrata como sesión vacía.
    pub fn from_persisted(state: PersistedState) -> Self {
        let has_identity = state.user.is_some() && state.token.is_some();
        if state.is_authenticated != has_identity {
            log::warn!(
                "⚠️ Blob de sesión incoherente (isAuthenticated={}, usuario={}, token={}), se descarta la identidad",
                state.is_authenticated,
                state.user.is_some(),
                state.token.is_some()
            );
            return Self::empty();
        }

        let mut session = Self {
            user: state.user,
            token: state.token,
            refresh_token: state.refresh_token,
            is_authenticated: state.is_authenticated,
            empresas: state.empresas,
            empresa_actual: state.empresa_actual,
            error: None,
            is_loading: false,
        };
        session.reconcile_active_company();
        session
    }
}

/// Subconjunto persistido de la sesión
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub empresas: Vec<Company>,
    #[serde(default)]
    pub empresa_actual: Option<Company>,
}

/// Envoltorio guardado bajo la clave fija: `{ "state": {...}, "version": 0 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: PersistedState,
    #[serde(default)]
    pub version: u32,
}

impl PersistedSession {
    pub fn new(state: PersistedState) -> Self {
        Self {
            state,
            version: PERSIST_VERSION,
        }
    }
}
