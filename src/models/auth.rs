use serde::{Deserialize, Serialize};

use crate::models::Company;

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub usuario: BackendUser,
}

/// Usuario tal y como lo devuelve `/usuarios/login/`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct BackendUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default)]
    pub empresas: Vec<Company>,
    #[serde(default)]
    pub empleado: Option<i64>,
    #[serde(default)]
    pub empresa: Option<i64>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub access: String,
}

/// Cuerpo de error estructurado del backend
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub non_field_errors: Vec<String>,
}

impl ApiErrorBody {
    /// Mensaje con prioridad `detail` > `error` > primer `non_field_errors`
    pub fn message(&self) -> Option<String> {
        self.detail
            .clone()
            .or_else(|| self.error.clone())
            .or_else(|| self.non_field_errors.first().cloned())
    }
}
