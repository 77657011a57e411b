use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::models::auth::BackendUser;
use crate::models::Role;

/// Usuario autenticado tal y como lo guarda la sesión
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub nombre: String,
    #[serde(default = "Role::lowest", deserialize_with = "crate::models::role::deserialize_lenient")]
    pub rol: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empleado: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<i64>,
}

impl User {
    /// Construir el usuario desde los campos crudos del login.
    /// El rol se valida aquí: un rol desconocido no entra en la sesión.
    pub fn from_backend(raw: &BackendUser) -> Result<Self, AuthError> {
        let rol = Role::parse(raw.rol.as_deref())?;
        Ok(Self {
            id: raw.id,
            email: raw.email.clone(),
            nombre: display_name(raw.nombre.as_deref(), raw.apellidos.as_deref(), &raw.email),
            rol,
            empleado: raw.empleado,
            empresa: raw.empresa,
        })
    }
}

/// "Nombre Apellidos", o el email si ambos están vacíos
pub fn display_name(nombre: Option<&str>, apellidos: Option<&str>, email: &str) -> String {
    let full = [nombre, apellidos]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if full.is_empty() {
        email.to_string()
    } else {
        full
    }
}
