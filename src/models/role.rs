use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AuthError;

/// Rol del usuario dentro del portal. Conjunto cerrado: cualquier valor
/// desconocido que llegue del backend se rechaza en la frontera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Rrhh,
    Empleador,
    Empleado,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Rrhh, Role::Empleador, Role::Empleado];

    /// Rol de menor privilegio
    pub const LOWEST: Role = Role::Empleado;

    pub fn lowest() -> Role {
        Role::LOWEST
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Rrhh => "rrhh",
            Role::Empleador => "empleador",
            Role::Empleado => "empleado",
        }
    }

    /// Parsear el campo `rol` crudo del backend. Ausente o desconocido es error.
    pub fn parse(raw: Option<&str>) -> Result<Role, AuthError> {
        match raw {
            Some(value) => value.parse(),
            None => Err(AuthError::UnknownRole(String::new())),
        }
    }

    /// Puede gestionar empleados, nóminas y contratos
    pub fn can_manage(self) -> bool {
        matches!(self, Role::Admin | Role::Rrhh | Role::Empleador)
    }

    pub fn is_admin_or_hr(self) -> bool {
        matches!(self, Role::Admin | Role::Rrhh)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "rrhh" => Ok(Role::Rrhh),
            "empleador" => Ok(Role::Empleador),
            "empleado" => Ok(Role::Empleado),
            _ => Err(AuthError::UnknownRole(s.to_string())),
        }
    }
}

/// Lectura tolerante del rol ya persistido: ausente o desconocido cuenta
/// como el rol de menor privilegio.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::parse::<Role>) {
        Some(Ok(role)) => role,
        _ => {
            log::warn!("⚠️ Rol persistido no reconocido ({:?}), usando {}", raw, Role::LOWEST);
            Role::LOWEST
        }
    })
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
