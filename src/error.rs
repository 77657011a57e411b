// ============================================================================
// ERRORES - Taxonomía de fallos de sesión, API y almacenamiento
// ============================================================================

use thiserror::Error;

/// Mensaje fijo para credenciales rechazadas (HTTP 401 en login)
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Credenciales incorrectas";
/// Mensaje genérico cuando el backend no da detalle
pub const GENERIC_LOGIN_MESSAGE: &str = "Error al iniciar sesión";
pub const UNKNOWN_ROLE_MESSAGE: &str = "Rol de usuario no reconocido";

/// Fallos de autenticación (login y refresh)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credenciales incorrectas")]
    InvalidCredentials,

    #[error("el backend rechazó la petición: {0}")]
    Rejected(String),

    /// Rechazo sin mensaje estructurado en el cuerpo
    #[error("login rechazado con HTTP {0}")]
    LoginFailed(u16),

    #[error("error de red: {0}")]
    Transport(String),

    #[error("no se pudo serializar la petición: {0}")]
    Encode(String),

    #[error("respuesta ilegible: {0}")]
    Decode(String),

    #[error("no hay refresh token")]
    MissingRefreshToken,

    #[error("refresh rechazado con HTTP {0}")]
    RefreshRejected(u16),

    #[error("rol desconocido: '{0}'")]
    UnknownRole(String),

    /// La operación terminó después de un logout/login posterior
    #[error("operación de sesión obsoleta")]
    Superseded,
}

impl AuthError {
    /// Texto que se muestra bajo el formulario de login
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AuthError::Rejected(message) => message.clone(),
            AuthError::UnknownRole(_) => UNKNOWN_ROLE_MESSAGE.to_string(),
            _ => GENERIC_LOGIN_MESSAGE.to_string(),
        }
    }
}

/// Fallos de llamadas al API de dominio
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("error de red: {0}")]
    Transport(String),

    #[error("no se pudo serializar la petición: {0}")]
    Encode(String),

    #[error("respuesta ilegible: {0}")]
    Decode(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// El refresh falló: sesión borrada y navegación forzada al login
    #[error("la sesión ha expirado")]
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("la empresa {0} no pertenece al usuario")]
    UnknownCompany(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("almacenamiento no disponible")]
    Unavailable,

    #[error("error guardando en almacenamiento: {0}")]
    Write(String),

    #[error("error borrando del almacenamiento: {0}")]
    Remove(String),

    #[error("error serializando: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        AuthError::Transport(err.0)
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.0)
    }
}
