// ============================================================================
// AUTH SERVICE - Intercambio de credenciales y de refresh token
// ============================================================================
// Habla directamente con el transporte: estas llamadas no llevan cabeceras
// de sesión ni pasan por el reintento del adaptador.
// ============================================================================

use std::rc::Rc;

use serde::Serialize;

use crate::error::{ApiError, AuthError};
use crate::models::{ApiErrorBody, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
use crate::services::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::utils::constants::{LOGIN_ENDPOINT, REFRESH_ENDPOINT};

#[derive(Clone)]
pub struct AuthService {
    transport: Rc<dyn HttpTransport>,
}

impl AuthService {
    pub fn new(transport: Rc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Login con email y contraseña
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = json_post(LOGIN_ENDPOINT, &body)?;

        log::info!("🔐 Login para {}", email);
        let response = self.transport.send(&request).await?;

        if !response.ok() {
            let err = login_error(&response);
            log::warn!("❌ Login rechazado (HTTP {}): {}", response.status, err);
            return Err(err);
        }

        response
            .json::<LoginResponse>()
            .map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Cambiar el refresh token por un nuevo access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };
        let request = json_post(REFRESH_ENDPOINT, &body)?;

        let response = self.transport.send(&request).await?;
        if !response.ok() {
            return Err(AuthError::RefreshRejected(response.status));
        }

        response
            .json::<RefreshResponse>()
            .map(|refreshed| refreshed.access)
            .map_err(|e| AuthError::Decode(e.to_string()))
    }
}

fn json_post<T: Serialize>(path: &str, body: &T) -> Result<ApiRequest, AuthError> {
    ApiRequest::post(path).json(body).map_err(|e| match e {
        ApiError::Encode(message) => AuthError::Encode(message),
        other => AuthError::Encode(other.to_string()),
    })
}

/// 401 es siempre "credenciales incorrectas"; si no, el mensaje estructurado del cuerpo
fn login_error(response: &ApiResponse) -> AuthError {
    if response.is_unauthorized() {
        return AuthError::InvalidCredentials;
    }

    response
        .json::<ApiErrorBody>()
        .ok()
        .and_then(|body| body.message())
        .map(AuthError::Rejected)
        .unwrap_or(AuthError::LoginFailed(response.status))
}
