// ============================================================================
// API CLIENT - Adaptador HTTP con interceptores de sesión
// ============================================================================
// Salida: añade `Authorization: Bearer` y `X-Empresa-ID` leyendo la sesión
// persistida (si no se puede leer, la petición sale sin credenciales).
// Entrada: ante un 401 de una petición no reintentada, refresca la sesión
// una sola vez y reenvía. Si el refresh falla se borra la sesión persistida
// y se fuerza la navegación al login.
// ============================================================================

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, AuthError};
use crate::services::navigation::Navigator;
use crate::services::persistence::SessionPersistence;
use crate::services::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::stores::SessionRefresher;
use crate::utils::constants::{HEADER_AUTHORIZATION, HEADER_COMPANY};

#[derive(Clone)]
pub struct ApiClient {
    transport: Rc<dyn HttpTransport>,
    persistence: SessionPersistence,
    refresher: Rc<dyn SessionRefresher>,
    navigator: Rc<dyn Navigator>,
    login_path: String,
}

impl ApiClient {
    pub fn new(
        transport: Rc<dyn HttpTransport>,
        persistence: SessionPersistence,
        refresher: Rc<dyn SessionRefresher>,
        navigator: Rc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            persistence,
            refresher,
            navigator,
            login_path: login_path.into(),
        }
    }

    /// Interceptor de salida
    fn authorize(&self, mut request: ApiRequest) -> ApiRequest {
        let (token, company_id) = self.persistence.request_scope();
        if let Some(token) = token {
            request.set_header(HEADER_AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(company_id) = company_id {
            request.set_header(HEADER_COMPANY, company_id.to_string());
        }
        request
    }

    /// Enviar una petición. Los estados HTTP no exitosos se devuelven como
    /// respuesta; solo los fallos de red y la sesión expirada son `Err`.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.transport.send(&self.authorize(request.clone())).await?;
        if !response.is_unauthorized() || request.retried {
            return Ok(response);
        }

        let mut retry = request;
        retry.retried = true;
        log::info!("🔑 401 en {} {}, refrescando sesión", retry.method.as_str(), retry.path);

        match self.refresher.refresh().await {
            Ok(access) => {
                let mut retry = self.authorize(retry);
                retry.set_header(HEADER_AUTHORIZATION, format!("Bearer {}", access));
                Ok(self.transport.send(&retry).await?)
            }
            Err(AuthError::Superseded) => Ok(response),
            Err(err) => {
                log::warn!("❌ Sesión expirada ({}), redirigiendo al login", err);
                if let Err(e) = self.persistence.clear() {
                    log::warn!("⚠️ No se pudo borrar la sesión persistida: {}", e);
                }
                self.navigator.navigate(&self.login_path);
                Err(ApiError::SessionExpired)
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(ApiRequest::get(path)).await?;
        decode(response)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self.send(ApiRequest::post(path).json(body)?).await?;
        decode(response)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self.send(ApiRequest::put(path).json(body)?).await?;
        decode(response)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(ApiRequest::delete(path)).await?;
        if response.ok() {
            Ok(())
        } else {
            Err(status_error(response))
        }
    }
}

fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    if !response.ok() {
        return Err(status_error(response));
    }
    response.json().map_err(|e| ApiError::Decode(e.to_string()))
}

fn status_error(response: ApiResponse) -> ApiError {
    ApiError::Status {
        status: response.status,
        body: response.body,
    }
}
