// ============================================================================
// GLOO TRANSPORT - Transporte HTTP del navegador (fetch vía gloo-net)
// ============================================================================

use async_trait::async_trait;
use gloo_net::http::Request;

use crate::error::TransportError;
use crate::services::transport::{ApiRequest, ApiResponse, HttpTransport, Method};

#[derive(Debug, Clone)]
pub struct GlooTransport {
    base_url: String,
}

impl GlooTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Patch => Request::patch(&url),
            Method::Delete => Request::delete(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match &request.body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(body.clone()),
            None => builder.build(),
        }
        .map_err(|e| TransportError(format!("Request build error: {}", e)))?;

        let response = prepared
            .send()
            .await
            .map_err(|e| TransportError(format!("Network error: {}", e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Read error: {}", e)))?;

        if status >= 400 {
            log::debug!("HTTP {} en {} {}", status, request.method.as_str(), request.path);
        }
        Ok(ApiResponse::new(status, body))
    }
}
