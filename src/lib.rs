// ============================================================================
// HR PORTAL - CLIENTE WEB MULTIEMPRESA (RUST + WASM)
// ============================================================================
// Capas:
// - Models: Estructuras compartidas con backend
// - State: Sesión en memoria + forma persistida
// - Stores: SessionStore, única fuente de verdad de la sesión
// - Services: Adaptador HTTP (tokens, empresa activa, refresh) y persistencia
// - ViewModels: Guard de roles y tabla de rutas
// - Components/Hooks: Integración con Yew (solo wasm32)
// ============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod stores;
pub mod utils;
pub mod viewmodels;

#[cfg(target_arch = "wasm32")]
pub mod components;
#[cfg(target_arch = "wasm32")]
pub mod hooks;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, CONFIG};
pub use context::AppContext;
pub use error::{ApiError, AuthError, SessionError, StorageError};
pub use stores::SessionStore;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Panic hook + logger del navegador
#[cfg(target_arch = "wasm32")]
pub fn init_browser(config: &AppConfig) {
    console_error_panic_hook::set_once();

    let level = if config.is_logging_enabled() {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    wasm_logger::init(wasm_logger::Config::new(level));

    log::info!(
        "🚀 HR Portal ({}) - backend {}",
        config.environment,
        config.backend_url()
    );
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    init_browser(&CONFIG);
}
