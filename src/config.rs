use serde::{Deserialize, Serialize};

use crate::utils::constants::STORAGE_KEY_SESSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub storage_key: String,
    pub routes: RouteConfig,
}

/// Rutas de navegación usadas por las redirecciones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub login_path: String,
    pub access_denied_path: String,
    pub home_path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            access_denied_path: "/unauthorized".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: "http://localhost:8000/api".to_string(),
            backend_url_production: "https://api.rrhh.example.com/api".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            storage_key: STORAGE_KEY_SESSION.to_string(),
            routes: RouteConfig::default(),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url_development: option_env!("HR_BACKEND_URL_DEVELOPMENT")
                .map(str::to_string)
                .unwrap_or(defaults.backend_url_development),
            backend_url_production: option_env!("HR_BACKEND_URL_PRODUCTION")
                .map(str::to_string)
                .unwrap_or(defaults.backend_url_production),
            environment: option_env!("HR_ENVIRONMENT")
                .map(str::to_string)
                .unwrap_or(defaults.environment),
            enable_logging: option_env!("HR_ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            storage_key: option_env!("HR_STORAGE_KEY")
                .map(str::to_string)
                .unwrap_or(defaults.storage_key),
            routes: RouteConfig::default(),
        }
    }

    /// URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.backend_url_production,
            _ => &self.backend_url_development,
        }
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

// Configuración global estática (solo lectura)
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
