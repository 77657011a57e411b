/// Clave del blob persistido de sesión en localStorage
pub const STORAGE_KEY_SESSION: &str = "auth-storage";

/// Versión del envoltorio `{ state, version }`
pub const PERSIST_VERSION: u32 = 0;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
/// Cabecera con el id de la empresa activa
pub const HEADER_COMPANY: &str = "X-Empresa-ID";

pub const LOGIN_ENDPOINT: &str = "/usuarios/login/";
pub const REFRESH_ENDPOINT: &str = "/usuarios/token/refresh/";
pub const COMPANIES_ENDPOINT: &str = "/empresas/";
