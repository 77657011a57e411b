pub mod api_client;
pub mod auth_service;
pub mod company_service;
#[cfg(target_arch = "wasm32")]
pub mod gloo_transport;
pub mod navigation;
pub mod persistence;
pub mod transport;

pub use api_client::ApiClient;
pub use auth_service::AuthService;
pub use company_service::CompanyService;
#[cfg(target_arch = "wasm32")]
pub use gloo_transport::GlooTransport;
#[cfg(target_arch = "wasm32")]
pub use navigation::BrowserNavigator;
pub use navigation::Navigator;
pub use persistence::SessionPersistence;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method};
