pub mod protected_route;
pub mod session_provider;

pub use protected_route::{ProtectedRoute, ProtectedRouteProps};
pub use session_provider::{SessionProvider, SessionProviderProps};
