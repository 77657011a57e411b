pub mod auth;
pub mod company;
pub mod role;
pub mod user;

pub use auth::{ApiErrorBody, BackendUser, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
pub use company::Company;
pub use role::Role;
pub use user::User;
