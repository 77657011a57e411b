pub mod role_gate;
pub mod routes;

pub use role_gate::{evaluate, GateDecision, RoleGate};
pub use routes::{resolve_route, Route, RouteOutcome};
