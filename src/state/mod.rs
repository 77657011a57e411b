// ============================================================================
// STATE MODULE - Estado de sesión + notificaciones
// ============================================================================

pub mod reactivity;
pub mod session_state;

pub use reactivity::*;
pub use session_state::*;
