// ============================================================================
// ROUTES - Tabla de vistas y guard de navegación
// ============================================================================

use crate::config::RouteConfig;
use crate::models::Role;
use crate::state::Session;
use crate::viewmodels::role_gate::{evaluate, GateDecision};

const ALL_ROLES: &[Role] = &Role::ALL;
const MANAGERS: &[Role] = &[Role::Admin, Role::Rrhh, Role::Empleador];
const ADMIN_OR_HR: &[Role] = &[Role::Admin, Role::Rrhh];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Empleados,
    Nominas,
    Contratos,
    Vacaciones,
    Desempeno,
    Reportes,
    Chat,
    Perfil,
    Unauthorized,
    NotFound,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Empleados => "/empleados",
            Route::Nominas => "/nominas",
            Route::Contratos => "/contratos",
            Route::Vacaciones => "/vacaciones",
            Route::Desempeno => "/desempeno",
            Route::Reportes => "/reportes",
            Route::Chat => "/chat",
            Route::Perfil => "/perfil",
            Route::Unauthorized => "/unauthorized",
            Route::NotFound => "/404",
        }
    }

    /// Ruta por el primer segmento del path ("/empleados/12/editar" -> Empleados)
    pub fn from_path(path: &str) -> Route {
        let segment = path
            .trim_start_matches('/')
            .split(|c: char| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or("");
        match segment {
            "" | "dashboard" => Route::Dashboard,
            "login" => Route::Login,
            "empleados" => Route::Empleados,
            "nominas" => Route::Nominas,
            "contratos" => Route::Contratos,
            "vacaciones" => Route::Vacaciones,
            "desempeno" => Route::Desempeno,
            "reportes" => Route::Reportes,
            "chat" => Route::Chat,
            "perfil" => Route::Perfil,
            "unauthorized" => Route::Unauthorized,
            _ => Route::NotFound,
        }
    }

    /// Roles admitidos; `None` para las vistas públicas
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Login | Route::Unauthorized | Route::NotFound => None,
            Route::Dashboard | Route::Nominas | Route::Vacaciones | Route::Chat | Route::Perfil => {
                Some(ALL_ROLES)
            }
            Route::Empleados | Route::Contratos | Route::Desempeno => Some(MANAGERS),
            Route::Reportes => Some(ADMIN_OR_HR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Render,
    Redirect(String),
}

/// Sin sesión se va al login; con sesión no se muestra el login.
/// Las vistas protegidas pasan por el role gate.
pub fn resolve_route(route: Route, session: &Session, routes: &RouteConfig) -> RouteOutcome {
    let Some(allowed) = route.allowed_roles() else {
        let authenticated = session.is_authenticated && session.user.is_some();
        if route == Route::Login && authenticated {
            return RouteOutcome::Redirect(routes.home_path.clone());
        }
        return RouteOutcome::Render;
    };

    match evaluate(session, allowed) {
        GateDecision::Allowed => RouteOutcome::Render,
        decision => decision
            .redirect_path(routes)
            .map(|path| RouteOutcome::Redirect(path.to_string()))
            .unwrap_or(RouteOutcome::Render),
    }
}
