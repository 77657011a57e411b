// ============================================================================
// PROTECTED ROUTE - Guard de rol sobre una vista
// ============================================================================
// Nunca renderiza contenido parcial: o los hijos completos o la redirección.
// ============================================================================

use yew::prelude::*;

use crate::hooks::use_session;
use crate::models::Role;
use crate::viewmodels::{evaluate, GateDecision};

#[derive(Properties, PartialEq)]
pub struct ProtectedRouteProps {
    /// Por defecto basta con estar autenticado
    #[prop_or_else(|| Role::ALL.to_vec())]
    pub allowed_roles: Vec<Role>,
    pub children: Children,
}

#[function_component(ProtectedRoute)]
pub fn protected_route(props: &ProtectedRouteProps) -> Html {
    let handle = use_session();
    let decision = handle
        .as_ref()
        .map(|handle| evaluate(&handle.session, &props.allowed_roles));

    {
        let context = handle.as_ref().map(|handle| handle.context.clone());
        use_effect_with(decision, move |decision| {
            if let (Some(decision), Some(context)) = (decision, context) {
                if let Some(path) = decision.redirect_path(&context.config.routes) {
                    log::info!("🔀 Redirigiendo a {}", path);
                    context.navigator.navigate(path);
                }
            }
        });
    }

    match decision {
        Some(GateDecision::Allowed) => html! { <>{props.children.clone()}</> },
        Some(GateDecision::Unauthenticated) => html! {
            <div class="route-loading">{"Cargando..."}</div>
        },
        Some(GateDecision::Forbidden) | None => html! {},
    }
}
