// ============================================================================
// ROLE GATE - Control de acceso por rol de cada vista protegida
// ============================================================================
// `evaluate` es una función pura de la sesión y la lista de roles permitidos.
// `RoleGate` la vuelve a evaluar en cada cambio de la sesión o de la lista.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::RouteConfig;
use crate::models::Role;
use crate::state::{Session, SubscriptionId};
use crate::stores::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Sin usuario o sin autenticar: al login
    Unauthenticated,
    /// Autenticado pero con rol fuera de la lista: a "acceso denegado"
    Forbidden,
    Allowed,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    /// Destino de la redirección, si la hay
    pub fn redirect_path<'a>(&self, routes: &'a RouteConfig) -> Option<&'a str> {
        match self {
            GateDecision::Unauthenticated => Some(&routes.login_path),
            GateDecision::Forbidden => Some(&routes.access_denied_path),
            GateDecision::Allowed => None,
        }
    }
}

pub fn evaluate(session: &Session, allowed: &[Role]) -> GateDecision {
    let user = match &session.user {
        Some(user) if session.is_authenticated => user,
        _ => return GateDecision::Unauthenticated,
    };
    if allowed.contains(&user.rol) {
        GateDecision::Allowed
    } else {
        GateDecision::Forbidden
    }
}

/// Puede gestionar (admin, rrhh, empleador)
pub fn can_manage(session: &Session) -> bool {
    session.role().map_or(false, Role::can_manage)
}

pub fn is_admin_or_hr(session: &Session) -> bool {
    session.role().map_or(false, Role::is_admin_or_hr)
}

struct GateState {
    allowed: RefCell<Vec<Role>>,
    decision: Cell<GateDecision>,
    on_change: Box<dyn Fn(GateDecision)>,
}

impl GateState {
    fn reevaluate(&self, session: &Session) {
        let decision = evaluate(session, &self.allowed.borrow());
        if decision != self.decision.replace(decision) {
            log::debug!("🛡️ Decisión de acceso: {:?}", decision);
            (self.on_change)(decision);
        }
    }
}

/// Guard reactivo: suscrito al store mientras vive
pub struct RoleGate {
    store: SessionStore,
    state: Rc<GateState>,
    subscription: SubscriptionId,
}

impl RoleGate {
    /// `on_change` se llama solo cuando la decisión cambia
    pub fn watch<F>(store: &SessionStore, allowed: Vec<Role>, on_change: F) -> Self
    where
        F: Fn(GateDecision) + 'static,
    {
        let decision = store.with_session(|session| evaluate(session, &allowed));
        let state = Rc::new(GateState {
            allowed: RefCell::new(allowed),
            decision: Cell::new(decision),
            on_change: Box::new(on_change),
        });
        let subscription = {
            let state = state.clone();
            store.subscribe(move |session| state.reevaluate(session))
        };
        Self {
            store: store.clone(),
            state,
            subscription,
        }
    }

    pub fn decision(&self) -> GateDecision {
        self.state.decision.get()
    }

    pub fn set_allowed_roles(&self, allowed: Vec<Role>) {
        *self.state.allowed.borrow_mut() = allowed;
        self.state.reevaluate(&self.store.snapshot());
    }
}

impl Drop for RoleGate {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
