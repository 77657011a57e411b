// ============================================================================
// SESSION STORE - Única fuente de verdad de la sesión
// ============================================================================
// Servicio explícito (sin globales): se construye al arrancar y se inyecta.
// Cada mutación es síncrona, persiste el subconjunto durable y notifica.
// login/logout avanzan una generación: los resultados de operaciones
// asíncronas de una generación anterior se descartan.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};

use crate::error::{AuthError, SessionError};
use crate::models::{Company, User};
use crate::services::auth_service::AuthService;
use crate::services::persistence::SessionPersistence;
use crate::state::{Session, SubscriptionId, Subscribers};

type SharedRefresh = Shared<LocalBoxFuture<'static, Result<String, AuthError>>>;

/// Capacidad "refrescar sesión" que usa el adaptador HTTP ante un 401
#[async_trait(?Send)]
pub trait SessionRefresher {
    /// Devuelve el nuevo access token
    async fn refresh(&self) -> Result<String, AuthError>;
}

struct StoreInner {
    session: RefCell<Session>,
    auth: AuthService,
    persistence: SessionPersistence,
    generation: Cell<u64>,
    refresh_inflight: RefCell<Option<SharedRefresh>>,
    subscribers: Subscribers<Session>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<StoreInner>,
}

impl SessionStore {
    pub fn new(auth: AuthService, persistence: SessionPersistence) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                session: RefCell::new(Session::empty()),
                auth,
                persistence,
                generation: Cell::new(0),
                refresh_inflight: RefCell::new(None),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Cargar la sesión persistida antes del primer render.
    /// Devuelve false si no había nada utilizable.
    /// Si la rehidratación corrige el blob (empresa activa colgante, flag de
    /// autenticación incoherente) la versión corregida se vuelve a guardar.
    pub fn hydrate(&self) -> bool {
        match self.inner.persistence.load() {
            Some(persisted) => {
                let restored = Session::from_persisted(persisted.state.clone());
                let corrected = restored.to_persisted() != persisted.state;
                if corrected {
                    log::warn!("⚠️ Sesión persistida corregida al rehidratar");
                }
                self.mutate(corrected, move |session| *session = restored);
                log::info!("📋 Sesión rehidratada");
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    pub fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.inner.session.borrow())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Session) + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.subscribers.unsubscribe(id);
    }

    pub fn ptr_eq(&self, other: &SessionStore) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Login con email y contraseña. El detalle del fallo queda en `error`.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let generation = self.advance_generation();
        self.mutate(false, |session| {
            session.is_loading = true;
            session.error = None;
        });

        let result = self
            .inner
            .auth
            .login(email, password)
            .await
            .and_then(|response| User::from_backend(&response.usuario).map(|user| (user, response)));

        if self.inner.generation.get() != generation {
            log::warn!("⚠️ Resultado de login descartado: la sesión cambió mientras tanto");
            return false;
        }

        match result {
            Ok((user, response)) => {
                log::info!("✅ Login correcto: {} ({})", user.email, user.rol);
                self.mutate(true, move |session| {
                    session.user = Some(user);
                    session.token = Some(response.access);
                    session.refresh_token = Some(response.refresh);
                    session.is_authenticated = true;
                    session.empresas = response.usuario.empresas;
                    session.empresa_actual = session.empresas.first().cloned();
                    session.error = None;
                    session.is_loading = false;
                });
                true
            }
            Err(err) => {
                log::warn!("❌ Login fallido: {}", err);
                self.mutate(false, |session| {
                    session.error = Some(err.user_message());
                    session.is_loading = false;
                });
                false
            }
        }
    }

    /// Vuelve a la sesión vacía de una sola vez. Idempotente.
    pub fn logout(&self) {
        self.advance_generation();
        self.mutate(true, |session| *session = Session::empty());
        log::info!("👋 Logout");
    }

    /// Refrescar el access token. Ver [`SessionStore::refresh_session`].
    pub async fn refresh_access_token(&self) -> bool {
        self.refresh_session().await.is_ok()
    }

    /// Único camino de refresh. Las llamadas concurrentes comparten un solo
    /// intercambio en vuelo. Sin refresh token devuelve error sin tocar nada;
    /// si el backend rechaza el intercambio se hace logout completo.
    pub async fn refresh_session(&self) -> Result<String, AuthError> {
        let inflight = {
            let mut slot = self.inner.refresh_inflight.borrow_mut();
            match slot.as_ref() {
                Some(inflight) => inflight.clone(),
                None => {
                    let refresh_token = self.inner.session.borrow().refresh_token.clone();
                    let Some(refresh_token) = refresh_token else {
                        return Err(AuthError::MissingRefreshToken);
                    };
                    let shared = self.clone().run_refresh(refresh_token).boxed_local().shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };
        inflight.await
    }

    async fn run_refresh(self, refresh_token: String) -> Result<String, AuthError> {
        let generation = self.inner.generation.get();
        log::info!("🔄 Refrescando access token");
        let result = self.inner.auth.refresh(&refresh_token).await;

        if self.inner.generation.get() != generation {
            log::warn!("⚠️ Refresh descartado: la sesión cambió mientras tanto");
            return Err(AuthError::Superseded);
        }
        self.inner.refresh_inflight.borrow_mut().take();

        match result {
            Ok(access) => {
                let token = access.clone();
                self.mutate(true, move |session| session.token = Some(token));
                log::info!("✅ Access token renovado");
                Ok(access)
            }
            Err(err) => {
                log::warn!("❌ Refresh fallido, cerrando sesión: {}", err);
                self.logout();
                Err(err)
            }
        }
    }

    /// Cambiar de empresa activa. Solo se aceptan empresas de `empresas`.
    pub fn set_active_company(&self, company: Company) -> Result<(), SessionError> {
        if !self.with_session(|session| session.has_company(company.id)) {
            log::warn!("⚠️ Empresa {} no disponible para el usuario", company.id);
            return Err(SessionError::UnknownCompany(company.id));
        }
        log::info!("🏢 Empresa activa: {}", company.id);
        self.mutate(true, move |session| session.empresa_actual = Some(company));
        Ok(())
    }

    /// Reemplazar la lista de empresas y reconciliar la empresa activa
    pub fn set_companies(&self, companies: Vec<Company>) {
        self.mutate(true, move |session| {
            session.empresas = companies;
            session.reconcile_active_company();
        });
    }

    pub fn clear_error(&self) {
        self.mutate(false, |session| session.error = None);
    }

    /// Nueva generación: el refresh en vuelo (si lo hay) queda huérfano y
    /// el slot se libera para el siguiente intercambio.
    fn advance_generation(&self) -> u64 {
        let next = self.inner.generation.get() + 1;
        self.inner.generation.set(next);
        self.inner.refresh_inflight.borrow_mut().take();
        next
    }

    fn mutate<F>(&self, persist: bool, f: F)
    where
        F: FnOnce(&mut Session),
    {
        let snapshot = {
            let mut session = self.inner.session.borrow_mut();
            f(&mut session);
            session.clone()
        };
        if persist {
            if let Err(e) = self.inner.persistence.save(&snapshot.to_persisted()) {
                log::error!("❌ Error guardando sesión: {}", e);
            }
        }
        self.inner.subscribers.notify(&snapshot);
    }
}

#[async_trait(?Send)]
impl SessionRefresher for SessionStore {
    async fn refresh(&self) -> Result<String, AuthError> {
        self.refresh_session().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Role;
    use crate::services::transport::Method;
    use crate::testing::{company, company_json, login_body, Counter, MockTransport};
    use crate::utils::constants::{LOGIN_ENDPOINT, REFRESH_ENDPOINT};
    use crate::utils::{KeyValueStorage, MemoryStorage};

    struct Fixture {
        transport: Rc<MockTransport>,
        storage: Rc<MemoryStorage>,
        store: SessionStore,
    }

    fn fixture() -> Fixture {
        let transport = MockTransport::new();
        let storage = Rc::new(MemoryStorage::new());
        let persistence = SessionPersistence::new(storage.clone(), "auth-storage");
        let store = SessionStore::new(AuthService::new(transport.clone()), persistence);
        Fixture {
            transport,
            storage,
            store,
        }
    }

    fn assert_consistent(session: &Session) {
        assert_eq!(
            session.is_authenticated,
            session.user.is_some() && session.token.is_some()
        );
    }

    async fn logged_in(rol: &str, companies: &[i64]) -> Fixture {
        let fx = fixture();
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 200, login_body(rol, companies));
        assert!(fx.store.login("marta@acme.es", "secreto").await);
        fx
    }

    #[tokio::test]
    async fn login_success_populates_session() {
        let fx = logged_in("rrhh", &[1, 2]).await;
        let session = fx.store.snapshot();

        let user = session.user.as_ref().unwrap();
        assert_eq!(user.nombre, "Marta Ruiz");
        assert_eq!(user.rol, Role::Rrhh);
        assert_eq!(session.token.as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(session.empresas, vec![company(1), company(2)]);
        assert_eq!(session.empresa_actual, Some(company(1)));
        assert!(!session.is_loading);
        assert_eq!(session.error, None);
        assert_consistent(&session);
    }

    #[tokio::test]
    async fn login_success_persists_session() {
        let fx = logged_in("empleado", &[]).await;
        let blob: serde_json::Value =
            serde_json::from_str(&fx.storage.get_item("auth-storage").unwrap()).unwrap();

        assert_eq!(blob["state"]["token"], "access-1");
        assert_eq!(blob["state"]["isAuthenticated"], true);
        assert_eq!(blob["state"]["empresaActual"], serde_json::Value::Null);
        assert!(blob["state"].get("error").is_none());
    }

    #[tokio::test]
    async fn login_401_sets_fixed_message() {
        let fx = fixture();
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 401, json!({"detail": "nope"}));

        assert!(!fx.store.login("marta@acme.es", "mal").await);
        let session = fx.store.snapshot();
        assert_eq!(session.error.as_deref(), Some("Credenciales incorrectas"));
        assert!(!session.is_loading);
        assert_eq!(session.user, None);
        assert_consistent(&session);
        assert_eq!(fx.storage.get_item("auth-storage"), None);
    }

    #[tokio::test]
    async fn login_failure_uses_backend_message() {
        let fx = fixture();
        fx.transport.respond(
            Method::Post,
            LOGIN_ENDPOINT,
            400,
            json!({"non_field_errors": ["Usuario inactivo"]}),
        );
        assert!(!fx.store.login("a@b.c", "x").await);
        assert_eq!(fx.store.snapshot().error.as_deref(), Some("Usuario inactivo"));

        fx.transport.fail(Method::Post, LOGIN_ENDPOINT, "offline");
        assert!(!fx.store.login("a@b.c", "x").await);
        assert_eq!(fx.store.snapshot().error.as_deref(), Some("Error al iniciar sesión"));
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_identity() {
        let fx = logged_in("admin", &[1]).await;
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 401, json!({}));

        assert!(!fx.store.login("otro@acme.es", "x").await);
        let session = fx.store.snapshot();
        assert_eq!(session.token.as_deref(), Some("access-1"));
        assert!(session.is_authenticated);
        assert_consistent(&session);
    }

    #[tokio::test]
    async fn login_rejects_unknown_role() {
        let fx = fixture();
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 200, login_body("superadmin", &[1]));

        assert!(!fx.store.login("a@b.c", "x").await);
        let session = fx.store.snapshot();
        assert_eq!(session.error.as_deref(), Some("Rol de usuario no reconocido"));
        assert!(!session.is_authenticated);
        assert_eq!(session.token, None);
    }

    #[tokio::test]
    async fn logout_is_total_and_idempotent() {
        let fx = logged_in("admin", &[1, 2]).await;
        fx.store.logout();
        let once = fx.store.snapshot();
        fx.store.logout();
        let twice = fx.store.snapshot();

        assert_eq!(once, Session::empty());
        assert_eq!(once, twice);

        let blob: serde_json::Value =
            serde_json::from_str(&fx.storage.get_item("auth-storage").unwrap()).unwrap();
        assert_eq!(blob["state"]["isAuthenticated"], false);
        assert_eq!(blob["state"]["token"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn logout_during_login_wins() {
        let fx = fixture();
        fx.transport
            .respond_suspended(Method::Post, LOGIN_ENDPOINT, 200, login_body("admin", &[1]));

        let login = fx.store.login("marta@acme.es", "secreto");
        let logout = async {
            fx.store.logout();
        };
        let (ok, ()) = tokio::join!(login, logout);

        assert!(!ok);
        assert_eq!(fx.store.snapshot(), Session::empty());
    }

    #[tokio::test]
    async fn company_switch_reconciles_dangling_selection() {
        let fx = logged_in("empleador", &[1, 2]).await;
        assert_eq!(fx.store.snapshot().empresa_actual_id(), Some(1));

        fx.store.set_companies(vec![company(2), company(3)]);
        assert_eq!(fx.store.snapshot().empresa_actual_id(), Some(2));

        fx.store.set_active_company(company(3)).unwrap();
        fx.store.set_companies(vec![company(4), company(3)]);
        assert_eq!(fx.store.snapshot().empresa_actual_id(), Some(3));

        fx.store.set_companies(Vec::new());
        assert_eq!(fx.store.snapshot().empresa_actual, None);
    }

    #[tokio::test]
    async fn set_active_company_rejects_foreign_company() {
        let fx = logged_in("admin", &[1, 2]).await;
        assert_eq!(
            fx.store.set_active_company(company(9)),
            Err(SessionError::UnknownCompany(9))
        );
        assert_eq!(fx.store.snapshot().empresa_actual_id(), Some(1));

        fx.store.set_active_company(company(2)).unwrap();
        assert_eq!(fx.store.snapshot().empresa_actual_id(), Some(2));
    }

    #[tokio::test]
    async fn clear_error_only_touches_error() {
        let fx = fixture();
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 401, json!({}));
        fx.store.login("a@b.c", "x").await;

        let mut expected = fx.store.snapshot();
        expected.error = None;
        fx.store.clear_error();
        assert_eq!(fx.store.snapshot(), expected);
    }

    #[tokio::test]
    async fn refresh_without_token_has_no_side_effects() {
        let fx = fixture();
        let notified = Counter::default();
        {
            let notified = notified.clone();
            fx.store.subscribe(move |_| notified.hit());
        }

        assert!(!fx.store.refresh_access_token().await);
        assert_eq!(fx.store.snapshot(), Session::empty());
        assert_eq!(notified.get(), 0);
        assert!(fx.transport.requests().is_empty());
        assert!(fx.storage.is_empty());
    }

    #[tokio::test]
    async fn refresh_replaces_only_access_token() {
        let fx = logged_in("admin", &[1]).await;
        fx.transport.respond(Method::Post, REFRESH_ENDPOINT, 200, json!({"access": "access-2"}));
        let before = fx.store.snapshot();

        assert!(fx.store.refresh_access_token().await);
        let mut expected = before;
        expected.token = Some("access-2".to_string());
        assert_eq!(fx.store.snapshot(), expected);

        let blob: serde_json::Value =
            serde_json::from_str(&fx.storage.get_item("auth-storage").unwrap()).unwrap();
        assert_eq!(blob["state"]["token"], "access-2");
        assert_eq!(blob["state"]["refreshToken"], "refresh-1");
    }

    #[tokio::test]
    async fn refresh_failure_logs_out() {
        let fx = logged_in("admin", &[1]).await;
        fx.transport.respond(Method::Post, REFRESH_ENDPOINT, 401, json!({}));

        assert!(!fx.store.refresh_access_token().await);
        assert_eq!(fx.store.snapshot(), Session::empty());
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_exchange() {
        let fx = logged_in("admin", &[1]).await;
        let gate =
            fx.transport
                .respond_gated(Method::Post, REFRESH_ENDPOINT, 200, json!({"access": "access-2"}));

        let (a, b, c, ()) = tokio::join!(
            fx.store.refresh_session(),
            fx.store.refresh_session(),
            fx.store.refresh_session(),
            async { gate.open() }
        );

        assert_eq!(a, Ok("access-2".to_string()));
        assert_eq!(b, a);
        assert_eq!(c, a);
        assert_eq!(fx.transport.requests_to(Method::Post, REFRESH_ENDPOINT).len(), 1);

        // El slot queda libre: un refresh posterior hace un nuevo intercambio
        fx.transport.respond(Method::Post, REFRESH_ENDPOINT, 200, json!({"access": "access-3"}));
        assert_eq!(fx.store.refresh_session().await, Ok("access-3".to_string()));
        assert_eq!(fx.transport.requests_to(Method::Post, REFRESH_ENDPOINT).len(), 2);
    }

    #[tokio::test]
    async fn refresh_resolving_after_logout_is_discarded() {
        let fx = logged_in("admin", &[1]).await;
        fx.transport
            .respond_suspended(Method::Post, REFRESH_ENDPOINT, 200, json!({"access": "access-2"}));

        let refresh = fx.store.refresh_session();
        let logout = async {
            fx.store.logout();
        };
        let (result, ()) = tokio::join!(refresh, logout);

        assert_eq!(result, Err(AuthError::Superseded));
        assert_eq!(fx.store.snapshot(), Session::empty());
    }

    #[tokio::test]
    async fn login_during_refresh_frees_single_flight_slot() {
        let fx = logged_in("admin", &[1]).await;
        fx.transport
            .respond_suspended(Method::Post, REFRESH_ENDPOINT, 200, json!({"access": "access-2"}));
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 200, login_body("admin", &[1]));

        let (refreshed, logged) = tokio::join!(
            fx.store.refresh_session(),
            fx.store.login("marta@acme.es", "secreto")
        );
        assert_eq!(refreshed, Err(AuthError::Superseded));
        assert!(logged);

        fx.transport
            .respond(Method::Post, REFRESH_ENDPOINT, 200, json!({"access": "access-3"}));
        assert_eq!(fx.store.refresh_session().await, Ok("access-3".to_string()));
        assert_eq!(fx.transport.requests_to(Method::Post, REFRESH_ENDPOINT).len(), 2);
        assert_eq!(fx.store.snapshot().token.as_deref(), Some("access-3"));
    }

    #[test]
    fn hydrate_writes_back_corrected_company() {
        let fx = fixture();
        let blob = json!({
            "state": {
                "user": {"id": 1, "email": "a@b.c", "nombre": "A", "rol": "rrhh"},
                "token": "access-1",
                "refreshToken": "refresh-1",
                "isAuthenticated": true,
                "empresas": [company_json(1), company_json(2)],
                "empresaActual": company_json(9)
            },
            "version": 0
        });
        fx.storage.set_item("auth-storage", &blob.to_string()).unwrap();

        assert!(fx.store.hydrate());
        assert_eq!(fx.store.snapshot().empresa_actual, Some(company(1)));

        let persistence = SessionPersistence::new(fx.storage.clone(), "auth-storage");
        assert_eq!(persistence.request_scope(), (Some("access-1".to_string()), Some(1)));
    }

    #[test]
    fn hydrate_drops_inconsistent_authentication_flag() {
        let fx = fixture();
        let blob = json!({
            "state": {
                "user": {"id": 1, "email": "a@b.c", "nombre": "A", "rol": "admin"},
                "token": null,
                "isAuthenticated": true
            },
            "version": 0
        });
        fx.storage.set_item("auth-storage", &blob.to_string()).unwrap();

        assert!(fx.store.hydrate());
        let session = fx.store.snapshot();
        assert!(!session.is_authenticated);
        assert_consistent(&session);

        let stored: serde_json::Value =
            serde_json::from_str(&fx.storage.get_item("auth-storage").unwrap()).unwrap();
        assert_eq!(stored["state"]["isAuthenticated"], false);
    }

    #[tokio::test]
    async fn hydrate_round_trip() {
        let fx = logged_in("empleador", &[1, 2]).await;
        fx.store.set_active_company(company(2)).unwrap();
        let original = fx.store.snapshot();

        let rehydrated = SessionStore::new(
            AuthService::new(fx.transport.clone()),
            SessionPersistence::new(fx.storage.clone(), "auth-storage"),
        );
        assert!(rehydrated.hydrate());
        assert_eq!(rehydrated.snapshot().to_persisted(), original.to_persisted());
        assert_eq!(rehydrated.snapshot().error, None);
        assert!(!rehydrated.snapshot().is_loading);
    }

    #[test]
    fn hydrate_ignores_malformed_blob() {
        let fx = fixture();
        fx.storage.set_item("auth-storage", "][").unwrap();
        assert!(!fx.store.hydrate());
        assert_eq!(fx.store.snapshot(), Session::empty());
    }

    #[tokio::test]
    async fn subscribers_see_every_mutation() {
        let fx = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            fx.store
                .subscribe(move |session: &Session| seen.borrow_mut().push(session.is_loading));
        }
        fx.transport.respond(Method::Post, LOGIN_ENDPOINT, 200, login_body("admin", &[1]));
        fx.store.login("a@b.c", "x").await;

        assert_eq!(*seen.borrow(), vec![true, false]);
    }
}
