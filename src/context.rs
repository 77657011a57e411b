// ============================================================================
// APP CONTEXT - Servicios de la aplicación construidos una sola vez
// ============================================================================
// Se crea al arrancar y se inyecta (ContextProvider de Yew). Nada de globales.
// ============================================================================

use std::rc::Rc;

use crate::config::AppConfig;
use crate::services::{ApiClient, AuthService, CompanyService, HttpTransport, Navigator, SessionPersistence};
use crate::state::Session;
use crate::stores::SessionStore;
use crate::utils::KeyValueStorage;
use crate::viewmodels::{resolve_route, Route, RouteOutcome};

#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<AppConfig>,
    pub store: SessionStore,
    pub api: ApiClient,
    pub navigator: Rc<dyn Navigator>,
}

impl AppContext {
    /// Construye store, persistencia y adaptador HTTP y rehidrata la sesión
    pub fn new(
        config: AppConfig,
        transport: Rc<dyn HttpTransport>,
        storage: Rc<dyn KeyValueStorage>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let persistence = SessionPersistence::new(storage, config.storage_key.clone());
        let store = SessionStore::new(AuthService::new(transport.clone()), persistence.clone());
        let api = ApiClient::new(
            transport,
            persistence,
            Rc::new(store.clone()),
            navigator.clone(),
            config.routes.login_path.clone(),
        );

        if !store.hydrate() {
            log::info!("ℹ️ Sin sesión persistida");
        }

        Self {
            config: Rc::new(config),
            store,
            api,
            navigator,
        }
    }

    /// Contexto del navegador: fetch, localStorage y `window.location`
    #[cfg(target_arch = "wasm32")]
    pub fn browser(config: AppConfig) -> Self {
        use crate::services::{BrowserNavigator, GlooTransport};
        use crate::utils::BrowserStorage;

        let transport = Rc::new(GlooTransport::new(config.backend_url()));
        Self::new(config, transport, Rc::new(BrowserStorage), Rc::new(BrowserNavigator))
    }

    /// Sesión que ve la UI. Sin contexto inyectado no hay sesión: nunca se
    /// crea un segundo store sobre la misma clave.
    pub fn session_of(context: Option<&AppContext>) -> Session {
        match context {
            Some(context) => context.store.snapshot(),
            None => {
                log::error!("❌ Sin SessionProvider: la vista se trata como no autenticada");
                Session::empty()
            }
        }
    }

    pub fn companies(&self) -> CompanyService {
        CompanyService::new(self.api.clone())
    }

    pub fn resolve(&self, route: Route) -> RouteOutcome {
        self.store
            .with_session(|session| resolve_route(route, session, &self.config.routes))
    }
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        self.store.ptr_eq(&other.store) && Rc::ptr_eq(&self.config, &other.config)
    }
}
