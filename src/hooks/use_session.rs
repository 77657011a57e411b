// ============================================================================
// USE SESSION - Hook de Yew sobre el SessionStore
// ============================================================================
// La vista nunca muta la sesión directamente: todo pasa por los callbacks,
// que delegan en las operaciones del store. Exige un SessionProvider.
// ============================================================================

use yew::prelude::*;

use crate::context::AppContext;
use crate::models::Company;
use crate::state::Session;

#[derive(Clone, PartialEq)]
pub struct UseSessionHandle {
    pub context: AppContext,
    pub session: Session,
    pub login: Callback<(String, String)>,
    pub logout: Callback<()>,
    pub select_company: Callback<Company>,
    pub clear_error: Callback<()>,
}

/// `None` si no hay `SessionProvider` por encima
#[hook]
pub fn use_session() -> Option<UseSessionHandle> {
    let context = use_context::<AppContext>();
    let session = use_state(|| AppContext::session_of(context.as_ref()));

    // Suscripción al store mientras el componente esté montado
    {
        let setter = session.setter();
        use_effect_with(context.clone(), move |context| {
            let subscription = context.as_ref().map(|context| {
                let store = context.store.clone();
                setter.set(store.snapshot());
                let id = {
                    let setter = setter.clone();
                    store.subscribe(move |snapshot| setter.set(snapshot.clone()))
                };
                (store, id)
            });
            move || {
                if let Some((store, id)) = subscription {
                    store.unsubscribe(id);
                }
            }
        });
    }

    // Empresas frescas del backend al montar con sesión activa
    use_effect_with(context.clone(), move |context| {
        if let Some(context) = context.clone() {
            if context.store.with_session(|session| session.is_authenticated) {
                wasm_bindgen_futures::spawn_local(async move {
                    log::info!("📋 Cargando lista de empresas...");
                    match context.companies().sync_companies(&context.store).await {
                        Ok(count) => log::info!("✅ Empresas cargadas: {}", count),
                        Err(e) => log::error!("❌ Error cargando empresas: {}", e),
                    }
                });
            }
        }
    });

    let Some(context) = context else {
        return None;
    };

    let login = {
        let store = context.store.clone();
        Callback::from(move |(email, password): (String, String)| {
            let store = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                store.login(&email, &password).await;
            });
        })
    };

    let logout = {
        let context = context.clone();
        Callback::from(move |_| {
            context.store.logout();
            context.navigator.navigate(&context.config.routes.login_path);
        })
    };

    let select_company = {
        let store = context.store.clone();
        Callback::from(move |company: Company| {
            if let Err(e) = store.set_active_company(company) {
                log::warn!("⚠️ {}", e);
            }
        })
    };

    let clear_error = {
        let store = context.store.clone();
        Callback::from(move |_| store.clear_error())
    };

    Some(UseSessionHandle {
        context,
        session: (*session).clone(),
        login,
        logout,
        select_company,
        clear_error,
    })
}
