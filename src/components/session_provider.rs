// ============================================================================
// SESSION PROVIDER - Inyecta el AppContext en el árbol de componentes
// ============================================================================
// Va una sola vez en la raíz: es quien construye (o recibe) el único
// AppContext de la aplicación.
// ============================================================================

use yew::prelude::*;

use crate::config::CONFIG;
use crate::context::AppContext;

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    /// Sin contexto explícito se construye el del navegador con `CONFIG`
    #[prop_or_default]
    pub context: Option<AppContext>,
    pub children: Children,
}

#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let context = use_memo(props.context.clone(), |provided| match provided {
        Some(context) => context.clone(),
        None => AppContext::browser((*CONFIG).clone()),
    });

    html! {
        <ContextProvider<AppContext> context={(*context).clone()}>
            {props.children.clone()}
        </ContextProvider<AppContext>>
    }
}
