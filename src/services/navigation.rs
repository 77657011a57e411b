/// Navegación de la aplicación (redirecciones del adaptador y del guard)
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Navegación dura vía `window.location`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

#[cfg(target_arch = "wasm32")]
impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        log::info!("🧭 Navegando a {}", path);
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(path) {
                log::error!("❌ No se pudo navegar a {}: {:?}", path, e);
            }
        }
    }
}
