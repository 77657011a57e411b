use serde::{Deserialize, Serialize};

/// Empresa (tenant) sobre la que puede operar el usuario. La identidad es `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub razon_social: String,
    #[serde(default)]
    pub nombre_comercial: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl Company {
    /// Nombre para mostrar: nombre comercial si existe, si no la razón social
    pub fn display_name(&self) -> &str {
        match self.nombre_comercial.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.razon_social,
        }
    }
}
