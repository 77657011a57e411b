use serde::Deserialize;

use crate::error::ApiError;
use crate::models::Company;
use crate::services::api_client::ApiClient;
use crate::stores::SessionStore;
use crate::utils::constants::COMPANIES_ENDPOINT;

/// El backend puede devolver la lista paginada o plana
#[derive(Deserialize)]
#[serde(untagged)]
enum CompaniesResponse {
    Plain(Vec<Company>),
    Paginated { results: Vec<Company> },
}

/// Recarga de la lista de empresas del usuario
#[derive(Clone)]
pub struct CompanyService {
    client: ApiClient,
}

impl CompanyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_companies(&self) -> Result<Vec<Company>, ApiError> {
        let companies = match self.client.get_json::<CompaniesResponse>(COMPANIES_ENDPOINT).await? {
            CompaniesResponse::Paginated { results } => results,
            CompaniesResponse::Plain(companies) => companies,
        };
        log::info!("🏢 {} empresas obtenidas", companies.len());
        Ok(companies)
    }

    /// Obtener la lista y aplicarla al store (reconciliando la empresa activa)
    pub async fn sync_companies(&self, store: &SessionStore) -> Result<usize, ApiError> {
        let companies = self.fetch_companies().await?;
        let count = companies.len();
        store.set_companies(companies);
        Ok(count)
    }
}
