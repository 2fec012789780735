/// Shared gateway state: one pooled HTTP client plus upstream base URLs.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub identity_url: String,
    pub storage_url: String,
}
