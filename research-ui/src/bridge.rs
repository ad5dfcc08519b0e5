use crate::browser::{self, js_message};
use crate::dto::{
    CompanyDto, DashboardStatsDto, FullAnalysisDto, Listing, RecentAnalysisDto, TokenRequest,
    TokenResponse, UpcomingTaskDto,
};
use company_store::{ApiConfig, CompanyLookup, CompanySummary, LookupError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("browser API unavailable: {0}")]
    Unavailable(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("session expired")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("backend answered {status} for {path}")]
    Status { status: u16, path: String },
    #[error("unexpected payload: {0}")]
    Decode(String),
}

impl From<ApiError> for LookupError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => LookupError::NotFound(what),
            ApiError::Decode(msg) => LookupError::Decode(msg),
            other => LookupError::Network(other.to_string()),
        }
    }
}

/// REST client for the research backend.
#[derive(Clone)]
pub struct ApiClient {
    config: Rc<ApiConfig>,
    on_unauthorized: Option<Rc<dyn Fn()>>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Rc::new(config),
            on_unauthorized: None,
        }
    }

    /// Called after a 401 has cleared the stored token.
    pub fn on_unauthorized(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_unauthorized = Some(Rc::new(handler));
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn token(&self) -> Option<String> {
        browser::read_token(&self.config.auth_token_key)
    }

    pub fn logout(&self) {
        browser::clear_token(&self.config.auth_token_key);
    }

    async fn call<B, R>(&self, method: &str, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let window =
            web_sys::window().ok_or_else(|| ApiError::Unavailable("window not available".into()))?;

        let headers = Headers::new().map_err(|e| ApiError::Unavailable(js_message(&e)))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| ApiError::Unavailable(js_message(&e)))?;
        if let Some(token) = self.token() {
            headers
                .set("Authorization", &format!("Token {token}"))
                .map_err(|e| ApiError::Unavailable(js_message(&e)))?;
        }

        let init = RequestInit::new();
        init.set_method(method);
        init.set_headers(&headers);
        if let Some(body) = body {
            let json = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
            init.set_body(&JsValue::from_str(&json));
        }

        let url = self.config.endpoint(path);
        let request = Request::new_with_str_and_init(&url, &init)
            .map_err(|e| ApiError::Unavailable(js_message(&e)))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::Network(js_message(&e)))?
            .dyn_into()
            .map_err(|_| ApiError::Decode("fetch did not yield a Response".into()))?;

        match response.status() {
            401 => {
                tracing::info!(path, "backend rejected token, signing out");
                self.logout();
                if let Some(handler) = &self.on_unauthorized {
                    handler();
                }
                return Err(ApiError::Unauthorized);
            }
            404 => return Err(ApiError::NotFound(path.to_string())),
            status if !response.ok() => {
                return Err(ApiError::Status {
                    status,
                    path: path.to_string(),
                })
            }
            _ => {}
        }

        let json = JsFuture::from(
            response
                .json()
                .map_err(|e| ApiError::Decode(js_message(&e)))?,
        )
        .await
        .map_err(|e| ApiError::Decode(js_message(&e)))?;
        serde_wasm_bindgen::from_value(json).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.call::<(), R>("GET", path, None).await
    }

    /// Exchange credentials for a token and persist it.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let body = TokenRequest { username, password };
        let resp: TokenResponse = self.call("POST", "/auth/token/", Some(&body)).await?;
        browser::store_token(&self.config.auth_token_key, &resp.token);
        Ok(resp.token)
    }

    pub async fn fetch_company(&self, id: &str) -> Result<CompanyDto, ApiError> {
        self.get(&company_path(id)).await
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanyDto>, ApiError> {
        self.get::<Listing<CompanyDto>>("/companies/")
            .await
            .map(Listing::into_vec)
    }

    pub async fn search_companies(&self, query: &str) -> Result<Vec<CompanyDto>, ApiError> {
        self.get::<Listing<CompanyDto>>(&search_path(query))
            .await
            .map(Listing::into_vec)
    }

    pub async fn fetch_full_analysis(&self, id: &str) -> Result<FullAnalysisDto, ApiError> {
        self.get(&format!("{}full_analysis/", company_path(id))).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStatsDto, ApiError> {
        self.get("/dashboard/stats/").await
    }

    pub async fn recent_analyses(&self) -> Result<Vec<RecentAnalysisDto>, ApiError> {
        self.get::<Listing<RecentAnalysisDto>>("/dashboard/recent_analyses/")
            .await
            .map(Listing::into_vec)
    }

    pub async fn upcoming_tasks(&self) -> Result<Vec<UpcomingTaskDto>, ApiError> {
        self.get::<Listing<UpcomingTaskDto>>("/dashboard/upcoming_tasks/")
            .await
            .map(Listing::into_vec)
    }
}

fn company_path(id: &str) -> String {
    format!("/companies/{}/", urlencoding::encode(id))
}

fn search_path(query: &str) -> String {
    format!("/companies/search/?q={}", urlencoding::encode(query.trim()))
}

/// Resolves URL company ids for the selection store.
#[derive(Clone)]
pub struct HttpCompanyLookup {
    client: ApiClient,
}

impl HttpCompanyLookup {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl CompanyLookup for HttpCompanyLookup {
    fn fetch_company(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<CompanySummary, LookupError>> {
        let client = self.client.clone();
        let id = id.to_string();
        async move {
            client
                .fetch_company(&id)
                .await
                .map(CompanySummary::from)
                .map_err(LookupError::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_escape_user_input() {
        assert_eq!(company_path("5f0c-1"), "/companies/5f0c-1/");
        assert_eq!(company_path("a/b"), "/companies/a%2Fb/");
        assert_eq!(search_path("  acme corp "), "/companies/search/?q=acme%20corp");
        assert_eq!(search_path(""), "/companies/search/?q=");
    }

    #[test]
    fn api_errors_map_onto_lookup_errors() {
        assert_eq!(
            LookupError::from(ApiError::NotFound("/companies/9/".into())),
            LookupError::NotFound("/companies/9/".into())
        );
        assert!(matches!(
            LookupError::from(ApiError::Unauthorized),
            LookupError::Network(_)
        ));
        assert!(matches!(
            LookupError::from(ApiError::Status {
                status: 500,
                path: "/companies/9/".into()
            }),
            LookupError::Network(_)
        ));
    }
}
