//! FlavoursVerse API client
//!
//! One async method per remote operation behind the `ApiClient` trait, so the
//! tools can run against `MockApiClient` in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use crate::models::{
    AllergyReport, DietaryAnalysis, FlavorProfile, IngredientNutrition, ParsedDietaryInfo,
    RecipeEntry, RecipeTotals, SubstituteResponse, SubstitutionCandidate, TasteRecommendations,
};

/// Remote operations used by the tools
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `GET /substitute?ingredient=`
    async fn lookup_substitutes(&self, ingredient: &str) -> ApiResult<Vec<SubstitutionCandidate>>;

    /// `GET /flavor?ingredient=`
    async fn lookup_flavor_profile(&self, ingredient: &str) -> ApiResult<FlavorProfile>;

    /// `GET /calories?ingredient=`
    async fn lookup_nutrition(&self, ingredient: &str) -> ApiResult<IngredientNutrition>;

    /// `POST /calories/recipe`
    async fn aggregate_recipe_nutrition(&self, entries: &[RecipeEntry]) -> ApiResult<RecipeTotals>;

    /// `POST /nlp/suggestions?query=`
    async fn parse_dietary_query(&self, query: &str) -> ApiResult<DietaryAnalysis>;

    /// `POST /nlp/parse?query=`
    async fn parse_dietary_info(&self, query: &str) -> ApiResult<ParsedDietaryInfo>;

    /// `POST /nlp/allergy-check`
    async fn check_allergies(
        &self,
        ingredients: &[String],
        user_allergies: &[String],
    ) -> ApiResult<AllergyReport>;

    /// `POST /nlp/taste-recommendations`
    async fn taste_recommendations(
        &self,
        taste_preferences: &[String],
        exclude_allergies: &[String],
    ) -> ApiResult<TasteRecommendations>;
}

/// What a request was about, used for not-found messages
struct Subject<'a> {
    what: &'static str,
    name: &'a str,
}

/// Builder for `HttpApiClient`
#[derive(Debug, Clone)]
pub struct HttpApiClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl HttpApiClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            user_agent: format!("FlavoursVerse/{}", crate::build_info::VERSION),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HttpApiClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(HttpApiClient {
            inner,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Production client talking to the FlavoursVerse HTTP API
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn builder(base_url: impl Into<String>) -> HttpApiClientBuilder {
        HttpApiClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_by_ingredient<T: DeserializeOwned>(
        &self,
        path: &str,
        ingredient: &str,
        what: &'static str,
    ) -> ApiResult<T> {
        debug!(path, ingredient, "GET");
        let response = self
            .inner
            .get(self.url(path))
            .query(&[("ingredient", ingredient)])
            .send()
            .await
            .map_err(|e| log_failure(path, e.into()))?;

        let body = read_body(response, Subject { what, name: ingredient })
            .await
            .map_err(|e| log_failure(path, e))?;
        decode(body).map_err(|e| log_failure(path, e))
    }

    async fn post_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
        what: &'static str,
    ) -> ApiResult<T> {
        debug!(path, query, "POST");
        let response = self
            .inner
            .post(self.url(path))
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| log_failure(path, e.into()))?;

        let body = read_body(response, Subject { what, name: query })
            .await
            .map_err(|e| log_failure(path, e))?;
        decode(body).map_err(|e| log_failure(path, e))
    }

    async fn post_json<B, T>(&self, path: &str, payload: &B, subject: Subject<'_>) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!(path, "POST json");
        let response = self
            .inner
            .post(self.url(path))
            .json(payload)
            .send()
            .await
            .map_err(|e| log_failure(path, e.into()))?;

        let body = read_body(response, subject)
            .await
            .map_err(|e| log_failure(path, e))?;
        decode(body).map_err(|e| log_failure(path, e))
    }
}

fn log_failure(path: &str, error: ApiError) -> ApiError {
    warn!(path, error = %error, "FlavoursVerse API call failed");
    error
}

/// Turn a response into JSON, folding the three failure shapes into `ApiError`
async fn read_body(response: reqwest::Response, subject: Subject<'_>) -> ApiResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    let body_status = body
        .as_ref()
        .and_then(|b| b.get("statusCode"))
        .and_then(Value::as_u64);
    if status == StatusCode::NOT_FOUND || body_status == Some(404) {
        return Err(ApiError::NotFound {
            what: subject.what,
            ingredient: subject.name.to_string(),
        });
    }

    if let Some(message) = body.as_ref().and_then(embedded_error) {
        return Err(ApiError::Server(message));
    }

    if !status.is_success() {
        let message = status_message(status, &text);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    body.ok_or_else(|| ApiError::Decode("response body is not JSON".to_string()))
}

/// Longest response body excerpt carried in a status error
const MAX_STATUS_MESSAGE: usize = 200;

/// Short plain-text bodies are kept; empty or markup bodies fall back to the
/// status reason, and long ones are cut at a char boundary
fn status_message(status: StatusCode, text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return status.canonical_reason().unwrap_or("request failed").to_string();
    }
    match trimmed.char_indices().nth(MAX_STATUS_MESSAGE) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn embedded_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Serialize)]
struct RecipeRequest<'a> {
    ingredients: &'a [RecipeEntry],
}

#[derive(Serialize)]
struct AllergyCheckRequest<'a> {
    ingredients: &'a [String],
    user_allergies: &'a [String],
}

#[derive(Serialize)]
struct TasteRequest<'a> {
    taste_preferences: &'a [String],
    exclude_allergies: &'a [String],
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn lookup_substitutes(&self, ingredient: &str) -> ApiResult<Vec<SubstitutionCandidate>> {
        let response: SubstituteResponse = self
            .get_by_ingredient("/substitute", ingredient, "substitutes")
            .await?;
        Ok(response.into_candidates())
    }

    async fn lookup_flavor_profile(&self, ingredient: &str) -> ApiResult<FlavorProfile> {
        self.get_by_ingredient("/flavor", ingredient, "flavor data").await
    }

    async fn lookup_nutrition(&self, ingredient: &str) -> ApiResult<IngredientNutrition> {
        self.get_by_ingredient("/calories", ingredient, "calorie data").await
    }

    async fn aggregate_recipe_nutrition(&self, entries: &[RecipeEntry]) -> ApiResult<RecipeTotals> {
        let request = RecipeRequest { ingredients: entries };
        self.post_json(
            "/calories/recipe",
            &request,
            Subject { what: "recipe nutrition", name: "recipe" },
        )
        .await
    }

    async fn parse_dietary_query(&self, query: &str) -> ApiResult<DietaryAnalysis> {
        self.post_with_query("/nlp/suggestions", query, "dietary suggestions").await
    }

    async fn parse_dietary_info(&self, query: &str) -> ApiResult<ParsedDietaryInfo> {
        self.post_with_query("/nlp/parse", query, "dietary information").await
    }

    async fn check_allergies(
        &self,
        ingredients: &[String],
        user_allergies: &[String],
    ) -> ApiResult<AllergyReport> {
        let request = AllergyCheckRequest { ingredients, user_allergies };
        self.post_json(
            "/nlp/allergy-check",
            &request,
            Subject { what: "allergy analysis", name: "ingredients" },
        )
        .await
    }

    async fn taste_recommendations(
        &self,
        taste_preferences: &[String],
        exclude_allergies: &[String],
    ) -> ApiResult<TasteRecommendations> {
        let request = TasteRequest { taste_preferences, exclude_allergies };
        self.post_json(
            "/nlp/taste-recommendations",
            &request,
            Subject { what: "taste recommendations", name: "taste preferences" },
        )
        .await
    }
}
