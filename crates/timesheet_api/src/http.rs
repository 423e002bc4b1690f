//! Transport core shared by the Jira and Tempo clients.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::pacing::RequestPacer;

pub(crate) struct HttpSettings<'a> {
    pub api_root: String,
    pub authorization: String,
    pub user_agent: &'a str,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub cooldown: Duration,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiHttp {
    http: HttpClient,
    api_root: String,
    pacer: RequestPacer,
}

impl ApiHttp {
    pub fn new(settings: HttpSettings<'_>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut auth_value = header_value(&settings.authorization)?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value(settings.user_agent)?);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Other(err.to_string()))?;

        Ok(Self {
            http,
            api_root: settings.api_root,
            pacer: RequestPacer::new(settings.cooldown),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.pacer.wait_turn().await;
        let url = self.url_for(path);
        debug!(method = "GET", %url, "sending request");
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        parse_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.pacer.wait_turn().await;
        let url = self.url_for(path);
        debug!(method = "POST", %url, "sending request");
        let response = self
            .http
            .request(Method::POST, url)
            .json(body)
            .send()
            .await?;
        parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.api_root(), path.trim_start_matches('/'))
    }
}

async fn parse_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        serde_json::from_str::<T>(&body).map_err(|err| {
            debug!(%status, error = %err, "response did not match expected schema");
            ApiError::Validation(err.to_string())
        })
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ApiError::Authentication(format!(
            "Access denied ({}) - {}",
            status, body
        )))
    } else {
        Err(build_http_error(status, &body))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| ApiError::Configuration(err.to_string()))
}

fn build_http_error(status: StatusCode, body: &str) -> ApiError {
    let code = extract_error_code(body);
    ApiError::http(status, code, body.to_string())
}

/// Pulls a machine-readable code out of Atlassian (`errorMessages`) or Tempo (`errors[].code`) error bodies.
fn extract_error_code(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    value
        .get("code")
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .get("errors")
                .and_then(Value::as_array)
                .and_then(|errors| errors.first())
                .and_then(|first| first.get("code"))
                .and_then(Value::as_str)
        })
        .or_else(|| {
            value
                .get("errorMessages")
                .and_then(Value::as_array)
                .and_then(|messages| messages.first())
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}
