use std::time::Duration;

use listkit_logging::{listkit_debug, listkit_warn};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use url::Url;

use crate::{jwt, Algorithm, ClaimSet, FailureKind, FetchError, JwtError};

/// Request parameters: a query string for GET, a JSON body otherwise.
pub type Params = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Sent with every request unless a per-request header has the same name.
    pub default_headers: Vec<(String, String)>,
    /// Statuses in `200..validate_status_below` count as success.
    pub validate_status_below: u16,
    pub jwt_secret: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            default_headers: Vec::new(),
            validate_status_below: 300,
            jwt_secret: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Response of a signed request.
///
/// `claims` is `None` when the body was not a token signed with the
/// configured secret; `raw` always holds the body as received.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtResponse {
    pub claims: Option<ClaimSet>,
    pub raw: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    settings: ApiSettings,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Joins `path` onto the base URL. Absolute URLs are used as given.
    pub fn full_url(&self, path: &str) -> Result<Url, FetchError> {
        if let Ok(url) = Url::parse(path) {
            if url.has_host() {
                return Ok(url);
            }
        }
        let joined = format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{joined}: {err}")))
    }

    pub async fn request_text(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Params>,
        headers: &[(String, String)],
    ) -> Result<String, FetchError> {
        let mut url = self.full_url(path)?;
        if method == HttpMethod::Get {
            if let Some(params) = params.filter(|params| !params.is_empty()) {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in params {
                    pairs.append_pair(key, &query_value(value));
                }
            }
        }
        listkit_debug!("{:?} {}", method, url);

        let mut request = self.http.request(method.as_reqwest(), url);
        if method != HttpMethod::Get {
            if let Some(params) = params {
                let body = serde_json::to_string(params)
                    .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
                request = request.header(CONTENT_TYPE, "application/json").body(body);
            }
        }
        for (name, value) in self.merged_headers(headers) {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !(200..self.settings.validate_status_below).contains(&status.as_u16()) {
            listkit_warn!("{path} answered {status}");
            let message = if body.is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        Ok(body)
    }

    pub async fn request_json(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Params>,
        headers: &[(String, String)],
    ) -> Result<Value, FetchError> {
        let body = self.request_text(method, path, params, headers).await?;
        serde_json::from_str(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    /// Sends `params` as an HS256 token and decodes a token answer.
    pub async fn request_jwt(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Params>,
        headers: &[(String, String)],
    ) -> Result<JwtResponse, FetchError> {
        let secret = self
            .settings
            .jwt_secret
            .as_deref()
            .ok_or_else(|| {
                FetchError::new(
                    FailureKind::Token(JwtError::InvalidKey),
                    "no JWT secret configured",
                )
            })?;
        let signed = params
            .map(|params| sign_params(params, secret.as_bytes()))
            .transpose()?;
        let raw = self
            .request_text(method, path, signed.as_ref(), headers)
            .await?;
        Ok(decode_response(raw, secret.as_bytes()))
    }

    fn merged_headers(&self, headers: &[(String, String)]) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = self
            .settings
            .default_headers
            .iter()
            .filter(|(name, _)| {
                !headers
                    .iter()
                    .any(|(other, _)| other.eq_ignore_ascii_case(name))
            })
            .cloned()
            .collect();
        merged.extend(headers.iter().cloned());
        merged
    }
}

/// Wraps `params` as `{"value": <token>}`.
pub fn sign_params(params: &Params, secret: &[u8]) -> Result<Params, JwtError> {
    let token = jwt::encode(&ClaimSet::from_map(params.clone()), secret, Algorithm::Hs256)?;
    let mut signed = Params::new();
    signed.insert("value".to_string(), Value::String(token));
    Ok(signed)
}

/// Decodes a token body, keeping the raw text when it is not one.
pub fn decode_response(raw: String, secret: &[u8]) -> JwtResponse {
    let token = raw.replace('"', "");
    match jwt::decode(token.trim(), secret, Algorithm::Hs256) {
        Ok(claims) => JwtResponse {
            claims: Some(claims),
            raw,
        },
        Err(err) => {
            listkit_debug!("response is not a signed token: {err}");
            JwtResponse { claims: None, raw }
        }
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidUrl, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
