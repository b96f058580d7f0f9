//! Page capabilities injected into a list controller.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use listkit_core::ResultState;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ApiClient, FailureKind, FetchError, HttpMethod, Params};

/// Fetches one page of the plain listing.
#[async_trait]
pub trait PageSource<T: Send + 'static>: Send + Sync {
    async fn fetch_page(&self, page: u32, page_size: u32) -> ResultState<T>;
}

/// Fetches one page of keyword search results.
#[async_trait]
pub trait SearchSource<T: Send + 'static>: Send + Sync {
    async fn search_page(&self, keyword: &str, page: u32, page_size: u32) -> ResultState<T>;
}

/// Adapts an async closure into a page or search capability.
///
/// Listing closures take `(page, page_size)`; search closures take
/// `(keyword, page, page_size)` with an owned keyword.
#[derive(Clone)]
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Like [`FnSource::new`], pinning the listing signature for inference.
    pub fn listing<T, Fut>(f: F) -> Self
    where
        F: Fn(u32, u32) -> Fut,
        Fut: Future<Output = ResultState<T>>,
    {
        Self { f }
    }

    /// Like [`FnSource::new`], pinning the search signature for inference.
    pub fn search<T, Fut>(f: F) -> Self
    where
        F: Fn(String, u32, u32) -> Fut,
        Fut: Future<Output = ResultState<T>>,
    {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = ResultState<T>> + Send,
{
    async fn fetch_page(&self, page: u32, page_size: u32) -> ResultState<T> {
        (self.f)(page, page_size).await
    }
}

#[async_trait]
impl<T, F, Fut> SearchSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(String, u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = ResultState<T>> + Send,
{
    async fn search_page(&self, keyword: &str, page: u32, page_size: u32) -> ResultState<T> {
        (self.f)(keyword.to_string(), page, page_size).await
    }
}

/// Where paging parameters go and where a page lives in a JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub page_param: String,
    pub page_size_param: String,
    pub keyword_param: String,
    pub items_key: String,
    /// Object keys leading to the total item count.
    pub total_path: Vec<String>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            page_size_param: "per_page".to_string(),
            keyword_param: "keyword".to_string(),
            items_key: "result".to_string(),
            total_path: vec!["meta".to_string(), "total_count".to_string()],
        }
    }
}

impl PageLayout {
    pub fn params(&self, page: u32, page_size: u32) -> Params {
        let mut params = Params::new();
        params.insert(self.page_param.clone(), Value::from(page));
        params.insert(self.page_size_param.clone(), Value::from(page_size));
        params
    }

    /// Reads `(total_count, items)` out of a response body.
    ///
    /// A missing item array is an empty page; a missing total falls back to
    /// the number of items on this page.
    pub fn parse_page<T: DeserializeOwned>(
        &self,
        body: &Value,
    ) -> Result<(usize, Vec<T>), FetchError> {
        let items = match body.get(&self.items_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| T::deserialize(entry))
                .collect::<Result<Vec<T>, _>>()
                .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?,
            Some(_) => {
                return Err(FetchError::new(
                    FailureKind::Decode,
                    format!("`{}` is not an array", self.items_key),
                ))
            }
        };
        let total = self
            .total_path
            .iter()
            .try_fold(body, |node, key| node.get(key))
            .and_then(Value::as_u64)
            .map_or(items.len(), |total| usize::try_from(total).unwrap_or(usize::MAX));
        Ok((total, items))
    }
}

/// Maps a JSON list endpoint onto [`PageSource`] and [`SearchSource`].
pub struct JsonPageSource<T> {
    client: Arc<ApiClient>,
    method: HttpMethod,
    path: String,
    search_path: Option<String>,
    layout: PageLayout,
    signed: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonPageSource<T> {
    pub fn new(client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            method: HttpMethod::Get,
            path: path.into(),
            search_path: None,
            layout: PageLayout::default(),
            signed: false,
            _item: PhantomData,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Searches against a different endpoint than the listing.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Sends parameters as a signed token and decodes a token answer.
    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    async fn load(&self, path: &str, params: Params) -> Result<(usize, Vec<T>), FetchError>
    where
        T: DeserializeOwned,
    {
        let body = if self.signed {
            let response = self
                .client
                .request_jwt(self.method, path, Some(&params), &[])
                .await?;
            match response.claims {
                Some(claims) => Value::Object(claims.into_map()),
                None => serde_json::from_str(&response.raw)
                    .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?,
            }
        } else {
            self.client
                .request_json(self.method, path, Some(&params), &[])
                .await?
        };
        self.layout.parse_page(&body)
    }
}

#[async_trait]
impl<T> PageSource<T> for JsonPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, page: u32, page_size: u32) -> ResultState<T> {
        let params = self.layout.params(page, page_size);
        self.load(&self.path, params).await.into()
    }
}

#[async_trait]
impl<T> SearchSource<T> for JsonPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn search_page(&self, keyword: &str, page: u32, page_size: u32) -> ResultState<T> {
        let mut params = self.layout.params(page, page_size);
        params.insert(self.layout.keyword_param.clone(), Value::from(keyword));
        let path = self.search_path.as_deref().unwrap_or(&self.path);
        self.load(path, params).await.into()
    }
}
