use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{ApiResult, OrderApi};
use crate::domain::{FurnitureOption, Order, OrderCreate, OrderId, User, UserCreate, UserId};
use crate::error::ApiError;

/// Normalise the backend base URL: add a scheme when missing and drop
/// trailing slashes. The `/api` prefix is kept; endpoint paths are appended to it.
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

fn transport_error(url: &Url, err: &reqwest::Error) -> ApiError {
    if err.is_connect() {
        return ApiError::Unreachable(url.to_string());
    }
    if err.is_timeout() {
        return ApiError::Timeout(url.to_string());
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}

async fn status_error(url: &Url, response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(url.path().to_string()),
        s if detail.is_empty() => ApiError::UnexpectedStatus(s.as_u16()),
        s => ApiError::Status {
            status: s.as_u16(),
            message: detail,
        },
    }
}

/// [`OrderApi`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpOrderApi {
    client: Client,
    base: Url,
}

impl HttpOrderApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let normalized = normalize_base_url(base_url);
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{normalized}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(normalized));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, url: &Url, request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| transport_error(url, &e))?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            let error = status_error(url, response).await;
            warn!(%url, error = %error, "Request failed");
            return Err(error);
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| transport_error(url, &e))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.send(&url, self.client.get(url.clone())).await?;
        Self::read_json(&url, response).await
    }
}

impl OrderApi for HttpOrderApi {
    #[instrument(skip(self))]
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get_json(self.endpoint(&["users"])?).await
    }

    #[instrument(skip(self))]
    async fn create_user(&self, name: &str) -> ApiResult<User> {
        let url = self.endpoint(&["users"])?;
        let body = UserCreate {
            name: name.to_string(),
        };
        let response = self.send(&url, self.client.post(url.clone()).json(&body)).await?;
        Self::read_json(&url, response).await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        self.get_json(self.endpoint(&["orders"])?).await
    }

    #[instrument(skip(self))]
    async fn orders_by_user(&self, user_id: UserId) -> ApiResult<Vec<Order>> {
        let id = user_id.to_string();
        self.get_json(self.endpoint(&["orders", "by-user", &id])?).await
    }

    #[instrument(skip(self))]
    async fn orders_by_style(&self, style: &str) -> ApiResult<Vec<Order>> {
        let mut url = self.endpoint(&["orders", "by-furniture-type"])?;
        url.query_pairs_mut().append_pair("type", style);
        self.get_json(url).await
    }

    #[instrument(skip(self, order), fields(user_id = order.user_id, items = order.furnitures.len()))]
    async fn create_order(&self, order: &OrderCreate) -> ApiResult<Order> {
        let url = self.endpoint(&["orders"])?;
        let response = self.send(&url, self.client.post(url.clone()).json(order)).await?;
        Self::read_json(&url, response).await
    }

    #[instrument(skip(self))]
    async fn delete_order(&self, id: OrderId) -> ApiResult<()> {
        let id = id.to_string();
        let url = self.endpoint(&["orders", &id])?;
        let response = self.send(&url, self.client.delete(url.clone())).await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            other => {
                warn!(%url, status = other.as_u16(), "Delete did not answer 204");
                Err(ApiError::UnexpectedStatus(other.as_u16()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn furniture(&self, style: &str, kind: &str) -> ApiResult<FurnitureOption> {
        self.get_json(self.endpoint(&[style, kind])?).await
    }
}
