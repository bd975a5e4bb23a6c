use crate::error::{ClientError, ClientResult};
use crate::{CartClient, OrderClient, ProductClient, UserClient};
use async_trait::async_trait;
use contracts::{CartSnapshot, OrderSummary, ProductSummary, UserPublicProfile};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Shared client with the per-request timeout from `ServiceUrls`.
pub fn build_http_client(timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Transport(e.to_string()))
}

async fn send(request: RequestBuilder) -> ClientResult<Response> {
    let response = request.send().await?;

    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(ClientError::NotFound),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::FORBIDDEN => Err(ClientError::Forbidden),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }
}

async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    send(request)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[derive(Clone)]
pub struct HttpCartClient {
    client: Client,
    base_url: String,
}

impl HttpCartClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CartClient for HttpCartClient {
    async fn get_cart(&self, token: &str) -> ClientResult<CartSnapshot> {
        debug!("Fetching cart");
        fetch(
            self.client
                .get(format!("{}/api/cart", self.base_url))
                .bearer_auth(token),
        )
        .await
    }

    async fn clear_cart(&self, token: &str) -> ClientResult<()> {
        send(
            self.client
                .delete(format!("{}/api/cart", self.base_url))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct HttpProductClient {
    client: Client,
    base_url: String,
}

impl HttpProductClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProductClient for HttpProductClient {
    async fn get_product(&self, id: Uuid) -> ClientResult<ProductSummary> {
        fetch(
            self.client
                .get(format!("{}/api/products/{}", self.base_url, id)),
        )
        .await
    }
}

#[derive(Clone)]
pub struct HttpUserClient {
    client: Client,
    base_url: String,
}

impl HttpUserClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl UserClient for HttpUserClient {
    async fn get_public_profile(&self, id: Uuid, token: &str) -> ClientResult<UserPublicProfile> {
        fetch(
            self.client
                .get(format!("{}/api/users/{}/public", self.base_url, id))
                .bearer_auth(token),
        )
        .await
    }
}

#[derive(Clone)]
pub struct HttpOrderClient {
    client: Client,
    base_url: String,
}

impl HttpOrderClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OrderClient for HttpOrderClient {
    async fn get_order(&self, id: Uuid, token: &str) -> ClientResult<OrderSummary> {
        fetch(
            self.client
                .get(format!("{}/api/orders/{}", self.base_url, id))
                .bearer_auth(token),
        )
        .await
    }
}
