//! HTTP lookup against a service's REST resources.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::RemoteLookup;
use crate::error::LookupError;

/// Looks entities up over HTTP.
///
/// - `GET {base_url}/{id}` returns the entity as JSON, or 404 if absent.
/// - `GET {base_url}/{id}/exists` returns a JSON boolean.
///
/// A 404 on either route is read as absence. Any other non-success status
/// is an error.
#[derive(Debug)]
pub struct HttpLookup<E> {
    client: Client,
    base_url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for HttpLookup<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> HttpLookup<E> {
    /// Creates a lookup for the resource collection at `base_url`.
    ///
    /// `timeout` bounds each request at the transport level.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a lookup that shares an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            _entity: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl<E> RemoteLookup for HttpLookup<E>
where
    E: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Entity = E;

    async fn exists(&self, id: i64) -> Result<bool, LookupError> {
        let url = format!("{}/{id}/exists", self.base_url);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => response
                .json::<bool>()
                .await
                .map_err(|e| LookupError::Decode(e.to_string())),
            status => Err(LookupError::UnexpectedStatus(status.as_u16())),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<E>, LookupError> {
        let url = format!("{}/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<E>()
                .await
                .map(Some)
                .map_err(|e| LookupError::Decode(e.to_string())),
            status => Err(LookupError::UnexpectedStatus(status.as_u16())),
        }
    }
}
