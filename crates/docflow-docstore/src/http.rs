use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::{DocumentStore, StoreError};

/// Client for an external document store speaking document CRUD over HTTP.
///
/// Maps protocol statuses onto [`StoreError`]: 404 is `NotFound`, 409 is
/// `Conflict`, and everything else (including transport failures) is
/// `Unavailable`. Call deadlines are enforced by the engine, not here.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
  client: Client,
  base_url: Url,
}

impl HttpDocumentStore {
  /// Create a client for the store rooted at `base_url`, e.g.
  /// `http://localhost:4000/api/documents/`.
  pub fn new(base_url: Url) -> Self {
    Self {
      client: Client::new(),
      base_url,
    }
  }

  fn document_url(&self, document_id: &str) -> Result<Url, StoreError> {
    self
      .base_url
      .join(document_id)
      .map_err(|e| StoreError::Unavailable(format!("invalid document url: {e}")))
  }

  async fn send(
    &self,
    method: Method,
    document_id: &str,
    body: Option<Value>,
  ) -> Result<Value, StoreError> {
    let url = self.document_url(document_id)?;
    let mut request = self.client.request(method, url);
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    Self::decode(document_id, response).await
  }

  async fn decode(document_id: &str, response: Response) -> Result<Value, StoreError> {
    match response.status() {
      status if status.is_success() => response
        .json()
        .await
        .map_err(|e| StoreError::Unavailable(format!("invalid response body: {e}"))),
      StatusCode::NOT_FOUND => Err(StoreError::NotFound(document_id.to_string())),
      StatusCode::CONFLICT => Err(StoreError::Conflict(document_id.to_string())),
      status => Err(StoreError::Unavailable(format!(
        "store answered {status} for document '{document_id}'"
      ))),
    }
  }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
  async fn get(&self, document_id: &str) -> Result<Value, StoreError> {
    self.send(Method::GET, document_id, None).await
  }

  async fn create(&self, document_id: &str, body: Value) -> Result<Value, StoreError> {
    self.send(Method::POST, document_id, Some(body)).await
  }

  async fn update(&self, document_id: &str, body: Value) -> Result<Value, StoreError> {
    self.send(Method::PUT, document_id, Some(body)).await
  }

  async fn delete(&self, document_id: &str) -> Result<Value, StoreError> {
    self.send(Method::DELETE, document_id, None).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn document_url_joins_id_onto_base() {
    let store = HttpDocumentStore::new(Url::parse("http://localhost:4000/api/documents/").unwrap());
    let url = store.document_url("order-7").unwrap();
    assert_eq!(url.as_str(), "http://localhost:4000/api/documents/order-7");
  }
}
