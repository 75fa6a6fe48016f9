//! Typed HTTP client for the bookstore API.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use bookstore_app::modules::books::models::{CreateBook, PurchaseReceipt};
use bookstore_db::Book;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with an error body.
    #[error("{message} ({status})")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// True when the server refused a purchase because the shelf is empty.
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, ClientError::Api { code, .. } if code == "out_of_stock")
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/books{}", self.base_url, path)
    }

    pub async fn list(&self) -> Result<Vec<Book>, ClientError> {
        decode(self.http.get(self.url("")).send().await?).await
    }

    pub async fn get(&self, id: &str) -> Result<Book, ClientError> {
        decode(self.http.get(self.url(&format!("/{}", id))).send().await?).await
    }

    pub async fn create(&self, book: &CreateBook) -> Result<Book, ClientError> {
        decode(self.http.post(self.url("")).json(book).send().await?).await
    }

    pub async fn purchase(&self, id: &str) -> Result<PurchaseReceipt, ClientError> {
        decode(
            self.http
                .post(self.url(&format!("/{}/purchase", id)))
                .send()
                .await?,
        )
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await?;
    let (code, message) = match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => (payload.code, payload.error),
        Err(_) => (String::new(), body),
    };

    tracing::debug!(status = %status, code = %code, "API request rejected");
    Err(ClientError::Api {
        status,
        code,
        message,
    })
}
