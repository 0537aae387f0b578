use std::{future::Future, time::Duration};

use api_types::{
    ErrorResponse,
    customer::{CustomerList, CustomerView},
    summary::DailySummary,
    transaction::{PostingNew, TransactionList, TransactionView},
};
use chrono::NaiveDate;
use reqwest::{Method, Url};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid credentials")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(reqwest::Error),
}

impl ClientError {
    /// Transport failures and 5xx answers may succeed on a later attempt;
    /// every other error is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server { .. })
    }

    fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            422 => Self::Validation(message),
            400..=499 => Self::BadRequest(message),
            _ => Self::Server { status, message },
        }
    }
}

/// Bounded retry with exponential backoff for idempotent fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): `base * 2^retry`.
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> std::result::Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ClientError>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry + 1 < self.attempts => {
                    let delay = self.delay(retry);
                    tracing::warn!(attempt = retry + 1, ?delay, "request failed, retrying: {err}");
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    username: String,
    password: String,
    retry: RetryPolicy,
}

impl Client {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Input(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            username: username.to_string(),
            password: password.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> std::result::Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::BadRequest(format!("invalid path {path}: {err}")))?;

        let mut request = self
            .http
            .request(method, endpoint)
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }
        let res = request.send().await.map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res.json::<T>().await.map_err(ClientError::Decode);
        }

        let status = res.status().as_u16();
        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(ClientError::from_status(status, message))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ClientError> {
        self.retry
            .run(|| self.send::<(), T>(Method::GET, path, None))
            .await
    }

    pub async fn customers(&self) -> std::result::Result<CustomerList, ClientError> {
        self.get("customers").await
    }

    pub async fn customer(&self, id: i64) -> std::result::Result<CustomerView, ClientError> {
        self.get(&format!("customers/{id}")).await
    }

    /// Transactions of one customer, oldest first.
    pub async fn customer_transactions(
        &self,
        id: i64,
    ) -> std::result::Result<TransactionList, ClientError> {
        self.get(&format!("customers/{id}/transactions")).await
    }

    pub async fn daily_summary(
        &self,
        day: Option<NaiveDate>,
    ) -> std::result::Result<DailySummary, ClientError> {
        match day {
            Some(day) => self.get(&format!("summary/daily?day={day}")).await,
            None => self.get("summary/daily").await,
        }
    }

    // Postings are not retried: a lost response could otherwise record the
    // same payment twice.
    pub async fn collect(
        &self,
        posting: &PostingNew,
    ) -> std::result::Result<TransactionView, ClientError> {
        self.send(Method::POST, "collections", Some(posting)).await
    }

    pub async fn debit(
        &self,
        posting: &PostingNew,
    ) -> std::result::Result<TransactionView, ClientError> {
        self.send(Method::POST, "debits", Some(posting)).await
    }
}
