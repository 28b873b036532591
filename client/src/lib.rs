//! # Simulator Tester Client
//!
//! Plays the part of one browser session against a running relay. Inputs are
//! posted as `<sessionId>|||<payload>` envelopes and broadcasts are pulled by
//! polling with a locally held cursor, the same way the simulator page does.
//!
//! ```rust,no_run
//! use simrelay_client::SimClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = SimClient::new("http://localhost:8080", "SimPlayer_1")?;
//!     client.join().await?;
//!     client.send_move("UP:PRESS").await?;
//!
//!     for message in client.poll().await? {
//!         println!("{}", message);
//!     }
//!
//!     client.exit().await?;
//!     Ok(())
//! }
//! ```

use log::debug;
use simrelay_shared::{encode, Envelope, PollResponse, EVENTS_PATH, EXIT, JOIN, MOVE, SEND_PATH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid relay url {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct SimClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
    cursor: u64,
}

impl SimClient {
    pub fn new(base_url: &str, session_id: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/');
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            session_id: session_id.into(),
            cursor: 0,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Highest broadcast id consumed so far
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub async fn join(&self) -> Result<(), ClientError> {
        self.send_raw(JOIN).await
    }

    pub async fn exit(&self) -> Result<(), ClientError> {
        self.send_raw(EXIT).await
    }

    /// Sends `MOVE:<detail>`, e.g. `send_move("UP:PRESS")`.
    pub async fn send_move(&self, detail: &str) -> Result<(), ClientError> {
        self.send_raw(&format!("{}:{}", MOVE, detail)).await
    }

    /// Sends an arbitrary payload under this session's id.
    pub async fn send_raw(&self, payload: &str) -> Result<(), ClientError> {
        let body = encode(&Envelope::new(self.session_id.as_str(), payload));
        self.post(body).await
    }

    /// Posts a body verbatim, without wrapping it in an envelope.
    pub async fn post(&self, body: String) -> Result<(), ClientError> {
        debug!("POST {}: {}", SEND_PATH, body);
        self.http
            .post(format!("{}{}", self.base_url, SEND_PATH))
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetches broadcasts newer than the cursor and advances it.
    pub async fn poll(&mut self) -> Result<Vec<String>, ClientError> {
        let response = self.fetch_since(self.cursor).await?;
        self.cursor = response.last_id;
        Ok(response.messages)
    }

    /// Raw `GET /api/events` without touching the cursor.
    pub async fn fetch_since(&self, since: u64) -> Result<PollResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, EVENTS_PATH))
            .query(&[("since", since)])
            .send()
            .await?
            .error_for_status()?
            .json::<PollResponse>()
            .await?;
        Ok(response)
    }
}
