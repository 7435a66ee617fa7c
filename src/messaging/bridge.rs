//! Client for the WhatsApp Web bridge.
//!
//! The bridge is a sidecar process that owns the WhatsApp Web session
//! (pairing, transport, reconnects). It exposes a small REST surface for
//! lookups and mutations plus a WebSocket stream of session events.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, info, warn};

use super::messenger::{Messenger, MessengerError};
use super::types::{ChatInfo, ContactInfo, SendOptions, SessionEvent};
use crate::config::BridgeConfig;

/// Capacity of the event channel handed to the bot.
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    chat_id: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    mentions: &'a [String],
}

#[derive(Debug, Serialize)]
struct ParticipantsRequest<'a> {
    participants: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP and WebSocket client for the bridge.
pub struct BridgeClient {
    http: Client,
    config: BridgeConfig,
}

impl BridgeClient {
    /// Creates a new bridge client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BridgeConfig) -> Result<Self, MessengerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, config })
    }

    /// Starts the messaging session and subscribes to its events.
    ///
    /// The returned receiver yields events until the bridge closes the stream.
    pub async fn connect(&self) -> Result<mpsc::Receiver<SessionEvent>, MessengerError> {
        info!("Starting bridge session at {}", self.config.base_url);

        let resp = self.request(Method::POST, "/session/start").send().await?;
        check_status(resp).await?;

        let url = events_url(&self.config.base_url);
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| MessengerError::Stream(e.to_string()))?;

        if let Some(token) = &self.config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| MessengerError::Stream(e.to_string()))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (ws, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| MessengerError::Stream(e.to_string()))?;
        info!("Subscribed to bridge events at {url}");

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(async move {
            let (_, mut read) = ws.split();

            while let Some(frame) = read.next().await {
                let text = match frame {
                    Ok(WsMessage::Text(text)) => text,
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Bridge event stream error: {}", e);
                        break;
                    }
                };

                match parse_event(&text) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Skipping unparseable bridge event: {}", e),
                }
            }

            info!("Bridge event stream closed");
        });

        Ok(rx)
    }

    /// Releases the messaging session.
    pub async fn destroy(&self) -> Result<(), MessengerError> {
        info!("Stopping bridge session...");
        let resp = self.request(Method::POST, "/session/stop").send().await?;
        check_status(resp).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let builder = self.http.request(method, url);

        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_participants(
        &self,
        chat_id: &str,
        action: &str,
        participants: &[String],
    ) -> Result<(), MessengerError> {
        let path = format!("/chats/{chat_id}/participants/{action}");
        let resp = self
            .request(Method::POST, &path)
            .json(&ParticipantsRequest { participants })
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for BridgeClient {
    async fn send_message(
        &self,
        chat_id: &str,
        content: &str,
        options: SendOptions,
    ) -> Result<(), MessengerError> {
        debug!("Sending message to {}", chat_id);

        let body = SendRequest {
            chat_id,
            content,
            mentions: &options.mentions,
        };
        let resp = self
            .request(Method::POST, "/messages")
            .json(&body)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<ChatInfo, MessengerError> {
        let resp = self
            .request(Method::GET, &format!("/chats/{chat_id}"))
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn get_contact(&self, contact_id: &str) -> Result<ContactInfo, MessengerError> {
        let resp = self
            .request(Method::GET, &format!("/contacts/{contact_id}"))
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn remove_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), MessengerError> {
        self.post_participants(chat_id, "remove", participants).await
    }

    async fn promote_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), MessengerError> {
        self.post_participants(chat_id, "promote", participants).await
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Maps a non-success response into a `MessengerError`.
async fn check_status(resp: Response) -> Result<Response, MessengerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(status, &body);

    if status == StatusCode::NOT_FOUND {
        Err(MessengerError::NotFound(message))
    } else {
        Err(MessengerError::Rejected(message))
    }
}

/// Extracts the bridge's error text, falling back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("bridge returned {status}"))
}

/// Derives the WebSocket events URL from the bridge base URL.
fn events_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_owned()
    };
    format!("{ws_base}/events")
}

fn parse_event(text: &str) -> Result<SessionEvent, MessengerError> {
    serde_json::from_str(text).map_err(|e| MessengerError::InvalidResponse(e.to_string()))
}
