//! Telegram Bot API sink.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{NotifyError, NotifySink};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl ApiResponse {
    fn into_result(self) -> Result<(), NotifyError> {
        if self.ok {
            Ok(())
        } else {
            Err(NotifyError::Api(
                self.description.unwrap_or_else(|| "unknown error".into()),
            ))
        }
    }
}

/// Posts each match as a message to a single chat.
pub struct TelegramSink {
    client: Client,
    api_base: String,
    token: String,
    chat_id: i64,
}

impl TelegramSink {
    /// Builds the sink and checks the token with `getMe`.
    pub fn connect(token: impl Into<String>, chat_id: i64) -> Result<Self, NotifyError> {
        let sink = Self::new(token, chat_id)?;
        let response = sink
            .client
            .get(sink.method_url("getMe"))
            .send()
            .map_err(http_error)?;
        response
            .json::<ApiResponse>()
            .map_err(http_error)?
            .into_result()?;
        Ok(sink)
    }

    /// Builds the sink without contacting the API.
    pub fn new(token: impl Into<String>, chat_id: i64) -> Result<Self, NotifyError> {
        Self::with_api_base(API_BASE, token, chat_id)
    }

    /// Builds the sink against a different Bot API endpoint.
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: i64,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(http_error)?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
            chat_id,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

/// Request URLs embed the token, so they never reach an error message.
fn http_error(e: reqwest::Error) -> NotifyError {
    NotifyError::Http(e.without_url())
}

impl NotifySink for TelegramSink {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: self.chat_id,
            text: message,
        };
        self.client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .map_err(http_error)?
            .json::<ApiResponse>()
            .map_err(http_error)?
            .into_result()
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for TelegramSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSink")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let sink = TelegramSink::new("123:abc", 42).unwrap();
        assert_eq!(
            sink.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_send_message_body() {
        let body = SendMessage {
            chat_id: -100123,
            text: "🔁 Address: 1aaa, key: K",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["chat_id"], -100123);
        assert_eq!(value["text"], "🔁 Address: 1aaa, key: K");
    }

    #[test]
    fn test_api_response() {
        let ok: ApiResponse = serde_json::from_str(r#"{"ok":true,"result":{}}"#).unwrap();
        assert!(ok.into_result().is_ok());

        let err: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#).unwrap();
        match err.into_result() {
            Err(NotifyError::Api(msg)) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_errors_hide_token() {
        // Nothing listens on the discard port, so the request fails fast.
        let sink =
            TelegramSink::with_api_base("http://127.0.0.1:9", "123456:SECRET-TOKEN", 7).unwrap();
        let err = sink.notify("hi").unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
        assert!(!err.to_string().contains("SECRET-TOKEN"));
        assert!(!format!("{:?}", err).contains("SECRET-TOKEN"));
    }

    #[test]
    fn test_debug_hides_token() {
        let sink = TelegramSink::new("secret-token", 7).unwrap();
        assert!(!format!("{:?}", sink).contains("secret-token"));
    }
}
