use async_trait::async_trait;
use mime::Mime;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatId, ChatPlatform};
use crate::config::TelegramConfig;
use crate::error::{RelayError, Result};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client. The token is fixed at construction for the life of the process.
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn check(method: &'static str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        debug!("Telegram {} response status: {}", method, status);

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            None if status.is_success() => Ok(()),
            Some(api) => Err(RelayError::Platform {
                method,
                description: api.description.unwrap_or_else(|| status.to_string()),
            }),
            None => Err(RelayError::Platform {
                method,
                description: status.to_string(),
            }),
        }
    }

    async fn upload(
        &self,
        method: &'static str,
        chat_id: &ChatId,
        field: &'static str,
        file_name: &'static str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        let mime = match content_type.parse::<Mime>() {
            Ok(mime) => mime,
            Err(e) => {
                warn!(
                    "Invalid MIME type '{}' for {}, sending as octet-stream: {}",
                    content_type, method, e
                );
                mime::APPLICATION_OCTET_STREAM
            }
        };
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime.as_ref())?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part(field, part);

        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;

        Self::check(method, response).await
    }
}

#[async_trait]
impl ChatPlatform for TelegramClient {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await?;

        Self::check("sendMessage", response).await
    }

    async fn upload_photo(&self, chat_id: &ChatId, data: Vec<u8>) -> Result<()> {
        self.upload("sendPhoto", chat_id, "photo", "photo.jpg", "image/jpeg", data)
            .await
    }

    async fn upload_video(&self, chat_id: &ChatId, data: Vec<u8>) -> Result<()> {
        self.upload("sendVideo", chat_id, "video", "video.mp4", "video/mp4", data)
            .await
    }

    async fn upload_document(
        &self,
        chat_id: &ChatId,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.upload("sendDocument", chat_id, "document", "file.bin", content_type, data)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TelegramClient {
        let config = TelegramConfig {
            bot_token: "123:TOKEN".to_string(),
            api_url: format!("{}/", server.uri()),
        };
        TelegramClient::new(reqwest::Client::new(), &config)
    }

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}}))
    }

    async fn single_body(server: &MockServer) -> String {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        String::from_utf8_lossy(&requests[0].body).to_lowercase()
    }

    #[tokio::test]
    async fn test_send_text_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TOKEN/sendMessage"))
            .and(body_json(json!({"chat_id": 42, "text": "hello"})))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_text(&ChatId::Id(42), "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_photo_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TOKEN/sendPhoto"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .upload_photo(&ChatId::Id(42), b"jpegbytes".to_vec())
            .await
            .unwrap();

        let body = single_body(&server).await;
        assert!(body.contains(r#"name="chat_id""#));
        assert!(body.contains(r#"name="photo"; filename="photo.jpg""#));
        assert!(body.contains("content-type: image/jpeg"));
        assert!(body.contains("jpegbytes"));
    }

    #[tokio::test]
    async fn test_upload_video_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TOKEN/sendVideo"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .upload_video(&ChatId::Id(42), b"mp4bytes".to_vec())
            .await
            .unwrap();

        let body = single_body(&server).await;
        assert!(body.contains(r#"name="video"; filename="video.mp4""#));
        assert!(body.contains("content-type: video/mp4"));
    }

    #[tokio::test]
    async fn test_upload_document_keeps_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TOKEN/sendDocument"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .upload_document(&ChatId::Id(42), b"%pdf".to_vec(), "application/pdf")
            .await
            .unwrap();

        let body = single_body(&server).await;
        assert!(body.contains(r#"name="document"; filename="file.bin""#));
        assert!(body.contains("content-type: application/pdf"));
    }

    #[tokio::test]
    async fn test_api_error_carries_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .upload_photo(&ChatId::Id(1), vec![0])
            .await
            .unwrap_err();

        match err {
            RelayError::Platform {
                method,
                description,
            } => {
                assert_eq!(method, "sendPhoto");
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .send_text(&ChatId::Id(1), "x")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_unparseable_content_type_still_sends_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:TOKEN/sendDocument"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .upload_document(&ChatId::Id(1), b"%pdf".to_vec(), "pdf")
            .await
            .unwrap();

        let body = single_body(&server).await;
        assert!(body.contains(r#"name="document"; filename="file.bin""#));
        assert!(body.contains("content-type: application/octet-stream"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_token() {
        let config = TelegramConfig {
            bot_token: "123:SECRETTOKEN".to_string(),
            api_url: "http://127.0.0.1:1".to_string(),
        };
        let client = TelegramClient::new(reqwest::Client::new(), &config);

        let err = client
            .upload_video(&ChatId::Id(1), vec![0])
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Transport(_)));
        assert!(!err.to_string().contains("SECRETTOKEN"));
        assert!(!err.user_message().contains("SECRETTOKEN"));
        assert!(!format!("{:?}", err).contains("SECRETTOKEN"));
    }
}
