//! HTTP transport for API calls.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use courier_core::{ApiResponse, ApiResult, ClientConfig, TransportError, TransportResult};

use crate::body::{Body, Payload};

/// Adjusts a request before it is sent, e.g. to add headers.
pub type RequestMutator = Box<dyn FnOnce(RequestBuilder) -> RequestBuilder + Send>;

/// Issues API calls and unwraps the response envelope.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Creates a transport with a client configured from `config`.
    pub fn new(config: ClientConfig) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        Ok(Self::with_client(config, client))
    }

    /// Creates a transport around a caller-supplied client.
    pub fn with_client(config: ClientConfig, client: Client) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Calls `endpoint` and returns the envelope's `result`.
    ///
    /// The envelope is decoded whatever the HTTP status. `ok = false` becomes
    /// a remote error; a missing `result` on success becomes `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Body>,
        mutator: Option<RequestMutator>,
    ) -> ApiResult<Value> {
        let mut request = self
            .client
            .request(method, self.config.method_url(endpoint));

        if let Some(body) = body {
            let (payload, content_type) = body.into_parts();
            request = match payload {
                Payload::Json(bytes) => request.header(CONTENT_TYPE, content_type).body(bytes),
                Payload::Multipart(form) => request.multipart(form),
            };
        }
        if let Some(mutate) = mutator {
            request = mutate(request);
        }

        debug!(method = %endpoint, "Sending API request");

        let response = request.send().await.map_err(|e| TransportError::Request {
            endpoint: endpoint.to_string(),
            reason: e.without_url().to_string(),
        })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.without_url().to_string()))?;

        let envelope: ApiResponse<Value> =
            serde_json::from_slice(&bytes).map_err(|e| TransportError::InvalidResponse {
                status: status.as_u16(),
                reason: e.to_string(),
            })?;

        match envelope.into_result() {
            Ok(result) => {
                debug!(method = %endpoint, status = status.as_u16(), "API request succeeded");
                Ok(result.unwrap_or(Value::Null))
            }
            Err(remote) => {
                warn!(
                    method = %endpoint,
                    error_code = remote.error_code,
                    description = %remote.description,
                    "API request rejected"
                );
                Err(remote.into())
            }
        }
    }

    /// Downloads a stored file by its `file_path`.
    pub async fn download(&self, file_path: &str) -> ApiResult<Bytes> {
        debug!(file_path = %file_path, "Downloading file");

        let response = self
            .client
            .get(self.config.file_download_url(file_path))
            .send()
            .await
            .map_err(|e| TransportError::Request {
                endpoint: file_path.to_string(),
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason: text,
            }
            .into());
        }

        Ok(response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.without_url().to_string()))?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use courier_core::{ApiError, InputFile};

    use super::*;
    use crate::body::{Attachment, BodyBuilder, BodyMode};

    const TOKEN: &str = "123:abc";

    async fn transport(server: &MockServer) -> HttpTransport {
        let config = ClientConfig::new(TOKEN)
            .with_api_url(server.uri())
            .with_file_url(format!("{}/file", server.uri()));
        HttpTransport::new(config).unwrap()
    }

    #[tokio::test]
    async fn json_call_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"chat_id": 5, "text": "hi"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": {"message_id": 77}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = BodyBuilder::json(&json!({"chat_id": 5, "text": "hi"}), Vec::new()).unwrap();
        let result = transport(&server)
            .await
            .send(Method::POST, "sendMessage", Some(body), None)
            .await
            .unwrap();

        assert_eq!(result, json!({"message_id": 77}));
    }

    #[tokio::test]
    async fn failed_envelope_is_a_remote_error() {
        let server = MockServer::start().await;
        Mock::given(path("/bot123:abc/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "bad request",
                "error_code": 400
            })))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .send(Method::POST, "sendMessage", None, None)
            .await
            .unwrap_err();

        let remote = err.as_remote().unwrap();
        assert_eq!(remote.error_code, 400);
        assert_eq!(remote.description, "bad request");
    }

    #[tokio::test]
    async fn non_envelope_reply_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(path("/bot123:abc/getMe"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .send(Method::GET, "getMe", None, None)
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert!(matches!(
            err,
            ApiError::Transport(TransportError::InvalidResponse { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn missing_result_is_null() {
        let server = MockServer::start().await;
        Mock::given(path("/bot123:abc/deleteWebhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let result = transport(&server)
            .await
            .send(Method::POST, "deleteWebhook", None, None)
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn mutator_can_add_headers() {
        let server = MockServer::start().await;
        Mock::given(path("/bot123:abc/getMe"))
            .and(header("x-request-id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mutator: RequestMutator = Box::new(|req| req.header("x-request-id", "42"));
        let result = transport(&server)
            .await
            .send(Method::GET, "getMe", None, Some(mutator))
            .await
            .unwrap();
        assert_eq!(result, json!(true));
    }

    #[tokio::test]
    async fn multipart_sends_each_field_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendDocument"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": {"message_id": 1}})),
            )
            .mount(&server)
            .await;

        let params = json!({"chat_id": 9, "document": "placeholder"});
        let extra = vec![
            Attachment::new("document", InputFile::memory("raw", &b"file body"[..]))
                .with_file_name("report.txt"),
        ];
        let body = BodyBuilder::build(BodyMode::Multipart, &params, extra).await.unwrap();
        let boundary = body
            .content_type()
            .trim_start_matches("multipart/form-data; boundary=")
            .to_string();

        transport(&server)
            .await
            .send(Method::POST, "sendDocument", Some(body), None)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let received = String::from_utf8_lossy(&requests[0].body).into_owned();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();

        assert!(content_type.contains(&boundary));
        assert_eq!(received.matches("name=\"document\"").count(), 1);
        assert!(received.contains("filename=\"report.txt\""));
        assert!(received.contains("file body"));
        assert!(!received.contains("placeholder"));
    }

    #[tokio::test]
    async fn download_fetches_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file/bot123:abc/documents/file_3.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"contents".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/file/bot123:abc/documents/gone.txt"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let transport = transport(&server).await;
        let bytes = transport.download("documents/file_3.txt").await.unwrap();
        assert_eq!(&bytes[..], b"contents");

        let err = transport.download("documents/gone.txt").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Transport(TransportError::Status { status: 404, .. })
        ));
    }
}
