//! The typed outbound API.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use courier_core::api::{
    AnswerCallbackQuery, DeleteMyCommands, DeleteWebhook, ForwardMessage, GetFile, GetMe,
    GetMyCommands, GetUpdates, GetWebhookInfo, SendChatAction, SendContact, SendDice,
    SendDocument, SendLocation, SendMediaGroup, SendMessage, SendPhoto, SendPoll, SetMyCommands,
    SetWebhook,
};
use courier_core::types::{BotCommand, File, Message, User, WebhookInfo};
use courier_core::{ApiError, ApiMethod, ApiResult, ClientConfig, Params, TransportResult, Update};
use courier_transport::{Attachment, BodyBuilder, HttpTransport, Method};

/// Handle to the bot API.
///
/// Cheap to clone; clones share the connection pool and configuration.
#[derive(Clone, Debug)]
pub struct Bot {
    transport: Arc<HttpTransport>,
}

/// A `getUpdates` result split into the updates that decoded and the highest
/// id seen, including items that failed to decode.
#[derive(Debug, Default)]
pub(crate) struct UpdateBatch {
    pub updates: Vec<Update>,
    pub max_id: Option<i64>,
}

impl Bot {
    /// Creates a bot with an HTTP client configured from `config`.
    pub fn new(config: ClientConfig) -> TransportResult<Self> {
        Ok(Self::from_transport(HttpTransport::new(config)?))
    }

    /// Creates a bot around a caller-supplied HTTP client.
    pub fn with_client(config: ClientConfig, client: Client) -> Self {
        Self::from_transport(HttpTransport::with_client(config, client))
    }

    /// Creates a bot on top of an existing transport.
    pub fn from_transport(transport: HttpTransport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    // =========================================================================
    // Generic calls
    // =========================================================================

    /// Executes a typed request.
    pub async fn execute<M: ApiMethod>(&self, request: &M) -> ApiResult<M::Output> {
        self.call(M::NAME, request).await
    }

    /// Calls `method` with `params` and decodes the result as `R`.
    ///
    /// The body is JSON unless a field is an upload.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> ApiResult<R>
    where
        P: Params + ?Sized,
        R: DeserializeOwned,
    {
        self.call_with_files(method, params, Vec::new()).await
    }

    /// Calls `method` with `params` plus supplementary file attachments.
    ///
    /// An attachment named like a field of `params` replaces that field.
    pub async fn call_with_files<P, R>(
        &self,
        method: &str,
        params: &P,
        files: Vec<Attachment>,
    ) -> ApiResult<R>
    where
        P: Params + ?Sized,
        R: DeserializeOwned,
    {
        let body = BodyBuilder::auto(params, files).await?;
        let value = self.transport.send(Method::POST, method, Some(body), None).await?;
        decode(method, value)
    }

    /// Calls `method` with a raw JSON object and returns the raw result.
    ///
    /// `Value::Null` sends a `GET` without a body.
    pub async fn call_raw(&self, method: &str, params: Value) -> ApiResult<Value> {
        if params.is_null() {
            return self.transport.send(Method::GET, method, None, None).await;
        }
        let body = BodyBuilder::auto(&params, Vec::new()).await?;
        self.transport.send(Method::POST, method, Some(body), None).await
    }

    // =========================================================================
    // Updates and webhook
    // =========================================================================

    pub async fn get_me(&self) -> ApiResult<User> {
        self.execute(&GetMe {}).await
    }

    /// Fetches pending updates.
    ///
    /// Items that fail to decode are logged and dropped individually.
    pub async fn get_updates(&self, request: &GetUpdates) -> ApiResult<Vec<Update>> {
        Ok(self.fetch_updates(request).await?.updates)
    }

    pub(crate) async fn fetch_updates(&self, request: &GetUpdates) -> ApiResult<UpdateBatch> {
        let raw: Vec<Value> = self.call(GetUpdates::NAME, request).await?;
        let mut batch = UpdateBatch::default();

        for item in raw {
            let id = item.get("update_id").and_then(Value::as_i64);
            if let Some(id) = id {
                batch.max_id = Some(batch.max_id.map_or(id, |max| max.max(id)));
            }
            match serde_json::from_value::<Update>(item) {
                Ok(update) => batch.updates.push(update),
                Err(e) => warn!(update_id = ?id, error = %e, "Dropping malformed update"),
            }
        }

        debug!(count = batch.updates.len(), max_id = ?batch.max_id, "Fetched updates");
        Ok(batch)
    }

    pub async fn set_webhook(&self, request: &SetWebhook) -> ApiResult<bool> {
        self.execute(request).await
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> ApiResult<bool> {
        self.execute(&DeleteWebhook {
            drop_pending_updates,
        })
        .await
    }

    pub async fn get_webhook_info(&self) -> ApiResult<WebhookInfo> {
        self.execute(&GetWebhookInfo {}).await
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub async fn get_my_commands(&self, request: &GetMyCommands) -> ApiResult<Vec<BotCommand>> {
        self.execute(request).await
    }

    pub async fn set_my_commands(&self, request: &SetMyCommands) -> ApiResult<bool> {
        self.execute(request).await
    }

    pub async fn delete_my_commands(&self, request: &DeleteMyCommands) -> ApiResult<bool> {
        self.execute(request).await
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub async fn send_message(&self, request: &SendMessage) -> ApiResult<Message> {
        self.execute(request).await
    }

    /// Sends a photo; a local or in-memory photo is uploaded as multipart.
    pub async fn send_photo(&self, request: &SendPhoto) -> ApiResult<Message> {
        self.execute(request).await
    }

    pub async fn send_document(&self, request: &SendDocument) -> ApiResult<Message> {
        self.execute(request).await
    }

    /// Sends an album. Uploaded items travel as separate multipart parts.
    pub async fn send_media_group(&self, request: &SendMediaGroup) -> ApiResult<Vec<Message>> {
        self.execute(request).await
    }

    pub async fn send_location(&self, request: &SendLocation) -> ApiResult<Message> {
        self.execute(request).await
    }

    pub async fn send_contact(&self, request: &SendContact) -> ApiResult<Message> {
        self.execute(request).await
    }

    pub async fn send_poll(&self, request: &SendPoll) -> ApiResult<Message> {
        self.execute(request).await
    }

    pub async fn send_dice(&self, request: &SendDice) -> ApiResult<Message> {
        self.execute(request).await
    }

    pub async fn send_chat_action(&self, request: &SendChatAction) -> ApiResult<bool> {
        self.execute(request).await
    }

    pub async fn forward_message(&self, request: &ForwardMessage) -> ApiResult<Message> {
        self.execute(request).await
    }

    pub async fn answer_callback_query(&self, request: &AnswerCallbackQuery) -> ApiResult<bool> {
        self.execute(request).await
    }

    // =========================================================================
    // Files
    // =========================================================================

    pub async fn get_file(&self, file_id: impl Into<String>) -> ApiResult<File> {
        self.execute(&GetFile {
            file_id: file_id.into(),
        })
        .await
    }

    /// Downloads a file by the `file_path` returned from [`get_file`](Self::get_file).
    pub async fn download_file(&self, file_path: &str) -> ApiResult<Bytes> {
        self.transport.download(file_path).await
    }
}

fn decode<R: DeserializeOwned>(method: &str, value: Value) -> ApiResult<R> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use courier_core::InputFile;
    use courier_core::api::InputMedia;
    use courier_core::types::BotCommandScope;

    use super::*;

    fn bot(server: &MockServer) -> Bot {
        let config = ClientConfig::new("1:t")
            .with_api_url(server.uri())
            .with_file_url(format!("{}/file", server.uri()));
        Bot::new(config).unwrap()
    }

    fn ok(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": result}))
    }

    #[tokio::test]
    async fn get_me_decodes_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/getMe"))
            .respond_with(ok(json!({"id": 7, "is_bot": true, "first_name": "Courier"})))
            .mount(&server)
            .await;

        let me = bot(&server).get_me().await.unwrap();
        assert_eq!(me.id, 7);
        assert!(me.is_bot);
    }

    #[tokio::test]
    async fn send_message_surfaces_remote_error() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "bad request",
                "error_code": 400
            })))
            .mount(&server)
            .await;

        let err = bot(&server)
            .send_message(&SendMessage::new(5i64, "hi"))
            .await
            .unwrap_err();
        let remote = err.as_remote().unwrap();
        assert_eq!(remote.error_code, 400);
        assert_eq!(remote.description, "bad request");
    }

    #[tokio::test]
    async fn get_updates_drops_malformed_items() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/getUpdates"))
            .and(body_json(json!({"offset": 10})))
            .respond_with(ok(json!([
                {"update_id": 10, "poll": {"id": "p", "question": "?", "options": [],
                    "total_voter_count": 0, "is_closed": false, "is_anonymous": true,
                    "type": "regular", "allows_multiple_answers": false}},
                {"update_id": 11, "message": "not a message"},
                {"update_id": 12, "something_new": {}}
            ])))
            .mount(&server)
            .await;

        let request = GetUpdates {
            offset: Some(10),
            ..GetUpdates::default()
        };
        let batch = bot(&server).fetch_updates(&request).await.unwrap();

        let ids: Vec<i64> = batch.updates.iter().map(|u| u.update_id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(batch.max_id, Some(12));
        assert!(batch.updates[1].kind.is_unknown());
    }

    #[tokio::test]
    async fn unexpected_result_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/getWebhookInfo"))
            .respond_with(ok(json!("not an object")))
            .mount(&server)
            .await;

        let err = bot(&server).get_webhook_info().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref method, .. } if method == "getWebhookInfo"));
    }

    #[tokio::test]
    async fn set_my_commands_sends_scope_as_json() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/setMyCommands"))
            .and(body_json(json!({
                "commands": [{"command": "start", "description": "Start"}],
                "scope": {"type": "all_private_chats"}
            })))
            .respond_with(ok(json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let request = SetMyCommands {
            scope: Some(BotCommandScope::AllPrivateChats),
            ..SetMyCommands::new(vec![BotCommand::new("start", "Start")])
        };
        assert!(bot(&server).set_my_commands(&request).await.unwrap());
    }

    #[tokio::test]
    async fn in_memory_photo_is_uploaded_as_multipart() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/sendPhoto"))
            .respond_with(ok(json!({"message_id": 3, "date": 0, "chat": {"id": 5, "type": "private"}})))
            .mount(&server)
            .await;

        let request = SendPhoto::new(5i64, InputFile::memory("cat.png", &b"png"[..]));
        let message = bot(&server).send_photo(&request).await.unwrap();
        assert_eq!(message.message_id, 3);

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"cat.png\""));
    }

    #[tokio::test]
    async fn media_group_uploads_attach_parts() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/sendMediaGroup"))
            .respond_with(ok(json!([
                {"message_id": 3, "date": 0, "chat": {"id": 5, "type": "private"}},
                {"message_id": 4, "date": 0, "chat": {"id": 5, "type": "private"}}
            ])))
            .mount(&server)
            .await;

        let request = SendMediaGroup::new(
            5i64,
            vec![
                InputMedia::photo(InputFile::memory("one.png", &b"png"[..])),
                InputMedia::photo("AgACAgIAAxk"),
            ],
        );
        let messages = bot(&server).send_media_group(&request).await.unwrap();
        assert_eq!(messages.len(), 2);

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"file0\"; filename=\"one.png\""));
        assert!(body.contains(r#""media":"attach://file0""#));
        assert!(body.contains(r#""media":"AgACAgIAAxk""#));
    }

    #[tokio::test]
    async fn location_is_sent_as_json() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/sendLocation"))
            .and(body_json(json!({"chat_id": 5, "latitude": 51.5, "longitude": -0.125})))
            .respond_with(ok(json!({
                "message_id": 9, "date": 0, "chat": {"id": 5, "type": "private"},
                "location": {"latitude": 51.5, "longitude": -0.125}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let message = bot(&server)
            .send_location(&SendLocation::new(5i64, 51.5, -0.125))
            .await
            .unwrap();
        assert_eq!(message.message_id, 9);
    }

    #[tokio::test]
    async fn call_raw_without_params_uses_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bot1:t/logOut"))
            .respond_with(ok(json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let result = bot(&server).call_raw("logOut", Value::Null).await.unwrap();
        assert_eq!(result, json!(true));
    }

    #[tokio::test]
    async fn download_file_uses_file_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file/bot1:t/photos/a.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .mount(&server)
            .await;

        let bytes = bot(&server).download_file("photos/a.jpg").await.unwrap();
        assert_eq!(&bytes[..], b"jpeg");
    }
}
