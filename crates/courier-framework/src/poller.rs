//! Long-polling update source.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use courier_core::api::GetUpdates;
use courier_core::ApiResult;

use crate::bot::UpdateBatch;
use crate::dispatcher::Dispatcher;

/// Default pause between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Highest update id handled so far, kept in memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCursor {
    last: i64,
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The highest id handled; zero before the first update.
    pub fn last(&self) -> i64 {
        self.last
    }

    /// The `offset` to request: everything after the cursor.
    pub fn offset(&self) -> i64 {
        self.last + 1
    }

    /// Whether `update_id` is newer than the cursor.
    pub fn accept(&self, update_id: i64) -> bool {
        update_id > self.last
    }

    /// Moves the cursor to `max_id`. Never moves backwards.
    pub fn advance(&mut self, max_id: i64) {
        if max_id > self.last {
            self.last = max_id;
        }
    }
}

/// Settings of the polling loop.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Pause before each poll.
    pub interval: Duration,
    /// Long polling timeout in seconds passed to `getUpdates`.
    pub timeout_secs: u32,
    /// Maximum updates per batch.
    pub limit: Option<u32>,
    /// Kinds to receive; empty keeps the service's previous setting.
    pub allowed_updates: Vec<String>,
    /// Discard updates queued before polling starts.
    pub drop_pending_updates: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout_secs: 0,
            limit: None,
            allowed_updates: Vec::new(),
            drop_pending_updates: false,
        }
    }
}

/// Pulls updates with `getUpdates` and routes them through a [`Dispatcher`].
///
/// Polls are serial: the next request is only sent after every update of
/// the previous batch has been handled. The cursor moves to the highest id
/// of a batch after the whole batch is routed, so a crash mid-batch causes
/// at most that batch to be delivered again.
pub struct Poller {
    dispatcher: Arc<Dispatcher>,
    options: PollOptions,
    cursor: Mutex<PollCursor>,
}

impl Poller {
    pub fn new(dispatcher: Arc<Dispatcher>, options: PollOptions) -> Self {
        Self {
            dispatcher,
            options,
            cursor: Mutex::new(PollCursor::new()),
        }
    }

    pub fn cursor(&self) -> PollCursor {
        *self.cursor.lock()
    }

    /// Fetches and routes one batch. Returns the number of updates routed.
    pub async fn poll_once(&self) -> ApiResult<usize> {
        let batch = self.fetch().await?;
        Ok(self.process(batch).await)
    }

    /// Polls until `shutdown` is cancelled.
    ///
    /// A configured webhook is removed first, as the service refuses
    /// `getUpdates` while one is set. Failed polls are logged and retried
    /// at the next tick. Cancellation is observed while waiting or fetching,
    /// never while a batch is being routed.
    pub async fn run_until(&self, shutdown: CancellationToken) {
        let bot = self.dispatcher.bot();
        if let Err(e) = bot.delete_webhook(self.options.drop_pending_updates).await {
            warn!(error = %e, "Failed to delete webhook before polling");
        }

        info!(interval = ?self.options.interval, "Polling for updates");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.options.interval) => {}
            }

            let batch = tokio::select! {
                _ = shutdown.cancelled() => break,
                batch = self.fetch() => batch,
            };

            match batch {
                Ok(batch) => {
                    self.process(batch).await;
                }
                Err(e) => {
                    warn!(error = %e, offset = self.cursor().offset(), "Error while polling");
                }
            }
        }

        info!(last_update_id = self.cursor().last(), "Polling stopped");
    }

    async fn fetch(&self) -> ApiResult<UpdateBatch> {
        let request = GetUpdates {
            offset: Some(self.cursor().offset()),
            limit: self.options.limit,
            timeout: Some(self.options.timeout_secs),
            allowed_updates: self.options.allowed_updates.clone(),
        };
        trace!(offset = ?request.offset, "Polling");
        self.dispatcher.bot().fetch_updates(&request).await
    }

    async fn process(&self, batch: UpdateBatch) -> usize {
        let UpdateBatch {
            mut updates,
            max_id,
        } = batch;
        let cursor = self.cursor();

        updates.sort_by_key(|u| u.update_id);
        updates.retain(|u| {
            let fresh = cursor.accept(u.update_id);
            if !fresh {
                debug!(update_id = u.update_id, "Skipping already handled update");
            }
            fresh
        });

        let routed = updates.len();
        for update in updates {
            self.dispatcher.handle_update(update).await;
        }

        if let Some(max_id) = max_id {
            self.cursor.lock().advance(max_id);
        }
        routed
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("options", &self.options)
            .field("cursor", &self.cursor())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use courier_core::ClientConfig;
    use courier_core::types::Message;

    use super::*;
    use crate::bot::Bot;

    fn message(id: i64) -> Value {
        json!({
            "update_id": id,
            "message": {
                "message_id": id,
                "date": 0,
                "chat": {"id": 1, "type": "private"},
                "text": format!("m{id}")
            }
        })
    }

    fn batch(ids: &[i64]) -> ResponseTemplate {
        let updates: Vec<Value> = ids.iter().copied().map(message).collect();
        ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": updates}))
    }

    async fn mount_batch(server: &MockServer, offset: i64, ids: &[i64]) {
        Mock::given(path("/bot1:t/getUpdates"))
            .and(body_partial_json(json!({"offset": offset})))
            .respond_with(batch(ids))
            .mount(server)
            .await;
    }

    fn recording_poller(server: &MockServer) -> (Poller, Arc<Mutex<Vec<i64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bot = Bot::new(ClientConfig::new("1:t").with_api_url(server.uri())).unwrap();
        let mut dispatcher = Dispatcher::new(bot);

        let recorded = seen.clone();
        dispatcher.on_message(move |message: Message| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().push(message.message_id);
            }
        });

        let options = PollOptions {
            interval: Duration::from_millis(10),
            ..PollOptions::default()
        };
        (Poller::new(Arc::new(dispatcher), options), seen)
    }

    #[test]
    fn cursor_never_moves_backwards() {
        let mut cursor = PollCursor::new();
        assert_eq!(cursor.offset(), 1);

        cursor.advance(10);
        cursor.advance(4);
        assert_eq!(cursor.last(), 10);
        assert_eq!(cursor.offset(), 11);
        assert!(!cursor.accept(10));
        assert!(cursor.accept(11));
    }

    #[tokio::test]
    async fn cursor_follows_batch_maximum() {
        let server = MockServer::start().await;
        mount_batch(&server, 1, &[1, 2, 3]).await;
        mount_batch(&server, 4, &[4, 5]).await;
        mount_batch(&server, 6, &[6]).await;

        let (poller, seen) = recording_poller(&server);

        assert_eq!(poller.poll_once().await.unwrap(), 3);
        assert_eq!(poller.cursor().last(), 3);
        assert_eq!(poller.poll_once().await.unwrap(), 2);
        assert_eq!(poller.cursor().last(), 5);
        assert_eq!(poller.poll_once().await.unwrap(), 1);
        assert_eq!(poller.cursor().last(), 6);

        assert_eq!(*seen.lock(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn batch_is_routed_in_ascending_order() {
        let server = MockServer::start().await;
        mount_batch(&server, 1, &[9, 7, 8]).await;

        let (poller, seen) = recording_poller(&server);
        poller.poll_once().await.unwrap();

        assert_eq!(*seen.lock(), vec![7, 8, 9]);
        assert_eq!(poller.cursor().last(), 9);
    }

    #[tokio::test]
    async fn stale_updates_are_not_routed_twice() {
        let server = MockServer::start().await;
        mount_batch(&server, 1, &[1, 2]).await;
        mount_batch(&server, 3, &[2, 3]).await;

        let (poller, seen) = recording_poller(&server);
        poller.poll_once().await.unwrap();
        assert_eq!(poller.poll_once().await.unwrap(), 1);

        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn malformed_last_update_still_advances_cursor() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [message(1), {"update_id": 2, "message": 42}]
            })))
            .mount(&server)
            .await;

        let (poller, seen) = recording_poller(&server);
        assert_eq!(poller.poll_once().await.unwrap(), 1);
        assert_eq!(poller.cursor().last(), 2);
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[tokio::test]
    async fn failed_poll_keeps_cursor() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let (poller, _) = recording_poller(&server);
        let err = tokio_test::assert_err!(poller.poll_once().await);
        assert!(err.is_transport());
        assert_eq!(poller.cursor().last(), 0);
    }

    #[tokio::test]
    async fn run_until_survives_errors_and_stops_on_cancel() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/deleteWebhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        mount_batch(&server, 1, &[1, 2]).await;
        mount_batch(&server, 3, &[]).await;

        let (poller, seen) = recording_poller(&server);
        let poller = Arc::new(poller);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn({
            let poller = poller.clone();
            let shutdown = shutdown.clone();
            async move { poller.run_until(shutdown).await }
        });

        for _ in 0..200 {
            if seen.lock().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown.cancel();
        task.await.unwrap();

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(poller.cursor().last(), 2);
    }
}
