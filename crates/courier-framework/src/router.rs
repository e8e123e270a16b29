//! Command handler registry.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::CourierContext;
use crate::handler::BoxedHandler;

/// Ordered mapping from command name to handler.
///
/// Names are compared exactly, without the prefix. Registering a name twice
/// keeps both entries; lookups run the first one.
#[derive(Default, Clone)]
pub struct CommandRouter {
    routes: Vec<(String, BoxedHandler)>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `name`.
    pub fn add(&mut self, name: impl Into<String>, handler: BoxedHandler) {
        let name = name.into();
        debug!(command = %name, "Registered command handler");
        self.routes.push((name, handler));
    }

    /// Runs the first handler registered for `name` once.
    ///
    /// Returns `false` when no handler matches; that is not an error.
    pub async fn dispatch(&self, name: &str, ctx: Arc<CourierContext>) -> bool {
        let Some((_, handler)) = self.routes.iter().find(|(n, _)| n == name) else {
            trace!(command = %name, "No handler for command");
            return false;
        };
        handler(ctx).await;
        true
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("commands", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use courier_core::{ClientConfig, Update};

    use super::*;
    use crate::bot::Bot;

    fn counting(counter: Arc<AtomicUsize>) -> BoxedHandler {
        Arc::new(move |_ctx| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    fn context() -> Arc<CourierContext> {
        let bot = Bot::new(ClientConfig::new("1:t")).unwrap();
        let update: Update = serde_json::from_value(json!({"update_id": 1})).unwrap();
        Arc::new(CourierContext::new(bot, Arc::new(update)))
    }

    #[tokio::test]
    async fn first_registration_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut router = CommandRouter::new();
        router.add("start", counting(first.clone()));
        router.add("start", counting(second.clone()));

        assert!(router.dispatch("start", context()).await);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(router.names().collect::<Vec<_>>(), vec!["start", "start"]);
    }

    #[tokio::test]
    async fn unknown_command_is_a_no_op() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut router = CommandRouter::new();
        router.add("start", counting(counter.clone()));

        assert!(!router.dispatch("stop", context()).await);
        assert!(!router.dispatch("Start", context()).await);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
