//! Change-event intake
//!
//! Subscribes to the transactions event channel and hands each change event
//! to the dispatcher. Malformed messages are logged and skipped; the loop
//! ends on ctrl-c or when the subscription stream closes.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info, warn};
use wellflow_model::ChangeEvent;

use crate::dispatcher::{DispatchOutcome, UpdateEventDispatcher};
use crate::error::Result;

/// Redis pub/sub intake loop for the dispatcher
pub struct EventSubscriber {
    client: redis::Client,
    channel: String,
    dispatcher: Arc<UpdateEventDispatcher>,
}

impl EventSubscriber {
    /// Create a subscriber over a Redis client
    pub fn new(
        client: redis::Client,
        channel: impl Into<String>,
        dispatcher: Arc<UpdateEventDispatcher>,
    ) -> Self {
        Self {
            client,
            channel: channel.into(),
            dispatcher,
        }
    }

    /// Consume events until shutdown
    pub async fn run(&self) -> Result<()> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;
        info!("Subscribed to change events on {}", self.channel);

        let mut stream = pubsub.on_message();
        loop {
            tokio::select! {
                message = stream.next() => {
                    match message {
                        Some(message) => {
                            match message.get_payload::<String>() {
                                Ok(raw) => {
                                    self.handle_raw(&raw).await;
                                }
                                Err(err) => {
                                    error!("Failed to read change-event payload: {}", err);
                                }
                            }
                        }
                        None => {
                            warn!("Change-event stream closed");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Parse and dispatch one raw message
    ///
    /// Returns `None` for messages that are not change events.
    pub async fn handle_raw(&self, raw: &str) -> Option<DispatchOutcome> {
        match serde_json::from_str::<ChangeEvent>(raw) {
            Ok(event) => Some(self.dispatcher.handle_event(&event).await),
            Err(err) => {
                error!("Ignoring malformed change event: {}", err);
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDirectory;

    fn subscriber() -> EventSubscriber {
        // The client connects lazily; these tests never touch the network
        let client = redis::Client::open("redis://127.0.0.1:6379").expect("client");
        let dispatcher = Arc::new(UpdateEventDispatcher::new(
            Arc::new(MockDirectory::well("theta sam", 32, 8)),
            Vec::new(),
        ));
        EventSubscriber::new(client, "wellflow:transactions:events", dispatcher)
    }

    #[tokio::test]
    async fn test_malformed_messages_are_skipped() {
        assert_eq!(subscriber().handle_raw("{nope").await, None);
    }

    #[tokio::test]
    async fn test_events_reach_the_dispatcher() {
        let outcome = subscriber()
            .handle_raw(r#"{"Action":"Delete","PayloadType":"tblTransactions","Payload":"{}"}"#)
            .await
            .expect("parsed event");
        // The dispatcher rejects the delete, proving it saw the event
        assert!(!outcome.is_success());
    }
}
