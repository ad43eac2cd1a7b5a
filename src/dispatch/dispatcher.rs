//! Dispatcher - routes bus messages to subscribed handlers

use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use futures::future::join_all;
use pairing_shared::{AddressPattern, PlatformMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// A handler that can be registered with the dispatcher
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Short name used in logs and dead letters
    fn name(&self) -> &'static str;

    async fn handle(&self, msg: &PlatformMessage) -> HandlerResult;
}

/// A message a handler failed on, handed to the dead-letter sink
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub message: PlatformMessage,
    pub handler: &'static str,
    pub reason: String,
}

/// Result of dispatching one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No route matched the message
    Unrouted,
    /// Every matching handler succeeded
    Handled { handlers: usize },
    /// At least one matching handler failed
    Failed {
        handlers: usize,
        failed: Vec<&'static str>,
    },
}

struct Route {
    source: AddressPattern,
    message_type: String,
    handler: Arc<dyn MessageHandler>,
}

impl Route {
    fn matches(&self, msg: &PlatformMessage) -> bool {
        msg.is(&self.message_type) && self.source.matches(msg.source())
    }
}

/// Routing table owned by the bus consumer
///
/// Routes are registered up front; after that the dispatcher is shared
/// read-only between connection tasks.
#[derive(Default)]
pub struct Dispatcher {
    routes: Vec<Route>,
    dead_letters: Option<mpsc::UnboundedSender<DeadLetter>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send failed messages to a dead-letter channel
    pub fn with_dead_letters(mut self, sink: mpsc::UnboundedSender<DeadLetter>) -> Self {
        self.dead_letters = Some(sink);
        self
    }

    /// Subscribe a handler to messages of `message_type` from sources matching `source`
    pub fn register(
        &mut self,
        source: AddressPattern,
        message_type: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
    ) -> &mut Self {
        let message_type = message_type.into();
        debug!(
            source = %source,
            message_type = %message_type,
            handler = handler.name(),
            "Registered route"
        );
        self.routes.push(Route {
            source,
            message_type,
            handler,
        });
        self
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Deliver a message to every matching handler
    pub async fn dispatch(&self, msg: &PlatformMessage) -> DispatchOutcome {
        let matching: Vec<&Route> = self.routes.iter().filter(|r| r.matches(msg)).collect();

        if matching.is_empty() {
            debug!(
                source = %msg.source(),
                message_type = msg.message_type(),
                "No route for message"
            );
            return DispatchOutcome::Unrouted;
        }

        let results = join_all(matching.iter().map(|route| async move {
            (route.handler.name(), route.handler.handle(msg).await)
        }))
        .await;

        let handlers = results.len();
        let mut failed = Vec::new();

        for (handler, result) in results {
            if let Err(e) = result {
                self.reject(msg, handler, &e);
                failed.push(handler);
            }
        }

        if failed.is_empty() {
            DispatchOutcome::Handled { handlers }
        } else {
            DispatchOutcome::Failed { handlers, failed }
        }
    }

    fn reject(&self, msg: &PlatformMessage, handler: &'static str, e: &HandlerError) {
        error!(
            handler,
            source = %msg.source(),
            message_type = msg.message_type(),
            place_id = msg.place_id().unwrap_or_default(),
            error = %e,
            "Handler failed"
        );

        if let Some(sink) = &self.dead_letters {
            let letter = DeadLetter {
                message: msg.clone(),
                handler,
                reason: e.to_string(),
            };
            if sink.send(letter).is_err() {
                error!(handler, "Dead-letter channel closed, dropping failed message");
            }
        }
    }
}
