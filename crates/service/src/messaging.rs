//! Outbound message producer.
//!
//! Only a no-op producer exists; it logs each message and hands back a
//! synthetic receipt so callers can be wired as if a broker were present.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use common::RequestContext;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::health::Probe;

pub const TOPIC_PLAYER_REGISTERED: &str = "player.registered";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagingError {
    #[error("producer not started")]
    NotStarted,
    #[error("send failed: {0}")]
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub msg_id: String,
    pub topic: String,
}

#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn start(&self) -> Result<(), MessagingError>;
    async fn shutdown(&self) -> Result<(), MessagingError>;
    fn started(&self) -> bool;
    async fn send(&self, ctx: &RequestContext, topic: &str, payload: &[u8], keys: &[String]) -> Result<SendReceipt, MessagingError>;
}

#[derive(Debug, Default)]
pub struct NoopProducer {
    namesrv_addr: String,
    started: AtomicBool,
    seq: AtomicU64,
}

impl NoopProducer {
    pub fn new(namesrv_addr: impl Into<String>) -> Self {
        Self { namesrv_addr: namesrv_addr.into(), ..Default::default() }
    }
}

#[async_trait]
impl MessageProducer for NoopProducer {
    async fn start(&self) -> Result<(), MessagingError> {
        self.started.store(true, Ordering::SeqCst);
        info!(namesrv = %self.namesrv_addr, "message producer started (noop)");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), MessagingError> {
        self.started.store(false, Ordering::SeqCst);
        info!("message producer shut down (noop)");
        Ok(())
    }

    fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    #[instrument(skip(self, ctx, payload, keys), fields(trace_id = %ctx.trace_id(), topic = topic))]
    async fn send(&self, ctx: &RequestContext, topic: &str, payload: &[u8], keys: &[String]) -> Result<SendReceipt, MessagingError> {
        if !self.started() {
            return Err(MessagingError::NotStarted);
        }
        let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        info!(payload = %String::from_utf8_lossy(payload), keys = ?keys, "message sent (noop)");
        Ok(SendReceipt { msg_id: format!("noop-{n}"), topic: topic.to_string() })
    }
}

#[async_trait]
impl Probe for NoopProducer {
    async fn ping(&self) -> Result<(), String> {
        if self.started() { Ok(()) } else { Err(MessagingError::NotStarted.to_string()) }
    }
}
