//! Services shared by every point: configuration, the transcoding factory,
//! the port allocator and the optional key exchange agent.

use crate::config::ControllerConfig;
use crate::media_point::FrontendReady;
use crate::ports::PortAllocator;
use crate::transport::{KeyExchangeAgent, TranscodingFactory};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Explicitly constructed and handed to the manager at startup
#[derive(Debug, Clone)]
pub struct MediaEnvironment {
    pub config: Arc<ControllerConfig>,
    pub factory: Arc<dyn TranscodingFactory>,
    pub allocator: Arc<PortAllocator>,
    pub key_exchange: Option<Arc<dyn KeyExchangeAgent>>,
    ready_tx: mpsc::UnboundedSender<FrontendReady>,
}

impl MediaEnvironment {
    /// Returns the environment and the receiving end of frontend allocation
    /// results, which the dispatcher drains.
    pub fn new(
        config: ControllerConfig,
        factory: Arc<dyn TranscodingFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<FrontendReady>) {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        (
            Self {
                config: Arc::new(config),
                factory,
                allocator: Arc::new(PortAllocator::new()),
                key_exchange: None,
                ready_tx,
            },
            ready_rx,
        )
    }

    pub fn with_key_exchange(mut self, agent: Arc<dyn KeyExchangeAgent>) -> Self {
        self.key_exchange = Some(agent);
        self
    }

    pub fn with_allocator(mut self, allocator: Arc<PortAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub(crate) fn ready_sender(&self) -> mpsc::UnboundedSender<FrontendReady> {
        self.ready_tx.clone()
    }
}
