use crate::assets::{AssetStore, FsAssetStore};
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::inbound::InboundQueue;
use crate::outbound::OutboundLog;
use crate::processor::{EventSink, RelayProcessor, TickSummary};
use crate::registry::SessionRegistry;
use crate::transport::{router, TransportListener, TransportState};
use log::{info, warn};
use std::net::SocketAddr;
use std::process::Command;
use std::sync::Arc;

/// A running relay: the listener thread plus the tick-side processor.
///
/// The host owns this value on its tick thread and calls [`Relay::tick`] once
/// per frame. Broadcasts may come from any thread through [`Relay::outbound`].
pub struct Relay {
    processor: RelayProcessor,
    outbound: Arc<OutboundLog>,
    listener: TransportListener,
}

impl Relay {
    /// Starts a relay serving pages from the configured asset paths.
    ///
    /// An error means the relay is unavailable; hosts should carry on without it.
    pub fn start(config: &RelayConfig) -> Result<Self, RelayError> {
        Self::start_with_assets(config, Arc::new(FsAssetStore::new(&config.assets)))
    }

    pub fn start_with_assets(
        config: &RelayConfig,
        assets: Arc<dyn AssetStore>,
    ) -> Result<Self, RelayError> {
        let outbound = Arc::new(OutboundLog::new(config.log_capacity));
        let (inbound_tx, inbound) = InboundQueue::new();

        let state = TransportState::new(inbound_tx, Arc::clone(&outbound), assets);
        let listener = TransportListener::spawn(
            &config.bind_address(),
            router(state, config.request_timeout),
        )?;

        if config.auto_open_browser {
            open_browser(&config.browser_url(listener.local_addr().port()));
        }

        Ok(Self {
            processor: RelayProcessor::new(inbound, Arc::clone(&outbound)),
            outbound,
            listener,
        })
    }

    /// Processes everything received since the previous tick.
    pub fn tick<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> TickSummary {
        self.processor.tick(sink)
    }

    /// Queues `content` for polling clients and returns its record id.
    pub fn broadcast(&self, content: impl Into<String>) -> u64 {
        self.outbound.append(content)
    }

    /// Broadcast handle that can be moved to other threads.
    pub fn outbound(&self) -> Arc<OutboundLog> {
        Arc::clone(&self.outbound)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        self.processor.registry()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn is_running(&self) -> bool {
        self.listener.is_running()
    }

    pub fn stop(&mut self) {
        if self.listener.is_running() {
            info!("Stopping relay on {}", self.listener.local_addr());
        }
        self.listener.stop();
    }
}

fn open_browser(url: &str) {
    let result = if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", "", url]).spawn()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => info!("Opened {} in browser", url),
        Err(e) => warn!("Could not open browser at {}: {}", url, e),
    }
}
