//! Server state. Everything a handler needs is constructed up front and
//! injected here; nothing reaches for globals.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::mailer::Mailer;
use crate::signature::SignatureResolver;
use crate::storage::Store;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub signatures: SignatureResolver,
    /// Unix timestamp of server boot, for the status probe.
    pub boot_time: u64,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        let signatures = SignatureResolver::new(
            config.signature_dir.clone(),
            config.signature_url.clone(),
        );
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            config,
            store,
            mailer,
            signatures,
            boot_time,
        }
    }
}
