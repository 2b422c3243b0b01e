use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};

/// 给进行中请求留出的收尾时间
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// 等待 Ctrl+C
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}
