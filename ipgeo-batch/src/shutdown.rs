//! Interrupt handling for a running batch
//!
//! The first interrupt cancels dispatch and lets in-flight lookups drain. A
//! second one means the user is done waiting.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancel `cancel` on the first signal and return once a second arrives
///
/// Returns `true` on the second signal and `false` if the signal source
/// fails, in which case the caller has no way to force an exit.
pub async fn cancel_then_force<F, Fut>(cancel: CancellationToken, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_signal().await {
        error!("Failed to listen for interrupt: {}", e);
        return false;
    }
    info!("Interrupt received, stopping after in-flight lookups (again to quit now)");
    cancel.cancel();

    match next_signal().await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to listen for interrupt: {}", e);
            false
        }
    }
}
