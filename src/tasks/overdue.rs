use chrono::Utc;
use std::time::Duration;

use crate::services::pending_payments::PendingPaymentBook;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodically flags obligations past their due date. Spawned once at
/// startup; runs for the lifetime of the process.
pub async fn start_overdue_task(obligations: PendingPaymentBook) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let flagged = obligations.mark_overdue(Utc::now());
        if flagged > 0 {
            log::info!("flagged {} pending payments as overdue", flagged);
        }
    }
}
