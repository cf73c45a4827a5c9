use std::{sync::Arc, time::Duration};

use price::{PriceSnapshot, PriceSource, PriceState};
use tracing::{debug, info, instrument, warn};

use crate::platform::Presence;

/// Polls the price feed, caches the result and mirrors it to the presence line.
///
/// Fetches never overlap: the next one starts only after the previous fetch
/// finished and the interval has elapsed, so the period drifts by the fetch
/// latency.
pub struct PriceTicker<S, P> {
    source: S,
    presence: P,
    state: Arc<PriceState>,
    interval: Duration,
}

impl<S, P> PriceTicker<S, P>
where
    S: PriceSource,
    P: Presence,
{
    pub fn new(source: S, presence: P, state: Arc<PriceState>, interval: Duration) -> Self {
        Self {
            source,
            presence,
            state,
            interval,
        }
    }

    /// One fetch cycle. Returns the snapshot written to state, if any.
    #[instrument(name = "price_tick", skip(self))]
    pub async fn tick(&self) -> Option<PriceSnapshot> {
        let snapshot = match self.source.fetch().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "price fetch failed, keeping previous price");
                return None;
            }
        };

        info!(
            price = %snapshot.price(),
            change_percent = %snapshot.change_percent(),
            "received price"
        );
        self.state.write(snapshot);

        let status = snapshot.status_text();
        match self.presence.set_status(&status).await {
            Ok(()) => debug!(status = %status, "status updated"),
            Err(e) => warn!(error = %e, "status update failed"),
        }

        Some(snapshot)
    }

    /// Runs for the lifetime of the process.
    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "price ticker started");

        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
