use tokio::sync::watch;

use crate::PriceSnapshot;

/// Latest successfully fetched snapshot, or `None` before the first one.
///
/// Single writer, many readers. Writes replace the whole snapshot and there is
/// no way back to `None`.
#[derive(Debug)]
pub struct PriceState {
    tx: watch::Sender<Option<PriceSnapshot>>,
}

impl PriceState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn write(&self, snapshot: PriceSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    pub fn read(&self) -> Option<PriceSnapshot> {
        *self.tx.borrow()
    }

}

impl Default for PriceState {
    fn default() -> Self {
        Self::new()
    }
}
