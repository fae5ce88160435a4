use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::anchor::{AnchorTracker, REPOSITION_INTERVAL};
use crate::observer::{is_scan_relevant, Debouncer, PageChange, SCAN_DEBOUNCE};
use crate::page::PageSnapshot;
use crate::scan::{Detection, Scanner};

/// Host seam: produces a fresh snapshot of the page on demand.
#[async_trait]
pub trait PageProvider: Send + Sync {
    async fn snapshot(&self) -> PageSnapshot;
}

/// The scanner's event loop: one initial scan, then debounced rescans on
/// relevant page changes, with anchor repositioning on a fixed timer.
/// New detections are pushed to the host as they are found.
pub struct ScanService<P> {
    provider: P,
    scanner: Scanner,
    tracker: AnchorTracker,
    detections_tx: mpsc::Sender<Detection>,
}

impl<P: PageProvider> ScanService<P> {
    pub fn new(provider: P, detections_tx: mpsc::Sender<Detection>) -> Self {
        Self {
            provider,
            scanner: Scanner::new(),
            tracker: AnchorTracker::new(),
            detections_tx,
        }
    }

    async fn rescan(&mut self) {
        let snapshot = self.provider.snapshot().await;
        for detection in self.scanner.scan(&snapshot) {
            self.tracker.attach(&detection);
            if self.detections_tx.send(detection).await.is_err() {
                return;
            }
        }
    }

    /// Runs until the change channel closes.
    pub async fn run(mut self, mut changes: mpsc::Receiver<PageChange>) {
        self.rescan().await;

        let mut debouncer = Debouncer::new(SCAN_DEBOUNCE);
        let mut reposition = tokio::time::interval(REPOSITION_INTERVAL);
        reposition.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let scan_deadline = debouncer.deadline().map(tokio::time::Instant::from_std);
            tokio::select! {
                maybe = changes.recv() => match maybe {
                    Some(change) => {
                        let snapshot = self.provider.snapshot().await;
                        if is_scan_relevant(&snapshot, &change) {
                            debouncer.note(tokio::time::Instant::now().into_std());
                        }
                    }
                    None => break,
                },
                _ = reposition.tick() => {
                    let snapshot = self.provider.snapshot().await;
                    let removed = self.tracker.refresh(&snapshot);
                    if !removed.is_empty() {
                        debug!(count = removed.len(), "Anchors removed for detached elements");
                    }
                }
                _ = async { tokio::time::sleep_until(scan_deadline.unwrap()).await },
                        if scan_deadline.is_some() => {
                    debouncer.fire(tokio::time::Instant::now().into_std());
                    self.rescan().await;
                }
            }
        }
    }
}
