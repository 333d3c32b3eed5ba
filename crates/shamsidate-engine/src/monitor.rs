//! Incremental re-scanning.
//!
//! The host environment reports structural changes as a stream of
//! [`TreeEvent`]s over a channel; there are no ad hoc callbacks. The
//! [`ChangeMonitor`] drains that channel, coalesces bursts inside a
//! debounce window, caps batch size to bound pass latency, and hands each
//! batch to the [`Engine`], which owns all scanning state. Nothing here
//! lets an error escape: catching and logging is the terminal policy at
//! every entry point.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::time::{Duration, Instant};

use crate::profile::{self, PageFormatProfile};
use crate::scan::{ContentScanner, NodeId, ScanOptions, ScanStats, Tree, guards};

/// A structural change the host observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    /// A subtree rooted at `node` was inserted after the initial scan.
    SubtreeInserted { node: NodeId },
    /// An external collaborator (navigation, visibility change, timed
    /// sweep) asked for a full re-scan. The timestamp is opaque.
    RescanRequested { timestamp_ms: u64 },
}

/// Batching knobs for the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Window within which change notifications coalesce into one batch.
    pub debounce: Duration,
    /// Cap on events per batch, bounding worst-case pass latency.
    pub max_batch: usize,
    /// Bytes of inserted-subtree text sampled by the cheap date-shape
    /// pre-check before it gives up and scans anyway.
    pub precheck_bytes: usize,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            max_batch: 32,
            precheck_bytes: 2048,
        }
    }
}

/// All mutable scanning state, owned in one place — no module globals.
pub struct Engine {
    scanner: ContentScanner,
    in_progress: bool,
    last_profile: Option<PageFormatProfile>,
    queued: Vec<TreeEvent>,
}

impl Engine {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            scanner: ContentScanner::new(options),
            in_progress: false,
            last_profile: None,
            queued: Vec::new(),
        }
    }

    /// The diagnostic profile recorded by the last [`initial_scan`].
    ///
    /// [`initial_scan`]: Engine::initial_scan
    pub fn last_profile(&self) -> Option<&PageFormatProfile> {
        self.last_profile.as_ref()
    }

    /// Profile the document, then scan it in full.
    pub fn initial_scan(&mut self, tree: &mut Tree) -> ScanStats {
        self.last_profile = profile::profile(tree);
        self.process_batch(tree, vec![TreeEvent::RescanRequested { timestamp_ms: 0 }])
    }

    /// Apply one batch of change events.
    ///
    /// Scans are mutually exclusive: a batch arriving while another is in
    /// flight is queued and replayed once the current pass completes,
    /// never dropped and never run concurrently.
    pub fn process_batch(&mut self, tree: &mut Tree, events: Vec<TreeEvent>) -> ScanStats {
        if self.in_progress {
            log::debug!("scan in progress, queueing {} event(s)", events.len());
            self.queued.extend(events);
            return ScanStats::default();
        }

        self.in_progress = true;
        let mut stats = ScanStats::default();
        for event in events {
            match event {
                TreeEvent::SubtreeInserted { node } => {
                    stats.merge(self.scanner.scan_subtree(tree, node));
                }
                TreeEvent::RescanRequested { timestamp_ms } => {
                    log::debug!("full re-scan requested (t={timestamp_ms})");
                    let root = tree.root();
                    stats.merge(self.scanner.scan_subtree(tree, root));
                }
            }
        }
        self.in_progress = false;

        // Replay anything that arrived mid-pass.
        if !self.queued.is_empty() {
            let replay = std::mem::take(&mut self.queued);
            stats.merge(self.process_batch(tree, replay));
        }
        stats
    }
}

/// Consumer side of the host's change-notification channel.
pub struct ChangeMonitor {
    rx: Receiver<TreeEvent>,
    options: MonitorOptions,
}

impl ChangeMonitor {
    /// Create the channel pair: the host keeps the sender, the monitor the
    /// receiver.
    pub fn channel(options: MonitorOptions) -> (Sender<TreeEvent>, Self) {
        let (tx, rx) = channel();
        (tx, Self { rx, options })
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Block for the next batch: wait for one event, then keep draining
    /// until the debounce window closes or the batch cap is hit.
    ///
    /// Returns `None` once the host has dropped its sender.
    pub fn next_batch(&self) -> Option<Vec<TreeEvent>> {
        let first = self.rx.recv().ok()?;
        let mut batch = vec![first];
        let deadline = Instant::now() + self.options.debounce;

        while batch.len() < self.options.max_batch {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(event) => batch.push(event),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        Some(batch)
    }

    /// Drain batches until the channel closes, feeding each to the engine.
    pub fn run(&self, engine: &mut Engine, tree: &mut Tree) {
        while let Some(batch) = self.next_batch() {
            if !self.worth_scanning(tree, &batch) {
                log::debug!("batch of {} event(s) has no date-shaped text", batch.len());
                continue;
            }
            engine.process_batch(tree, batch);
        }
    }

    /// Cheap pre-check before committing to a traversal: an explicit
    /// re-scan request always runs, otherwise at least one inserted
    /// subtree must contain something date-shaped.
    fn worth_scanning(&self, tree: &Tree, batch: &[TreeEvent]) -> bool {
        batch.iter().any(|event| match event {
            TreeEvent::RescanRequested { .. } => true,
            TreeEvent::SubtreeInserted { node } => self.subtree_has_dates(tree, *node),
        })
    }

    /// Walk one inserted subtree's text until a date shape turns up or the
    /// sampling budget runs out. Exhausting the budget without a verdict
    /// means scan anyway: the pre-check may only skip work it has proven
    /// unnecessary.
    fn subtree_has_dates(&self, tree: &Tree, root: NodeId) -> bool {
        let mut sampled = 0usize;
        for id in tree.preorder(root) {
            if let Some(text) = tree.text(id) {
                if guards::has_date_shaped_content(text) {
                    return true;
                }
                sampled += text.len();
                if sampled >= self.options.precheck_bytes {
                    return true;
                }
            }
        }
        false
    }
}
