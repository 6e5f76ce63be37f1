//! Post-mount hydration.
//!
//! Once a composed page is mounted, every pending script block is loaded
//! concurrently and patched into the mounted container in place of its
//! placeholder. Each block succeeds or fails on its own. Copy-to-clipboard
//! wiring happens in the browser through [`COPY_SCRIPT`].

use std::future::Future;

use tokio::task::JoinSet;

use crate::compose::ComposedPage;
use crate::elements::{BlockContent, PendingScript};
use crate::error::FetchError;
use crate::source::ContentSource;

/// One delegated click handler on `#app` for every `.copy-btn`.
pub const COPY_SCRIPT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/copy-button.js"
));

/// The rendered container of one page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedPage {
    html: String,
}

impl MountedPage {
    pub fn mount(composed: &ComposedPage) -> Self {
        Self {
            html: composed.body.clone().into_string(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// Replaces the block's placeholder. Returns false when the block is no
    /// longer pending.
    pub fn patch(&mut self, block: &PendingScript, content: BlockContent<'_>) -> bool {
        let placeholder = block.markup(BlockContent::Pending).into_string();
        let Some(start) = self.html.find(&placeholder) else {
            return false;
        };
        let replacement = block.markup(content).into_string();
        self.html.replace_range(start..start + placeholder.len(), &replacement);
        true
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HydrationReport {
    pub loaded: usize,
    pub failed: usize,
    /// Blocks still pending when the page view was cancelled.
    pub cancelled: usize,
}

enum Step {
    Joined(Option<Result<(usize, Result<String, FetchError>), tokio::task::JoinError>>),
    Cancelled,
}

/// Loads every pending block concurrently and patches the results in as they
/// arrive. When `cancelled` resolves first, the remaining loads are aborted
/// and their blocks keep the placeholder; dropping the returned future aborts
/// them as well.
pub async fn hydrate<S, C>(
    mounted: &mut MountedPage,
    pending: &[PendingScript],
    source: &S,
    cancelled: C,
) -> HydrationReport
where
    S: ContentSource,
    C: Future<Output = ()>,
{
    let mut report = HydrationReport::default();
    if pending.is_empty() {
        return report;
    }

    let mut tasks = JoinSet::new();
    for (slot, block) in pending.iter().enumerate() {
        let source = source.clone();
        let locator = block.locator.clone();
        tasks.spawn(async move {
            let result = source.fetch_text(&locator).await;
            (slot, result)
        });
    }
    tracing::debug!(blocks = pending.len(), "Started deferred loads");

    let mut settled = vec![false; pending.len()];
    tokio::pin!(cancelled);
    loop {
        let step = tokio::select! {
            joined = tasks.join_next() => Step::Joined(joined),
            _ = &mut cancelled => Step::Cancelled,
        };

        match step {
            Step::Joined(None) => break,
            Step::Joined(Some(Ok((slot, Ok(text))))) => {
                mounted.patch(&pending[slot], BlockContent::Loaded(&text));
                settled[slot] = true;
                report.loaded += 1;
            }
            Step::Joined(Some(Ok((slot, Err(err))))) => {
                tracing::warn!(locator = %err.locator(), error = ?err, "Deferred load failed");
                let message = err.to_string();
                mounted.patch(&pending[slot], BlockContent::Failed(&message));
                settled[slot] = true;
                report.failed += 1;
            }
            Step::Joined(Some(Err(err))) => {
                // The slot of a task that panicked is unknown until the set drains.
                tracing::warn!(error = %err, "Deferred load task ended abnormally");
            }
            Step::Cancelled => {
                report.cancelled = tasks.len();
                tasks.abort_all();
                tracing::debug!(
                    remaining = report.cancelled,
                    "Page view cancelled; aborted deferred loads"
                );
                return report;
            }
        }
    }

    for (block, _) in pending.iter().zip(&settled).filter(|(_, done)| !**done) {
        let err = FetchError::Transport {
            locator: block.locator.clone(),
            message: "load task ended abnormally".to_string(),
        };
        mounted.patch(block, BlockContent::Failed(&err.to_string()));
        report.failed += 1;
    }

    report
}
