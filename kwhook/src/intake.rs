//! Event intake: newline-delimited JSON events fed to a handler one at a time.
//!
//! Blank lines are ignored. A line that does not decode as an [`Event`] is logged with its
//! line number and skipped. Reading stops at end of input or when `shutdown` resolves; an
//! event already being handled finishes first.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::event::Event;
use crate::handlers::Handler;

/// Counters for one intake run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeStats {
    /// Events handed to the handler
    pub handled: u64,
    /// Lines that failed to decode
    pub malformed: u64,
}

pub async fn run<R, S>(reader: R, handler: &dyn Handler, shutdown: S) -> std::io::Result<IntakeStats>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut stats = IntakeStats::default();
    let mut line_no = 0u64;

    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, no longer reading events");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => {
                    tracing::debug!("End of event stream");
                    break;
                }
            },
        };
        line_no += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, line = line_no, "Skipping malformed event");
                stats.malformed += 1;
                continue;
            }
        };

        tracing::debug!(kind = %event.kind, name = %event.name, reason = %event.reason, "Handling event");
        handler.handle(&event).await;
        stats.handled += 1;
    }

    Ok(stats)
}
