//! Digest message drafting

use crate::types::SnapshotEntry;
use std::time::Duration;

/// Header of the tracked-asset block
pub const TRACKED_HEADER: &str = "TRACKED ALERTS";

/// Header of the top-performer block
pub const TOP_PERFORMERS_HEADER: &str = "TOP PERFORMERS";

/// Formats digests into message units for a [`Notifier`](crate::notifier::Notifier)
#[derive(Debug, Clone)]
pub struct MessageDrafter {
    window_label: String,
}

impl MessageDrafter {
    /// Creates a drafter whose change column is labelled after `window`
    pub fn new(window: Duration) -> Self {
        Self {
            window_label: window_label(window),
        }
    }

    /// Drafts exactly two messages: tracked alerts, then top performers
    ///
    /// Each block is its own message so that neither gets truncated by the
    /// channel's length limit. Blocks are emitted even when empty.
    pub fn draft(
        &self,
        tracked_alerts: &[&SnapshotEntry],
        top_performers: &[&SnapshotEntry],
    ) -> Vec<String> {
        let mut tracked = format!("{TRACKED_HEADER}\n");
        for entry in tracked_alerts {
            tracked.push_str(&format!(
                "Name:{}\nSymbol:{}\nPrice:{}\nPercent Change:{}\n\n",
                entry.name,
                entry.symbol,
                entry.current_price,
                format_change(entry.percent_change)
            ));
        }

        let mut top = format!("{TOP_PERFORMERS_HEADER}\n");
        for entry in top_performers {
            top.push_str(&format!(
                "Name:{}\nSymbol:{}\n{} Change:{}\n\n",
                entry.name,
                entry.symbol,
                self.window_label,
                format_change(entry.percent_change)
            ));
        }

        vec![tracked, top]
    }
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(change) => format!("{change:.3}"),
        None => "n/a".to_string(),
    }
}

/// Short label such as `1hr`, `15min` or `90s`
fn window_label(window: Duration) -> String {
    let secs = window.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{}hr", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}min", secs / 60)
    } else {
        format!("{secs}s")
    }
}
