//! Terminal presentation of a running batch
//!
//! Consumes [`BatchEvent`]s from the event bus on its own task and owns the
//! progress bar. Per-item lines go to stderr above the bar so stdout stays
//! free for data.

use crate::models::ProgressState;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ipgeo_common::events::BatchEvent;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} addresses ({msg}, {eta})";

/// Console output options
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOptions {
    /// Draw the progress bar
    pub progress_bar: bool,
    /// Print one line per resolved address
    pub print_items: bool,
}

/// What the console saw of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleSummary {
    /// Last progress event received
    pub last_progress: Option<ProgressState>,
    /// Events dropped because the console fell behind the bus
    pub lagged: u64,
}

/// `address: field=value, field=value`
pub fn format_item(address: &str, values: &[(String, String)]) -> String {
    let pairs: Vec<String> = values
        .iter()
        .map(|(field, value)| format!("{}={}", field, value))
        .collect();
    format!("{}: {}", address, pairs.join(", "))
}

struct Bar {
    bar: ProgressBar,
    enabled: bool,
    drawing: bool,
}

impl Bar {
    fn new(enabled: bool) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            enabled,
            drawing: false,
        }
    }

    /// Size the bar and start drawing; any event carrying the total may do this
    fn start(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        if self.enabled && !self.drawing {
            self.bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
            self.drawing = true;
        }
    }

    fn println(&self, line: String) {
        if self.drawing {
            self.bar.println(line);
        } else {
            eprintln!("{}", line);
        }
    }
}

/// Render events until the batch completes or every sender is dropped
pub async fn run_console(
    mut rx: broadcast::Receiver<BatchEvent>,
    options: ConsoleOptions,
) -> ConsoleSummary {
    let mut bar = Bar::new(options.progress_bar);
    let mut summary = ConsoleSummary::default();

    loop {
        match rx.recv().await {
            Ok(BatchEvent::BatchStarted { total, .. }) => bar.start(total),
            Ok(BatchEvent::ItemResolved {
                address, values, ..
            }) => {
                if options.print_items {
                    bar.println(format_item(&address, &values));
                }
            }
            Ok(BatchEvent::BatchProgress {
                completed, total, ..
            }) => {
                let progress = ProgressState::new(completed, total);
                // BatchStarted may have been lost to lag
                bar.start(total);
                bar.bar.set_position(completed as u64);
                bar.bar.set_message(format!("{}%", progress.percentage()));
                summary.last_progress = Some(progress);
            }
            Ok(BatchEvent::BatchCompleted { .. }) => {
                bar.bar.finish_and_clear();
                break;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Console: lagged {} events", skipped);
                summary.lagged += skipped;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Console: event bus closed");
                bar.bar.finish_and_clear();
                break;
            }
        }
    }

    summary
}
