//! Tracing setup that routes log events into the TUI.
//!
//! The terminal is owned by ratatui, so events are formatted into single
//! lines and sent over a channel to the log viewer instead of stderr.

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};

/// Install the global subscriber and return the receiving end of the log channel.
pub(crate) fn init() -> Receiver<String> {
    let (tx, rx) = unbounded();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jukebox_remote=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(ChannelLayer::new(tx))
        .init();
    rx
}

pub(crate) struct ChannelLayer {
    tx: Sender<String>,
}

impl ChannelLayer {
    pub(crate) fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for ChannelLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let meta = event.metadata();
        let line = format_line(
            &meta.level().to_string(),
            meta.target(),
            visitor.message.as_deref(),
            &visitor.fields,
        );
        let _ = self.tx.send(line);
    }
}

fn format_line(level: &str, target: &str, message: Option<&str>, fields: &[String]) -> String {
    let mut line = format!("{level:<5} {target}: {}", message.unwrap_or("log event"));
    if !fields.is_empty() {
        line.push(' ');
        line.push_str(&fields.join(" "));
    }
    line
}

#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let formatted = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(formatted.trim_matches('"').to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), formatted));
        }
    }
}
