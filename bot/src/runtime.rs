use std::sync::Arc;

use engine::Engine;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::bot::XiangqiBot;
use crate::event::InboundEvent;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` filter. A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Feed transport events to `bot` until the sender side closes. Each event
/// runs in its own task, so a slow engine or a panicking handler only
/// affects the event that triggered it.
pub async fn serve<E: Engine>(
    bot: Arc<XiangqiBot<E>>,
    mut events: mpsc::Receiver<InboundEvent>,
) {
    tracing::info!(prefix = %bot.context().config().command_prefix, "Xiangqi bot listening");

    while let Some(event) = events.recv().await {
        let bot = Arc::clone(&bot);
        tokio::spawn(async move {
            bot.handle_event(&event).await;
        });
    }

    tracing::info!("Event stream closed");
}
