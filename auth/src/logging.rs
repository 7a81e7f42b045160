use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::env;

/// Install the global subscriber. Reads the environment directly so that configuration
/// errors can be logged:
///   - `RUST_LOG` sets the filter (default `info`)
///   - `DEBUG=true` switches from JSON lines to coloured output with span events
pub fn init() {
    let debug = env::resolve("DEBUG", "false")
        .parse::<bool>()
        .unwrap_or(false);

    tracing_subscriber::registry().with(layer(debug)).init();
}

fn filter() -> EnvFilter {
    let directives = env::resolve("RUST_LOG", "info");
    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("ignoring invalid RUST_LOG {directives:?}: {e}");
        EnvFilter::new("info")
    })
}

fn layer<S>(debug: bool) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let base_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true);

    if debug {
        base_layer
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_ansi(true)
            .with_filter(filter())
            .boxed()
    } else {
        base_layer.json().with_filter(filter()).boxed()
    }
}
