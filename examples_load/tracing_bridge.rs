use tracing::{error, info, info_span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use slogfmt::layer::FormatLayer;
use slogfmt::{Attr, Handler, HandlerOptions, Level, TextHandler};

fn main() {
    let handler = TextHandler::stderr(HandlerOptions::default().with_source(true))
        .with_attrs(vec![Attr::string("service", "auth")]);
    let layer = FormatLayer::new(handler).with_level(Level::INFO);

    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        info!("starting service");

        let span = info_span!("request", user_id = 42);
        let _guard = span.enter();
        error!(
            reason = "invalid password",
            "authentication failed\nsee audit log for details"
        );
    });
}
