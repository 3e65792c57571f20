use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs go to stderr so JSON output on stdout stays clean.
pub fn init_logging(env: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match env {
        Environment::Dev => "quote_cli=debug,quote_core=debug,warn".into(),
        Environment::Staging => "quote_cli=info,quote_core=info,warn".into(),
        Environment::Prod => "quote_cli=info,quote_core=warn,warn".into(),
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    tracing::debug!("Logging initialized for {:?} environment", env);
}
