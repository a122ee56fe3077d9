//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise levels follow the deployment
//! environment, with the outbound HTTP stack held at `warn` so one itinerary's
//! burst of geocoding requests does not drown the request spans.

use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(env: &Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    // Log shippers expect one JSON object per line in production
    if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    tracing::info!(env = ?env, "Logging initialized");
}

fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "sahyadri_backend=debug,tower_http=debug,reqwest=warn,hyper=warn,info",
        Environment::Staging => "sahyadri_backend=debug,tower_http=info,reqwest=warn,hyper=warn,info",
        Environment::Prod => "sahyadri_backend=info,tower_http=info,warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse_for_every_environment() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            let directives = default_directives(&env);
            assert!(EnvFilter::try_new(directives).is_ok(), "{}", directives);
            assert!(directives.starts_with("sahyadri_backend="));
        }
    }

    #[test]
    fn outbound_clients_are_quiet_outside_prod() {
        assert!(default_directives(&Environment::Dev).contains("reqwest=warn"));
        assert!(default_directives(&Environment::Staging).contains("hyper=warn"));
    }
}
