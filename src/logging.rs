//! Tracing subscriber setup. Logs go to stderr so stdout stays clean for
//! command output.

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Default filter for a `-v` count when `RUST_LOG` is unset.
pub const fn default_directive(verbosity: u8) -> &'static str {
    return match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbosity`.
pub fn init(verbosity: u8) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default_directive(verbosity)));

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if Registry::default().with(env_filter).with(fmt_layer).try_init().is_err() {
        eprintln!("warning: a tracing subscriber was already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_directive() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(2), "trace");
        assert_eq!(default_directive(7), "trace");
    }
}
