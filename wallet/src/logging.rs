//! Logging setup for the wallet binary.
//!
//! Diagnostics go to stderr. Stdout is reserved for what the command
//! produces (seeds, addresses, trytes) so it can be piped.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset and no `-v` is given.
const QUIET: &str = "trinary_wallet=info,trinary_protocol=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `RUST_LOG` if set, otherwise the wallet defaults raised by `-v` flags.
fn filter(verbosity: u8) -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return from_env;
    }
    EnvFilter::new(directives(verbosity))
}

fn directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => QUIET,
        1 => "trinary_wallet=debug,trinary_protocol=info",
        _ => "trinary_wallet=trace,trinary_protocol=debug",
    }
}

/// Install the global subscriber. Call once, first thing in `main`.
pub fn init(format: LogFormat, verbosity: u8) {
    let registry = tracing_subscriber::registry().with(filter(verbosity));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    match format {
        LogFormat::Pretty => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::from_str("JSON", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("pretty", true), Ok(LogFormat::Pretty));
        assert!(LogFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn verbosity_raises_protocol_level() {
        assert!(directives(0).contains("trinary_protocol=warn"));
        assert!(directives(1).contains("trinary_protocol=info"));
        assert_eq!(directives(5), directives(2));
    }
}
