//! Diagnostic tracing to stderr.
//!
//! The progress lines of an export run go through [`crate::io::output`] to
//! stdout and are never filtered. Everything installed here is diagnostics:
//! `RUST_LOG` sets the base filter (default `warn`), and each `-v` on the
//! command line raises this crate's level on top of it.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Crate directive for a `-v` count. Zero leaves `RUST_LOG` in charge.
fn verbosity_directive(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("tdesc_export=info"),
        2 => Some("tdesc_export=debug"),
        _ => Some("tdesc_export=trace"),
    }
}

fn env_filter(verbose: u8) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if let Some(directive) = verbosity_directive(verbose) {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Install the stderr subscriber.
///
/// ```bash
/// RUST_LOG=warn export-tdesc -vv --catalog host.toml mods.buffs
/// ```
pub fn init(verbose: u8) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_run_adds_no_directive() {
        assert_eq!(verbosity_directive(0), None);
    }

    #[test]
    fn repeated_flag_saturates_at_trace() {
        assert_eq!(verbosity_directive(2), Some("tdesc_export=debug"));
        assert_eq!(verbosity_directive(7), Some("tdesc_export=trace"));
    }

    #[test]
    fn verbose_filter_raises_crate_level() {
        let filter = env_filter(1).expect("filter");
        assert!(filter.to_string().contains("tdesc_export=info"));
    }
}
