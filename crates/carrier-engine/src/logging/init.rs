use std::io::Write;
use std::sync::Once;

use super::format::single_line;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "carrier_engine=debug,wgpu=warn").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
///
/// Lines are rendered as `[CARRIER]: '<message>' [<timestamp>]`, colored by
/// level: red for errors, yellow for warnings, cyan for everything else.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        builder.format(|buf, record| {
            let style = level_style(record.level());
            let message = record.args().to_string();
            writeln!(
                buf,
                "{style}[CARRIER]: '{}' [{}]{style:#}",
                single_line(&message),
                buf.timestamp_seconds(),
            )
        });

        // `try_init` so a host that already installed a logger keeps it.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

fn level_style(level: log::Level) -> env_logger::fmt::style::Style {
    use env_logger::fmt::style::{AnsiColor, Style};

    let color = match level {
        log::Level::Error => AnsiColor::Red,
        log::Level::Warn => AnsiColor::Yellow,
        _ => AnsiColor::Cyan,
    };
    Style::new().fg_color(Some(color.into()))
}
