//! Logging setup.
//!
//! Everything is written to stderr. In plugin mode the host reads stderr and
//! expects each line framed as `\x01<level>\x02<message>`, where level is one
//! of `t`, `d`, `i`, `w`, `e` or `p` for progress.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::report::PROGRESS_TARGET;

/// Default filter directives when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "scenepath=trace,scenepath_rules=trace,scenepath_common=debug"
    } else {
        "scenepath=debug,scenepath_rules=info,reqwest=info"
    }
}

/// Install the global subscriber.
pub fn init(verbose: bool, plugin: bool) {
    // Respect RUST_LOG if set
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(verbose).to_string());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr);

    if plugin {
        builder.event_format(HostLogFormat).init();
    } else {
        builder.init();
    }
}

fn level_code(level: &Level) -> char {
    match *level {
        Level::TRACE => 't',
        Level::DEBUG => 'd',
        Level::INFO => 'i',
        Level::WARN => 'w',
        Level::ERROR => 'e',
    }
}

#[derive(Default)]
struct ProgressVisitor {
    progress: Option<f64>,
}

impl Visit for ProgressVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "progress" {
            self.progress = Some(value);
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

/// Event format understood by the catalog host when running as a plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostLogFormat;

impl<S, N> FormatEvent<S, N> for HostLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        if metadata.target() == PROGRESS_TARGET {
            let mut visitor = ProgressVisitor::default();
            event.record(&mut visitor);
            if let Some(progress) = visitor.progress {
                return writeln!(writer, "\x01p\x02{}", progress);
            }
        }

        // Multi-line messages keep the level on every line
        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;

        let code = level_code(metadata.level());
        for line in message.lines() {
            writeln!(writer, "\x01{}\x02{}", code, line)?;
        }
        Ok(())
    }
}
