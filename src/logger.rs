use log::{LevelFilter, Record};
use env_logger::Builder;
use std::io::Write;
use chrono::Local;

/// Installs the process-wide logger. `RUST_LOG` overrides the default `info` level;
/// `RUST_LOG=info,lettre=debug` adds the SMTP commands and replies, which lettre
/// emits as tracing events under its own targets.
pub fn init() {
    Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}]{} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                origin(record),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    log::debug!("Logger initialized.");
}

/// Records from dependencies (lettre, reqwest) carry their crate name; ours don't.
fn origin(record: &Record) -> String {
    let krate = record.target().split("::").next().unwrap_or_default();
    // Library is `arxiv_daily_lib`, binary is `arxiv_daily`.
    if krate.is_empty() || krate.starts_with("arxiv_daily") {
        String::new()
    } else {
        format!(" {}", krate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_of(target: &str) -> String {
        origin(&Record::builder().target(target).build())
    }

    #[test]
    fn test_dependency_records_are_tagged() {
        assert_eq!(origin_of("lettre::transport::smtp::client::connection"), " lettre");
        assert_eq!(origin_of("arxiv_daily_lib::notifier"), "");
        assert_eq!(origin_of("arxiv_daily"), "");
        assert_eq!(origin_of(""), "");
    }
}
