use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

/// Installs the global logger: `[secs.millis LEVEL target] message` on stderr.
///
/// `RUST_LOG`, when set to a plain level, overrides `level`.  wgpu's own
/// crates are capped at `warn` so validation chatter does not drown the
/// renderer's output.
pub fn init(level: log::LevelFilter) -> anyhow::Result<()> {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<log::LevelFilter>().ok())
        .unwrap_or(level);

    fern::Dispatch::new()
        .format(|out, message, record| {
            let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
            out.finish(format_args!(
                "[{}.{:03} {:<5} {}] {}",
                now.as_secs(),
                now.subsec_millis(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("wgpu_core", log::LevelFilter::Warn)
        .level_for("wgpu_hal", log::LevelFilter::Warn)
        .level_for("naga", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
        .context("a global logger is already installed")
}
