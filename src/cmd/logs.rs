//! The `logs` and `addon-logs` commands.

use anyhow::{Context, Result};
use apptail::api::HttpApi;
use apptail::config::Config;
use apptail::render::Renderer;
use apptail::{tail_logs, LogTarget, TailOptions};

use crate::cli::FollowArgs;

/// Fetch, and optionally follow, the logs of `target`.
pub fn run(
    config: &Config,
    target: LogTarget,
    follow: &FollowArgs,
    filter: String,
    colorize: bool,
) -> Result<()> {
    let api_url = config.api_url.as_deref().context(
        "no API URL configured (set `api_url` in apptail.yaml or APPTAIL_API_URL)",
    )?;
    let api = HttpApi::new(api_url, config.api_token.clone())
        .with_context(|| format!("invalid API URL '{}'", api_url))?;

    let options = TailOptions {
        stream: follow.follow,
        max_lines: follow.lines.unwrap_or(config.lines),
        filter,
        transport: config.transport,
        reconnect: config.reconnect,
    };
    tracing::debug!(%target, ?options, "fetching logs");

    let mut renderer = Renderer::stdio(colorize);
    tail_logs(&api, &target, &options, &mut renderer)?;
    Ok(())
}
