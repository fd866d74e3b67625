use anyhow::Context;
use sgate::domain::config::LogConfig;
use sgate::kernel::config::load_api_config;
use sgate_logger::{Logger, parse_level};
use sgate_runtime::RuntimeConfig;
use sgate_server::Server;
use std::path::PathBuf;

fn init_logger(cfg: &LogConfig) -> anyhow::Result<Logger> {
    let mut builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&cfg.level)?)
        .json(cfg.json);
    if let Some(filter) = &cfg.filter {
        builder = builder.env_filter(filter);
    }

    let logger = match &cfg.dir {
        Some(dir) => builder.path(dir).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

fn main() -> anyhow::Result<()> {
    let cfg = load_api_config(None::<PathBuf>).context("Critical: Configuration is malformed")?;
    let _log = init_logger(&cfg.log)?;
    let runtime = RuntimeConfig::from(&cfg.runtime);

    sgate_runtime::block_on(&runtime, async move {
        Server::builder().config(cfg).build()?.run().await
    })?
}
