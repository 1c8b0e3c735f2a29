mod platform;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use url::Url;

use platform::logging::LogDestination;
use platform::AppConfig;

/// Terminal client for the WikiFix review platform.
#[derive(Debug, Parser)]
#[command(name = "wikifix", version, about)]
struct Cli {
    /// Base URL of the WikiFix API.
    #[arg(long, env = "WIKIFIX_API_URL", default_value = "http://localhost:8001")]
    api_url: String,

    /// Directory holding the local session store.
    #[arg(long, env = "WIKIFIX_STORAGE_DIR", default_value = ".")]
    storage_dir: PathBuf,

    /// Analytics ingest endpoint. Events are dropped when unset.
    #[arg(long, env = "WIKIFIX_ANALYTICS_URL")]
    analytics_url: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogArg::File)]
    log: LogArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    platform::logging::initialize(cli.log.into());

    let api_url = Url::parse(&cli.api_url)
        .with_context(|| format!("invalid API url {:?}", cli.api_url))?;
    let analytics_url = cli
        .analytics_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .with_context(|| format!("invalid analytics url {:?}", cli.analytics_url))?;

    platform::run_app(AppConfig {
        api_url,
        storage_dir: cli.storage_dir,
        analytics_url,
    })
}
