//! `guvi-e2e` - runs the GUVI end-to-end scenarios against Chrome.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use guvi_e2e::browser::CdpLauncher;
use guvi_e2e::suite::Runner;
use guvi_e2e::{Config, Result, logging, scenarios};

// ============================================================================
// CLI
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "guvi-e2e", version, about = "End-to-end UI checks for the GUVI web app")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "GUVI_CONFIG")]
    config: Option<PathBuf>,

    /// DevTools endpoint of a running Chrome (e.g. http://127.0.0.1:9222).
    #[arg(long)]
    chrome_url: Option<String>,

    /// Chrome/Chromium binary to launch.
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Show the browser window.
    #[arg(long)]
    headed: bool,

    /// Run only scenarios whose name contains this text.
    #[arg(short, long)]
    filter: Option<String>,

    /// Print the selected scenarios and exit.
    #[arg(long)]
    list: bool,

    /// Log level or filter directive, overriding the config file.
    #[arg(long)]
    log_level: Option<String>,

    /// Log credentials in clear text instead of masked.
    #[arg(long)]
    no_mask: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(url) = &self.chrome_url {
            config.browser.connect_url = Some(url.clone());
        }
        if let Some(path) = &self.chrome_path {
            config.browser.executable = Some(path.clone());
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if self.no_mask {
            config.credential_masking = false;
        }
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let groups = scenarios::groups();

    if cli.list {
        for group in &groups {
            for scenario in group.select(cli.filter.as_deref()) {
                println!("{}::{}", group.name(), scenario.name());
            }
        }
        return ExitCode::SUCCESS;
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log = logging::default_logger();
    match config.account_for_log() {
        Some(email) => info!(parent: log.span(), base_url = %config.base_url, account = %email, "Configuration loaded"),
        None => info!(parent: log.span(), base_url = %config.base_url, "Configuration loaded without a valid account"),
    }

    let launcher = Arc::new(CdpLauncher::new(config.browser.clone()));
    let mut runner = Runner::new(config, launcher);
    if let Some(filter) = cli.filter {
        runner = runner.with_filter(filter);
    }

    let report = runner.run(&groups).await;
    println!("{report}");
    if !report.is_success() {
        error!(parent: log.span(), "Run failed");
    }
    report.exit_code()
}
