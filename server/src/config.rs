//! Relay configuration and the command-line surface of the `simrelay` binary.

use clap::Parser;
use simrelay_shared::{DEFAULT_PORT, LOG_CAPACITY};
use std::path::PathBuf;
use std::time::Duration;

/// Files served to browsers by the default asset store.
#[derive(Debug, Clone, Default)]
pub struct AssetConfig {
    /// Page served at `/` and `/index.html`
    pub simulator_page: Option<PathBuf>,
    /// Page served at `/master`
    pub master_page: Option<PathBuf>,
    /// Page served at `/normal`
    pub normal_page: Option<PathBuf>,
    /// Directory other paths resolve under. Falls back to the master page's directory.
    pub root_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    /// Port bound exclusively for the relay's lifetime. 0 picks an ephemeral port.
    pub port: u16,
    pub auto_open_browser: bool,
    /// Maximum broadcast records retained for pollers
    pub log_capacity: usize,
    /// Upper bound on handling a single request
    pub request_timeout: Duration,
    pub assets: AssetConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            auto_open_browser: false,
            log_capacity: LOG_CAPACITY,
            request_timeout: Duration::from_secs(10),
            assets: AssetConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL a local browser opens to reach the simulator page.
    pub fn browser_url(&self, port: u16) -> String {
        format!("http://localhost:{}/", port)
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address to bind the relay to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host ticks per second
    #[arg(short, long, default_value = "30")]
    pub tick_rate: u32,

    /// Open the simulator page in a browser after startup
    #[arg(long)]
    pub open: bool,

    /// Simulator page served at `/`
    #[arg(long)]
    pub simulator: Option<PathBuf>,

    /// Page served at `/master`
    #[arg(long)]
    pub master: Option<PathBuf>,

    /// Page served at `/normal`
    #[arg(long)]
    pub normal: Option<PathBuf>,

    /// Directory for all other static files
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,
}

impl From<&Args> for RelayConfig {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            auto_open_browser: args.open,
            log_capacity: LOG_CAPACITY,
            request_timeout: Duration::from_secs(args.timeout_secs.max(1)),
            assets: AssetConfig {
                simulator_page: args.simulator.clone(),
                master_page: args.master.clone(),
                normal_page: args.normal.clone(),
                root_dir: args.root.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_capacity, 500);
        assert!(!config.auto_open_browser);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_browser_url() {
        let config = RelayConfig::default();
        assert_eq!(config.browser_url(9000), "http://localhost:9000/");
    }

    #[test]
    fn test_args_into_config() {
        let args = Args::parse_from([
            "simrelay",
            "--port",
            "9001",
            "--open",
            "--root",
            "/srv/sim",
            "--timeout-secs",
            "0",
        ]);
        assert_eq!(args.tick_rate, 30);

        let config = RelayConfig::from(&args);
        assert_eq!(config.port, 9001);
        assert!(config.auto_open_browser);
        assert_eq!(config.assets.root_dir, Some(PathBuf::from("/srv/sim")));
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }
}
