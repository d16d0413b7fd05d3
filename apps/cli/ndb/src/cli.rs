use ndb_core::config::NdbConfig;

use std::path::PathBuf;

use clap::Parser;

const APP_DIR_NAME: &str = "ndb";

/// Attach to a Node inspector and browse the scripts it has loaded.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Inspector host (default: 127.0.0.1)
    #[clap(long, env = "NDB_HOST")]
    pub host: Option<String>,

    /// Inspector port (default: 9229)
    #[clap(long, env = "NDB_PORT")]
    pub port: Option<u16>,

    /// Directory holding config.json
    #[clap(long)]
    pub config_dir: Option<PathBuf>,

    /// Directory for ndb.log
    #[clap(long)]
    pub log_dir: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[clap(long, env = "NDB_LOG")]
    pub log_level: Option<String>,

    /// Also write log records to stderr.
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Overwrite loaded config values with the ones given on the command line.
    pub fn apply_to(&self, config: &mut NdbConfig) {
        if let Some(host) = &self.host {
            config.inspector.host = host.clone();
        }
        if let Some(port) = self.port {
            config.inspector.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.config_dir
            .clone()
            .unwrap_or_else(|| app_dir(dirs::config_dir()))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| app_dir(dirs::cache_dir()))
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(std::env::temp_dir).join(APP_DIR_NAME)
}
