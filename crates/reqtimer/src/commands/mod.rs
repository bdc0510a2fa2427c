pub mod bench;
pub mod poll;

use libreqtimer::{load_config, ReqtimerConfig, Result};
use tracing::debug;

use crate::cli::Cli;

/// Config from `--config`, or an empty config when none is given
fn file_config(cli: &Cli) -> Result<ReqtimerConfig> {
    match cli.config {
        Some(ref path) => {
            debug!("Loading config from {}", path.display());
            load_config(path)
        }
        None => Ok(ReqtimerConfig::default()),
    }
}
