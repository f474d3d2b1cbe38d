pub mod check;
pub mod endpoints;
pub mod validate;

pub use check::CheckCommand;
pub use endpoints::EndpointsCommand;
pub use validate::ValidateCommand;

use crate::cli::error::CliError;
use crate::configuration::{get_configuration, Settings};
use std::path::Path;

pub trait CallableTrait {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// Load settings from `path` (or the default file) plus the environment.
pub fn load_settings(path: Option<&str>) -> Result<Settings, CliError> {
    let path = path.map(Path::new);
    if let Some(path) = path {
        if !path.exists() {
            return Err(CliError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(get_configuration(path)?)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))
}
