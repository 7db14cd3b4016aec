//! Standard locations of the configuration file

use std::path::PathBuf;

/// File name of the configuration
pub const CONFIG_FILE_NAME: &str = "clarion.yaml";

/// Directory holding Clarion's configuration
///
/// Returns: `<config_dir>/clarion` (e.g. `~/.config/clarion` on Linux),
/// falling back to the home directory and then the working directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clarion")
}

/// Default configuration file path
///
/// Returns: `<config_dir>/clarion/clarion.yaml`
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_layout() {
        let path = default_config_path();
        assert!(path.ends_with("clarion/clarion.yaml"));
        assert_eq!(path.parent(), Some(default_config_dir().as_path()));
    }
}
