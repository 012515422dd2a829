//! Utility functions for loading the proxy list.

use crate::error::ConfigurationError;

use std::path::Path;

/// Read a newline-delimited proxy list from a file.
pub(crate) fn read_proxies(path: &Path) -> Result<Vec<String>, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::ProxiesFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_proxy_list(&content))
}

/// Parse the text content into proxy endpoints, one per line.
pub(crate) fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}
