//! JSON configuration loading
//!
//! Loads the policy and alias documents from disk. Loading failures are
//! fatal configuration errors reported with the failing path; no partial
//! resolution is attempted on a malformed document.

use crate::error::{Result, RoutingError};
use crate::policy::schema::{AliasDocument, Policy};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the routing policy document from a JSON file.
pub fn load_policy<P: AsRef<Path>>(path: P) -> Result<Policy> {
    let policy: Policy = read_json(path.as_ref())?;
    debug!(
        path = %path.as_ref().display(),
        rules = policy.route_rules.len(),
        constraints = policy.constraints.len(),
        slots = policy.slots.len(),
        "loaded routing policy"
    );
    Ok(policy)
}

/// Load the alias mapping from a JSON file.
pub fn load_aliases<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, String>> {
    let doc: AliasDocument = read_json(path.as_ref())?;
    debug!(
        path = %path.as_ref().display(),
        aliases = doc.aliases.len(),
        "loaded alias map"
    );
    Ok(doc.aliases)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| RoutingError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| RoutingError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_policy() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"slots": {{"general": {{"candidates": ["acme/large"]}}}}}}"#
        )
        .unwrap();

        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy.slots["general"].candidates, vec!["acme/large"]);
    }

    #[test]
    fn test_load_aliases() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"aliases": {{"short": "acme/large"}}}}"#).unwrap();

        let aliases = load_aliases(file.path()).unwrap();
        assert_eq!(aliases["short"], "acme/large");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_policy("/nonexistent/routing-policy.json").unwrap_err();
        assert!(matches!(err, RoutingError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load_policy(file.path()).unwrap_err();
        assert!(matches!(err, RoutingError::Json { .. }));
    }
}
