//! Region discovery
//!
//! Scans Terraform configuration text for a `region = "..."` declaration.

use crate::document::UNKNOWN;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static REGION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn region_pattern() -> &'static Regex {
    REGION_PATTERN.get_or_init(|| {
        Regex::new(r#"region\s*=\s*"([^"]+)""#).unwrap_or_else(|e| panic!("Invalid region pattern: {}", e))
    })
}

/// First region declared in `content`, if any
pub fn region_from_config(content: &str) -> Option<String> {
    region_pattern()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Region declared in a configuration file, or `"unknown"` when the file is
/// unreadable or declares none
pub fn region_from_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => region_from_config(&content).unwrap_or_else(|| {
            tracing::debug!("No region declaration in {:?}", path);
            UNKNOWN.to_string()
        }),
        Err(e) => {
            tracing::warn!("Failed to read {:?}: {}, region is unknown", path, e);
            UNKNOWN.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_block_region() {
        let tf = r#"
provider "aws" {
  region  = "eu-west-2"
  profile = "default"
}
"#;
        assert_eq!(region_from_config(tf).as_deref(), Some("eu-west-2"));
    }

    #[test]
    fn test_first_declaration_wins() {
        let tf = "region=\"us-east-1\"\nregion = \"us-west-2\"";
        assert_eq!(region_from_config(tf).as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_no_declaration() {
        assert_eq!(region_from_config("variable \"region\" {}"), None);
        assert_eq!(region_from_config(""), None);
    }

    #[test]
    fn test_missing_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(region_from_file(&dir.path().join("main.tf")), UNKNOWN);
    }

    #[test]
    fn test_file_with_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.tf");
        std::fs::write(&path, "provider \"aws\" { region = \"ca-central-1\" }").unwrap();
        assert_eq!(region_from_file(&path), "ca-central-1");
    }
}
