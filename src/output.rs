//! Document writer

use crate::config::OutputFormat;
use crate::error::ArchResult;
use serde::Serialize;
use std::path::Path;

/// Render a document: JSON with four-space indentation, or YAML
pub fn render<T: Serialize>(document: &T, format: OutputFormat) -> ArchResult<String> {
    match format {
        OutputFormat::Json => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            document.serialize(&mut ser)?;
            buf.push(b'\n');
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(document)?),
    }
}

/// Write a document, creating parent directories as needed
pub fn write_document<T: Serialize>(
    path: &Path,
    document: &T,
    format: OutputFormat,
) -> ArchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, render(document, format)?)?;
    tracing::info!("Wrote {:?}", path);
    Ok(())
}

/// Read a fragment document written in either output format; absent or
/// unparseable files count as a missing fragment
pub fn read_fragment(path: &Path) -> Option<serde_json::Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Fragment {:?} unavailable: {}", path, e);
            return None;
        }
    };

    match parse_fragment(path, &content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Fragment {:?} could not be parsed: {}", path, e);
            None
        }
    }
}

fn parse_fragment(path: &Path, content: &str) -> ArchResult<serde_json::Value> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        return Ok(serde_yaml::from_str(content)?);
    }

    // YAML accepts JSON, so it also covers fragments with other extensions
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(content).map_err(|_| json_err.into()),
    }
}
