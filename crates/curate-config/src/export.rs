//! # Export Renderers
//!
//! Render an already-lowered JSON document (see the serialization bridge
//! in `curate-core`) as pretty JSON, YAML, or a minimal HTML page with
//! the JSON in an escaped `<pre>` block.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Output format for exported records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML, keys in document order.
    Yaml,
    /// HTML page wrapping the JSON rendering.
    Html,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Html => "html",
        }
    }

    /// Render `document` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if the underlying writer fails.
    pub fn render(self, document: &Value) -> Result<String, ConfigError> {
        match self {
            Self::Json => pretty_json(document),
            Self::Yaml => serde_yaml::to_string(document).map_err(|e| ConfigError::Render(e.to_string())),
            Self::Html => Ok(format!(
                "<html>\n<body>\n<h1>File Metadata</h1>\n<pre>{}</pre>\n</body>\n</html>\n",
                escape_html(&pretty_json(document)?)
            )),
        }
    }

    /// Render `document` and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] or [`ConfigError::Io`].
    pub fn write(self, document: &Value, path: &Path) -> Result<(), ConfigError> {
        let body = self.render(document)?;
        std::fs::write(path, body).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(format = %self, path = %path.display(), "wrote export");
        Ok(())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "html" => Ok(Self::Html),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

fn pretty_json(document: &Value) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(document).map_err(|e| ConfigError::Render(e.to_string()))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_pretty() {
        let out = ExportFormat::Json.render(&json!({"a": 1})).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_yaml_keeps_document_order() {
        let out = ExportFormat::Yaml.render(&json!({"b": 1, "a": "x"})).unwrap();
        assert_eq!(out, "b: 1\na: x\n");
    }

    #[test]
    fn test_html_escapes_content() {
        let out = ExportFormat::Html
            .render(&json!({"title": "<script>&"}))
            .unwrap();
        assert!(out.contains("<h1>File Metadata</h1>"));
        assert!(out.contains("&lt;script&gt;&amp;"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("YAML".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert_eq!("yml".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ConfigError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        ExportFormat::Html.write(&json!({"a": 1}), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<html>"));
    }
}
