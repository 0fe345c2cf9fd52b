// JSON writer
//
// Serializes the entry list as one array, to a file or to stdout.

use crate::docs::DocEntry;
use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writer for the generated entry list
#[derive(Debug, Clone, Copy)]
pub struct JsonWriter {
    pretty: bool,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonWriter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Render entries as a JSON array
    pub fn render(&self, entries: &[DocEntry]) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(entries)?
        } else {
            serde_json::to_string(entries)?
        };
        Ok(json)
    }

    /// Write entries to `path`, creating parent directories, or to stdout
    pub fn write(&self, entries: &[DocEntry], path: Option<&Path>) -> Result<()> {
        let mut json = self.render(entries)?;
        json.push('\n');

        match path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json)?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(json.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::EntryKind;
    use tempfile::TempDir;

    fn sample() -> Vec<DocEntry> {
        vec![
            DocEntry::new(EntryKind::Class, "Foo"),
            DocEntry {
                typestr: Some("number".to_string()),
                ..DocEntry::new(EntryKind::Property, "Foo.x")
            },
        ]
    }

    #[test]
    fn test_render_compact() {
        let json = JsonWriter::new(false).render(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"class","name":"Foo"},{"kind":"property","name":"Foo.x","typestr":"number"}]"#
        );
    }

    #[test]
    fn test_render_pretty() {
        let json = JsonWriter::default().render(&sample()).unwrap();
        assert!(json.starts_with("[\n  {"));
        let parsed: Vec<DocEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(JsonWriter::new(false).render(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("docs.json");
        JsonWriter::new(false).write(&sample(), Some(&path)).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("]\n"));
        let parsed: Vec<DocEntry> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
