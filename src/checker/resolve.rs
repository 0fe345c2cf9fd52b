// Module resolution for TypeScript import specifiers
//
// Resolves a specifier to one of:
// - Local file inside the program (follow and load)
// - External package (not followed)

use crate::config::CompilerOptions;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Where the program reads its sources from
pub trait SourceHost {
    fn file_exists(&self, path: &Path) -> bool;
    fn read_file(&self, path: &Path) -> Result<String>;
}

/// Reads sources from disk
#[derive(Debug, Default)]
pub struct FsHost;

impl SourceHost for FsHost {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// In-memory sources keyed by normalized path
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: HashMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), source.into());
    }
}

impl SourceHost for MemoryHost {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| Error::PathNotFound(path.to_path_buf()))
    }
}

/// Classification of a specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Resolved to a file of the program
    Local(PathBuf),
    /// Package or unresolvable path, never loaded
    External,
}

/// Resolves import/export specifiers to source files
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    base_url: Option<PathBuf>,
    extensions: Vec<String>,
}

impl ModuleResolver {
    pub fn new(options: &CompilerOptions) -> Self {
        Self {
            base_url: options.base_url.as_deref().map(normalize),
            extensions: options.extensions.clone(),
        }
    }

    /// Check if a specifier is written relative to the importing file
    pub fn is_relative(specifier: &str) -> bool {
        specifier == "."
            || specifier == ".."
            || specifier.starts_with("./")
            || specifier.starts_with("../")
    }

    /// Resolve `specifier` as written in `importing_file`
    pub fn resolve(&self, specifier: &str, importing_file: &Path, host: &dyn SourceHost) -> ModuleKind {
        let base = if Self::is_relative(specifier) {
            importing_file
                .parent()
                .unwrap_or(Path::new(""))
                .join(specifier)
        } else if specifier.starts_with('/') {
            PathBuf::from(specifier)
        } else if let Some(base_url) = &self.base_url {
            base_url.join(specifier)
        } else {
            return ModuleKind::External;
        };

        match self.probe(&normalize(&base), host) {
            Some(path) => ModuleKind::Local(path),
            None => ModuleKind::External,
        }
    }

    /// Try the path as written, then with each extension, then as a directory index
    fn probe(&self, base: &Path, host: &dyn SourceHost) -> Option<PathBuf> {
        let base_str = base.to_string_lossy();

        if self.has_source_extension(&base_str) && host.file_exists(base) {
            return Some(base.to_path_buf());
        }

        // `./util.js` in TypeScript sources refers to `./util.ts`
        let stem = ["js", "jsx", "mjs", "cjs"]
            .iter()
            .find_map(|ext| base_str.strip_suffix(&format!(".{}", ext)))
            .map(PathBuf::from);

        let as_written = base.to_path_buf();
        for candidate_base in stem.iter().chain(std::iter::once(&as_written)) {
            let candidate_str = candidate_base.to_string_lossy();
            for ext in &self.extensions {
                let candidate = PathBuf::from(format!("{}.{}", candidate_str, ext));
                if host.file_exists(&candidate) {
                    return Some(candidate);
                }
            }
        }

        for ext in &self.extensions {
            let candidate = base.join(format!("index.{}", ext));
            if host.file_exists(&candidate) {
                return Some(candidate);
            }
        }

        None
    }

    fn has_source_extension(&self, path: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext)))
    }
}

/// Lexically normalize a path, folding `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(paths: &[&str]) -> MemoryHost {
        let mut host = MemoryHost::new();
        for p in paths {
            host.add(p, "");
        }
        host
    }

    fn resolver() -> ModuleResolver {
        ModuleResolver::new(&CompilerOptions::default())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("src/./a/../b.ts")), PathBuf::from("src/b.ts"));
        assert_eq!(normalize(Path::new("../x.ts")), PathBuf::from("../x.ts"));
    }

    #[test]
    fn test_relative_with_extension_probe() {
        let host = host(&["src/mod.ts", "src/util.ts"]);
        let kind = resolver().resolve("./util", Path::new("src/mod.ts"), &host);
        assert_eq!(kind, ModuleKind::Local(PathBuf::from("src/util.ts")));
    }

    #[test]
    fn test_parent_directory_and_index() {
        let host = host(&["src/lib/mod.ts", "src/types/index.ts"]);
        let kind = resolver().resolve("../types", Path::new("src/lib/mod.ts"), &host);
        assert_eq!(kind, ModuleKind::Local(PathBuf::from("src/types/index.ts")));
    }

    #[test]
    fn test_js_specifier_maps_to_ts() {
        let host = host(&["src/mod.ts", "src/util.ts"]);
        let kind = resolver().resolve("./util.js", Path::new("src/mod.ts"), &host);
        assert_eq!(kind, ModuleKind::Local(PathBuf::from("src/util.ts")));
    }

    #[test]
    fn test_declaration_file() {
        let host = host(&["src/mod.ts", "src/globals.d.ts"]);
        let kind = resolver().resolve("./globals", Path::new("src/mod.ts"), &host);
        assert_eq!(kind, ModuleKind::Local(PathBuf::from("src/globals.d.ts")));
    }

    #[test]
    fn test_explicit_extension() {
        let host = host(&["src/mod.ts", "src/util.ts"]);
        let kind = resolver().resolve("./util.ts", Path::new("src/mod.ts"), &host);
        assert_eq!(kind, ModuleKind::Local(PathBuf::from("src/util.ts")));
    }

    #[test]
    fn test_package_is_external() {
        let host = host(&["src/mod.ts"]);
        assert_eq!(
            resolver().resolve("lodash", Path::new("src/mod.ts"), &host),
            ModuleKind::External
        );
    }

    #[test]
    fn test_base_url() {
        let host = host(&["js/mod.ts", "js/os.ts"]);
        let options = CompilerOptions {
            base_url: Some(PathBuf::from("js")),
            ..CompilerOptions::default()
        };
        let kind = ModuleResolver::new(&options).resolve("os", Path::new("js/mod.ts"), &host);
        assert_eq!(kind, ModuleKind::Local(PathBuf::from("js/os.ts")));
    }

    #[test]
    fn test_missing_relative_is_external() {
        let host = host(&["src/mod.ts"]);
        assert_eq!(
            resolver().resolve("./gone", Path::new("src/mod.ts"), &host),
            ModuleKind::External
        );
    }

    #[test]
    fn test_memory_host_read() {
        let mut host = MemoryHost::new();
        host.add("./a/b.ts", "export {}");
        assert!(host.file_exists(Path::new("a/b.ts")));
        assert_eq!(host.read_file(Path::new("a/./b.ts")).unwrap(), "export {}");
        assert!(host.read_file(Path::new("c.ts")).is_err());
    }
}
