//! Go source import extraction.
//!
//! Buildgen does not understand Go syntax beyond what dependency analysis
//! needs: the package clause and import declarations. The extractor is a
//! trait so tests (and future language frontends) can substitute the scan.
//!
//! The scanner must be conservative: a missed import means a missing edge in
//! the generated graph, so the regexes cover single imports, factored import
//! blocks, and aliased/underscore/dot forms.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::package::{ImportSets, Package, PackageShape};

/// Extracts the import sets and shape of a single package directory.
///
/// Must be deterministic for a fixed filesystem state.
pub trait ImportExtractor {
    /// Scan the `.go` files directly inside `dir` (non-recursive, matching
    /// Go package semantics) and return the package facts buildgen needs.
    fn scan_package(&self, dir: &Path, rel_path: &str) -> Result<Package>;
}

/// Whether a directory directly contains Go source files.
///
/// A bare data directory is not a package: it cannot be imported, so it must
/// not shadow a standard-library or remote import path.
pub fn has_go_sources(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().is_file() && e.file_name().to_string_lossy().ends_with(".go"))
        })
        .unwrap_or(false)
}

/// Regex-based Go source scanner.
pub struct GoImportExtractor {
    package_re: Regex,
    single_import_re: Regex,
    import_block_re: Regex,
    block_line_re: Regex,
}

impl Default for GoImportExtractor {
    fn default() -> Self {
        GoImportExtractor {
            package_re: Regex::new(r"(?m)^package\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap(),
            // `import "fmt"`, `import f "fmt"`, `import _ "fmt"`, `import . "fmt"`
            single_import_re: Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap(),
            import_block_re: Regex::new(r"(?s)import\s*\((.*?)\)").unwrap(),
            block_line_re: Regex::new(r#"(?m)^\s*(?:[\w.]+\s+)?"([^"]+)""#).unwrap(),
        }
    }
}

impl GoImportExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The declared package name of a source file, if any.
    fn package_name<'a>(&self, src: &'a str) -> Option<&'a str> {
        self.package_re
            .captures(src)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// All import paths referenced by a source file.
    fn imports_of(&self, src: &str) -> BTreeSet<String> {
        let mut imports: BTreeSet<String> = self
            .single_import_re
            .captures_iter(src)
            .map(|c| c[1].to_string())
            .collect();
        for block in self.import_block_re.captures_iter(src) {
            for line in self.block_line_re.captures_iter(&block[1]) {
                imports.insert(line[1].to_string());
            }
        }
        imports
    }
}

impl ImportExtractor for GoImportExtractor {
    fn scan_package(&self, dir: &Path, rel_path: &str) -> Result<Package> {
        let mut shape = PackageShape::Library;
        let mut sets = ImportSets::default();

        let mut entries: Vec<_> = fs::read_dir(dir)
            .with_context(|| format!("failed to read package directory: {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("failed to list package directory: {}", dir.display()))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !path.is_file() || !name.ends_with(".go") {
                continue;
            }
            let src = fs::read_to_string(&path)
                .with_context(|| format!("failed to read source file: {}", path.display()))?;
            let imports = self.imports_of(&src);
            let pkg_name = self.package_name(&src);

            if name.ends_with("_test.go") {
                // Black-box tests live in a `<pkg>_test` package but still
                // contribute edges to the package's own target.
                let external = pkg_name.is_some_and(|p| p.ends_with("_test"));
                if external {
                    sets.external_test.extend(imports);
                } else {
                    sets.test.extend(imports);
                }
            } else {
                if pkg_name == Some("main") {
                    shape = PackageShape::Main;
                }
                sets.normal.extend(imports);
            }
        }

        Ok(Package {
            rel_path: rel_path.to_string(),
            shape,
            imports: sets,
        })
    }
}
