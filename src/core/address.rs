//! Target addresses.
//!
//! An address identifies a target by the build-root-relative directory of its
//! declaration plus a target name. The name defaults to the directory
//! basename and is elided from the display form when it matches.

use std::fmt;

use anyhow::{bail, Result};

/// A workspace-unique target address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    /// Build-root-relative directory, always `/`-separated.
    path: String,

    /// Target name within the directory's declaration file.
    name: String,
}

impl Address {
    /// Create an address from an explicit path and name.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Address {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Create an address for a directory, using the basename as the name.
    pub fn from_dir(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = basename(&path).to_string();
        Address { path, name }
    }

    /// Parse a `dir/path` or `dir/path:name` spec.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim().trim_matches('/');
        if spec.is_empty() {
            bail!("empty target address");
        }
        match spec.split_once(':') {
            Some((path, name)) => {
                if path.is_empty() || name.is_empty() {
                    bail!("malformed target address: `{}`", spec);
                }
                Ok(Address::new(path, name))
            }
            None => Ok(Address::from_dir(spec)),
        }
    }

    /// The build-root-relative directory holding this target's declaration.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name is the default (directory basename).
    pub fn is_default_name(&self) -> bool {
        self.name == basename(&self.path)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_name() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}:{}", self.path, self.name)
        }
    }
}

/// Last `/`-separated component of a relative path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dir_uses_basename() {
        let addr = Address::from_dir("src/go/src/fred");
        assert_eq!(addr.path(), "src/go/src/fred");
        assert_eq!(addr.name(), "fred");
        assert!(addr.is_default_name());
    }

    #[test]
    fn test_display_elides_default_name() {
        assert_eq!(
            Address::from_dir("src/go/src/fred").to_string(),
            "src/go/src/fred"
        );
        assert_eq!(
            Address::new("3rdparty/go/pantsbuild.org/fake", "prod").to_string(),
            "3rdparty/go/pantsbuild.org/fake:prod"
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let addr = Address::parse("3rdparty/go/pantsbuild.org/fake:prod").unwrap();
        assert_eq!(addr.path(), "3rdparty/go/pantsbuild.org/fake");
        assert_eq!(addr.name(), "prod");

        let addr = Address::parse("src/go/src/jane").unwrap();
        assert_eq!(addr.name(), "jane");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("a/b:").is_err());
        assert!(Address::parse(":name").is_err());
    }
}
