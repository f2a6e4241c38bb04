//! Build generation error types.
//!
//! Structural failures carry their specifics as data so callers can branch
//! on variants instead of matching message strings. Root-location failures
//! and floating-revision failures are raised directly; per-package
//! structural failures are wrapped in `Generation` with the inner cause.

use thiserror::Error;

use crate::core::address::Address;

/// Error during a build generation run.
#[derive(Debug, Error)]
pub enum BuildgenError {
    #[error("no local source roots found: cannot generate first-party targets")]
    NoLocalRoots,

    #[error(
        "found {} local source roots, expected exactly one: {}",
        .0.len(),
        .0.join(", ")
    )]
    InvalidLocalRoots(Vec<String>),

    #[error(
        "found {} remote library roots, expected at most one: {}",
        .0.len(),
        .0.join(", ")
    )]
    InvalidRemoteRoots(Vec<String>),

    #[error("local source target `{address}` is not located under the local root `{local_root}`")]
    UnrootedLocalSource {
        address: Address,
        local_root: String,
    },

    #[error("failed to generate targets for `{address}`")]
    Generation {
        address: Address,
        #[source]
        cause: GenerationCause,
    },

    #[error(
        "cannot generate remote libraries with unpinned revisions: {}",
        join_addresses(.0)
    )]
    FloatingRemotes(Vec<Address>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The structural cause behind a `Generation` failure.
#[derive(Debug, Error)]
pub enum GenerationCause {
    #[error(
        "package `{package}` is declared as a {actual} but its sources have a {expected} shape"
    )]
    WrongTargetType {
        package: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("new remote import `{import}` encountered but remote resolution is disabled")]
    RemoteNotAllowed { import: String },

    #[error("remote import `{import}` requires a remote library root and none exists")]
    MissingRemoteRoot { import: String },
}

fn join_addresses(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_message_lists_all_offenders() {
        let err = BuildgenError::FloatingRemotes(vec![
            Address::new("3rdparty/go/pantsbuild.org/fake", "prod"),
            Address::from_dir("3rdparty/go/github.com/user/repo"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("pantsbuild.org/fake:prod"));
        assert!(msg.contains("github.com/user/repo"));
    }

    #[test]
    fn test_generation_carries_cause() {
        let err = BuildgenError::Generation {
            address: Address::from_dir("src/go/src/fred"),
            cause: GenerationCause::WrongTargetType {
                package: "fred".to_string(),
                expected: "go_binary",
                actual: "go_library",
            },
        };
        assert!(matches!(
            err,
            BuildgenError::Generation {
                cause: GenerationCause::WrongTargetType { .. },
                ..
            }
        ));
    }
}
