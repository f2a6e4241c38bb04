//! Remote library fetchers.
//!
//! A fetcher knows how to map a remote import path onto the install root
//! that multiple sub-package imports collapse onto, and how to fetch the
//! library's sources. Buildgen only ever uses the first capability: it must
//! never trigger a fetch, and the test suite asserts as much with a fetcher
//! that panics on `fetch`.

use std::path::Path;

use anyhow::Result;

/// A resolver/fetcher for a single remote import path.
pub trait Fetcher {
    /// The canonical install-root import path for this fetcher's import,
    /// e.g. `github.com/user/repo` for `github.com/user/repo/sub/pkg`.
    fn root(&self) -> Result<String>;

    /// Fetch the library's sources at `rev` into `dest`.
    ///
    /// Never invoked by buildgen.
    fn fetch(&self, dest: &Path, rev: Option<&str>) -> Result<()>;
}

/// Produces a fetcher for a given remote import path.
pub trait FetcherFactory {
    fn get_fetcher(&self, import_path: &str) -> Result<Box<dyn Fetcher>>;
}

/// Hosts whose repository paths span three import-path segments.
const THREE_SEGMENT_HOSTS: &[&str] = &[
    "github.com",
    "bitbucket.org",
    "gitlab.com",
    "golang.org",
    "gopkg.in",
];

/// Default factory using host naming conventions.
///
/// Hosted-VCS imports (`github.com/user/repo/...`) root at their repository
/// path; anything else roots at `host/first-segment`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternFetcherFactory;

impl FetcherFactory for PatternFetcherFactory {
    fn get_fetcher(&self, import_path: &str) -> Result<Box<dyn Fetcher>> {
        let host = import_path.split('/').next().unwrap_or(import_path);
        let segments = if THREE_SEGMENT_HOSTS.contains(&host) {
            3
        } else {
            2
        };
        Ok(Box::new(PatternFetcher {
            import_path: import_path.to_string(),
            segments,
        }))
    }
}

struct PatternFetcher {
    import_path: String,
    segments: usize,
}

impl Fetcher for PatternFetcher {
    fn root(&self) -> Result<String> {
        Ok(self
            .import_path
            .split('/')
            .take(self.segments)
            .collect::<Vec<_>>()
            .join("/"))
    }

    fn fetch(&self, _dest: &Path, _rev: Option<&str>) -> Result<()> {
        anyhow::bail!(
            "fetching is not supported during build generation: {}",
            self.import_path
        )
    }
}
