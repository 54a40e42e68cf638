use std::{
    env::{self, VarError},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

/// Environment variable overriding which shared object is loaded.
pub const LIBRARY_ENV: &str = "WLR_BOOTSTRAP_LIBRARY";

/// Shared objects tried in order when no override is set.
///
/// Only the 0.12 ABI is usable: `wlr_backend_autocreate` takes a renderer factory there,
/// and later releases no longer export `wlr_backend_get_renderer`.
pub const DEFAULT_CANDIDATES: &[&str] = &["libwlroots.so.7", "libwlroots.so"];

/// Where to look for libwlroots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    candidates: Vec<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            candidates: DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl LibraryConfig {
    /// Try the given candidates, in order.
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        LibraryConfig {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Only try the library at `path`.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        LibraryConfig {
            candidates: vec![path.into()],
        }
    }

    /// The default candidates, unless [`LIBRARY_ENV`] names a library to use instead.
    pub fn from_env() -> Self {
        Self::from_var(env::var(LIBRARY_ENV))
    }

    fn from_var(value: Result<String, VarError>) -> Self {
        match value {
            Ok(path) if path.is_empty() => {
                debug!("{} is empty, using the default candidates", LIBRARY_ENV);
                LibraryConfig::default()
            }
            Ok(path) => {
                debug!("{} is set, only trying {}", LIBRARY_ENV, path);
                LibraryConfig::with_library(path)
            }
            Err(VarError::NotUnicode(_)) => {
                warn!("Value of {} is not valid Unicode, ignoring.", LIBRARY_ENV);
                LibraryConfig::default()
            }
            Err(VarError::NotPresent) => LibraryConfig::default(),
        }
    }

    /// Candidates in the order they are tried.
    pub fn candidates(&self) -> impl Iterator<Item = &Path> {
        self.candidates.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use std::{env::VarError, ffi::OsString, path::Path};

    use super::{LibraryConfig, DEFAULT_CANDIDATES};

    #[test]
    fn unset_uses_defaults() {
        let config = LibraryConfig::from_var(Err(VarError::NotPresent));
        assert_eq!(config, LibraryConfig::default());
        assert_eq!(config.candidates().count(), DEFAULT_CANDIDATES.len());
    }

    #[test]
    fn override_replaces_defaults() {
        let config = LibraryConfig::from_var(Ok("/opt/wlroots/lib/libwlroots.so".into()));
        assert_eq!(
            config.candidates().collect::<Vec<_>>(),
            vec![Path::new("/opt/wlroots/lib/libwlroots.so")]
        );
    }

    #[test]
    fn empty_or_invalid_override_is_ignored() {
        assert_eq!(LibraryConfig::from_var(Ok(String::new())), LibraryConfig::default());
        assert_eq!(
            LibraryConfig::from_var(Err(VarError::NotUnicode(OsString::from("x")))),
            LibraryConfig::default()
        );
    }

    #[test]
    fn candidates_keep_their_order() {
        let config = LibraryConfig::new(["b.so", "a.so"]);
        assert_eq!(
            config.candidates().collect::<Vec<_>>(),
            vec![Path::new("b.so"), Path::new("a.so")]
        );
    }
}
