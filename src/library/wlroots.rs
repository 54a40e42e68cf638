use std::{
    path::{Path, PathBuf},
    ptr::NonNull,
};

use libc::c_int;
use libloading::Library;
use once_cell::sync::Lazy;
use tracing::{debug, debug_span, info};

use super::{BackendLibrary, LibraryConfig};
use crate::ffi;

static GLOBAL: Lazy<Result<Wlroots, LoadError>> = Lazy::new(Wlroots::load);

/// Error loading libwlroots
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The shared object could not be opened
    #[error("Failed to open {}", .path.display())]
    Open {
        /// Path that was tried
        path: PathBuf,
        /// Error reported by the dynamic loader
        #[source]
        source: libloading::Error,
    },
    /// The shared object does not export a required entry point
    #[error("{} does not export `{symbol}`", .path.display())]
    MissingSymbol {
        /// Path of the loaded library
        path: PathBuf,
        /// Name of the missing entry point
        symbol: &'static str,
        /// Error reported by the dynamic loader
        #[source]
        source: libloading::Error,
    },
    /// The configuration did not name any library
    #[error("No library candidates were configured")]
    NoCandidates,
}

/// libwlroots, resolved at runtime.
///
/// The function pointers are only valid while the library stays loaded, which is
/// guaranteed by keeping the [`Library`] alongside them.
#[derive(Debug)]
pub struct Wlroots {
    autocreate: ffi::wlr_backend_autocreate_t,
    get_renderer: ffi::wlr_backend_get_renderer_t,
    start: ffi::wlr_backend_start_t,
    destroy: ffi::wlr_backend_destroy_t,
    // missing from older releases
    get_session: Option<ffi::wlr_backend_get_session_t>,
    get_drm_fd: Option<ffi::wlr_backend_get_drm_fd_t>,
    path: PathBuf,
    _library: Library,
}

impl Wlroots {
    /// Load libwlroots as configured by [`LibraryConfig::from_env`].
    pub fn load() -> Result<Wlroots, LoadError> {
        Self::load_with(&LibraryConfig::from_env())
    }

    /// Load the first candidate of `config` that opens and exports the required entry points.
    ///
    /// If all candidates fail, the error of the last one is returned.
    pub fn load_with(config: &LibraryConfig) -> Result<Wlroots, LoadError> {
        let span = debug_span!("wlroots_loader");
        let _guard = span.enter();

        let mut last_error = None;
        for candidate in config.candidates() {
            match Wlroots::open(candidate) {
                Ok(wlroots) => return Ok(wlroots),
                Err(err) => {
                    debug!("Skipping {}: {}", candidate.display(), err);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(LoadError::NoCandidates))
    }

    /// Load libwlroots from exactly `path`.
    ///
    /// A bare file name is looked up through the dynamic loader's search path.
    ///
    /// `wlr_backend_autocreate`, `wlr_backend_get_renderer`, `wlr_backend_start` and
    /// `wlr_backend_destroy` are required. Without `wlr_backend_get_session` or
    /// `wlr_backend_get_drm_fd` the corresponding accessors of
    /// [`Backend`](crate::backend::Backend) report `None`.
    pub fn open(path: impl AsRef<Path>) -> Result<Wlroots, LoadError> {
        let path = path.as_ref();
        // wlroots has no library constructors, loading it only maps it.
        let library = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
            path: path.to_owned(),
            source,
        })?;

        let wlroots = unsafe {
            Wlroots {
                autocreate: symbol(&library, path, ffi::WLR_BACKEND_AUTOCREATE)?,
                get_renderer: symbol(&library, path, ffi::WLR_BACKEND_GET_RENDERER)?,
                start: symbol(&library, path, ffi::WLR_BACKEND_START)?,
                destroy: symbol(&library, path, ffi::WLR_BACKEND_DESTROY)?,
                get_session: optional_symbol(&library, path, ffi::WLR_BACKEND_GET_SESSION),
                get_drm_fd: optional_symbol(&library, path, ffi::WLR_BACKEND_GET_DRM_FD),
                path: path.to_owned(),
                _library: library,
            }
        };

        info!("Loaded {}", path.display());
        Ok(wlroots)
    }

    /// A process-wide instance, loaded on first use with [`Wlroots::load`].
    ///
    /// A failed load is not retried.
    pub fn global() -> Result<&'static Wlroots, &'static LoadError> {
        Lazy::force(&GLOBAL).as_ref()
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// # Safety
///
/// `T` must be the function pointer type matching the native declaration of `name`.
unsafe fn symbol<T: Copy>(library: &Library, path: &Path, name: &'static str) -> Result<T, LoadError> {
    library
        .get::<T>(name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|source| LoadError::MissingSymbol {
            path: path.to_owned(),
            symbol: name,
            source,
        })
}

/// # Safety
///
/// See [`symbol`].
unsafe fn optional_symbol<T: Copy>(library: &Library, path: &Path, name: &'static str) -> Option<T> {
    match symbol(library, path, name) {
        Ok(symbol) => Some(symbol),
        Err(err) => {
            debug!("{}", err);
            None
        }
    }
}

unsafe impl BackendLibrary for Wlroots {
    unsafe fn backend_autocreate(&self, display: NonNull<ffi::wl_display>) -> *mut ffi::wlr_backend {
        (self.autocreate)(display.as_ptr(), None)
    }

    unsafe fn backend_get_renderer(&self, backend: NonNull<ffi::wlr_backend>) -> *mut ffi::wlr_renderer {
        (self.get_renderer)(backend.as_ptr())
    }

    unsafe fn backend_start(&self, backend: NonNull<ffi::wlr_backend>) -> bool {
        (self.start)(backend.as_ptr())
    }

    unsafe fn backend_destroy(&self, backend: NonNull<ffi::wlr_backend>) {
        (self.destroy)(backend.as_ptr())
    }

    unsafe fn backend_get_session(&self, backend: NonNull<ffi::wlr_backend>) -> *mut ffi::wlr_session {
        match self.get_session {
            Some(get_session) => get_session(backend.as_ptr()),
            None => std::ptr::null_mut(),
        }
    }

    unsafe fn backend_get_drm_fd(&self, backend: NonNull<ffi::wlr_backend>) -> c_int {
        match self.get_drm_fd {
            Some(get_drm_fd) => get_drm_fd(backend.as_ptr()),
            None => -1,
        }
    }
}
