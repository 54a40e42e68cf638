//! Access to the native backend library.
//!
//! Every call that crosses into libwlroots goes through the [`BackendLibrary`] trait.
//! The [`Wlroots`] type implements it by resolving the entry points from the shared
//! object at runtime, so that this crate neither links against wlroots nor needs its
//! headers at build time.
//!
//! ## Loading
//!
//! Use [`Wlroots::load`] to load the library according to [`LibraryConfig::from_env`],
//! [`Wlroots::load_with`] to provide your own [`LibraryConfig`], or [`Wlroots::global`]
//! to share one process-wide instance:
//!
//! ```no_run
//! use wlr_bootstrap::library::Wlroots;
//!
//! let wlroots = Wlroots::global().expect("libwlroots is not available");
//! # let _ = wlroots;
//! ```
//!
//! Failing to find the library, or finding a library that lacks one of the required
//! entry points, is reported as a [`LoadError`].

use std::{ptr::NonNull, rc::Rc, sync::Arc};

use libc::c_int;

use crate::ffi;

mod config;
#[cfg(any(test, feature = "library_stub"))]
pub mod stub;
mod wlroots;

pub use self::config::{LibraryConfig, DEFAULT_CANDIDATES, LIBRARY_ENV};
pub use self::wlroots::{LoadError, Wlroots};

/// Entry points of the native backend library.
///
/// # Safety
///
/// Implementors promise that every method behaves like the wlroots function of the
/// same name: `backend_autocreate` either returns null or a pointer to a backend that
/// stays valid until it is passed to `backend_destroy`, and all other methods accept
/// any such pointer. [`Backend`](crate::backend::Backend) relies on this to hand out
/// safe handles.
pub unsafe trait BackendLibrary {
    /// `wlr_backend_autocreate`, with the default renderer
    ///
    /// # Safety
    ///
    /// `display` must point to a live `wl_display` that outlives the returned backend.
    unsafe fn backend_autocreate(&self, display: NonNull<ffi::wl_display>) -> *mut ffi::wlr_backend;

    /// `wlr_backend_get_renderer`
    ///
    /// # Safety
    ///
    /// `backend` must be a live backend created by this library.
    unsafe fn backend_get_renderer(&self, backend: NonNull<ffi::wlr_backend>) -> *mut ffi::wlr_renderer;

    /// `wlr_backend_start`
    ///
    /// # Safety
    ///
    /// `backend` must be a live backend created by this library.
    unsafe fn backend_start(&self, backend: NonNull<ffi::wlr_backend>) -> bool;

    /// `wlr_backend_destroy`
    ///
    /// # Safety
    ///
    /// `backend` must be a live backend created by this library. It is invalid afterwards.
    unsafe fn backend_destroy(&self, backend: NonNull<ffi::wlr_backend>);

    /// `wlr_backend_get_session`, or null if the library does not provide it
    ///
    /// # Safety
    ///
    /// `backend` must be a live backend created by this library.
    unsafe fn backend_get_session(&self, backend: NonNull<ffi::wlr_backend>) -> *mut ffi::wlr_session;

    /// `wlr_backend_get_drm_fd`, or `-1` if the library does not provide it
    ///
    /// # Safety
    ///
    /// `backend` must be a live backend created by this library.
    unsafe fn backend_get_drm_fd(&self, backend: NonNull<ffi::wlr_backend>) -> c_int;
}

macro_rules! forward_library {
    ($($ty:ty),*) => {
        $(
            unsafe impl<L: BackendLibrary + ?Sized> BackendLibrary for $ty {
                unsafe fn backend_autocreate(
                    &self,
                    display: NonNull<ffi::wl_display>,
                ) -> *mut ffi::wlr_backend {
                    (**self).backend_autocreate(display)
                }

                unsafe fn backend_get_renderer(
                    &self,
                    backend: NonNull<ffi::wlr_backend>,
                ) -> *mut ffi::wlr_renderer {
                    (**self).backend_get_renderer(backend)
                }

                unsafe fn backend_start(&self, backend: NonNull<ffi::wlr_backend>) -> bool {
                    (**self).backend_start(backend)
                }

                unsafe fn backend_destroy(&self, backend: NonNull<ffi::wlr_backend>) {
                    (**self).backend_destroy(backend)
                }

                unsafe fn backend_get_session(
                    &self,
                    backend: NonNull<ffi::wlr_backend>,
                ) -> *mut ffi::wlr_session {
                    (**self).backend_get_session(backend)
                }

                unsafe fn backend_get_drm_fd(&self, backend: NonNull<ffi::wlr_backend>) -> c_int {
                    (**self).backend_get_drm_fd(backend)
                }
            }
        )*
    };
}

forward_library!(&L, Rc<L>, Arc<L>);
