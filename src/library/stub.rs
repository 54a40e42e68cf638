//! In-memory stand-in for libwlroots.
//!
//! [`StubLibrary`] hands out fake backends, renderers and sessions backed by heap
//! allocations, so the ownership rules of [`Backend`](crate::backend::Backend) can be
//! exercised without a session, a GPU, or the library itself. It keeps track of every
//! backend it created and panics on misuse (destroying twice, using a backend it does
//! not know), which turns contract violations into test failures.

#![allow(missing_docs)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    os::unix::io::RawFd,
    ptr::NonNull,
};

use libc::c_int;

use super::BackendLibrary;
use crate::{display::DisplayHandle, ffi};

/// How the stub behaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubOptions {
    /// Whether auto-detection finds a usable backend
    pub available: bool,
    /// Whether created backends carry a renderer
    pub renderer: bool,
    /// Whether created backends carry a session
    pub session: bool,
    /// DRM fd reported by created backends
    pub drm_fd: Option<RawFd>,
    /// Whether starting a backend succeeds
    pub start_succeeds: bool,
}

impl Default for StubOptions {
    fn default() -> Self {
        StubOptions {
            available: true,
            renderer: true,
            session: true,
            drm_fd: None,
            start_succeeds: true,
        }
    }
}

#[derive(Debug)]
struct StubBackend {
    display: usize,
    renderer: Option<Box<u64>>,
    session: Option<Box<u64>>,
    drm_fd: Option<RawFd>,
}

/// Fake backend library. See the [module documentation](self).
#[derive(Debug, Default)]
pub struct StubLibrary {
    options: StubOptions,
    backends: RefCell<HashMap<usize, Box<StubBackend>>>,
    autocreate_calls: Cell<usize>,
    start_calls: Cell<usize>,
    destroy_calls: Cell<usize>,
}

impl StubLibrary {
    /// A stub behaving according to `options`
    pub fn new(options: StubOptions) -> StubLibrary {
        StubLibrary {
            options,
            ..Default::default()
        }
    }

    /// A stub in which no backend can be created
    pub fn unavailable() -> StubLibrary {
        StubLibrary::new(StubOptions {
            available: false,
            ..Default::default()
        })
    }

    /// Backends created and not yet destroyed
    pub fn live_backends(&self) -> usize {
        self.backends.borrow().len()
    }

    pub fn autocreate_calls(&self) -> usize {
        self.autocreate_calls.get()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.get()
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.get()
    }

    /// Display the given backend was created on
    pub fn display_of(&self, backend: *mut ffi::wlr_backend) -> Option<*mut ffi::wl_display> {
        self.backends
            .borrow()
            .get(&(backend as usize))
            .map(|stub| stub.display as *mut ffi::wl_display)
    }

    fn with_backend<T>(&self, backend: NonNull<ffi::wlr_backend>, f: impl FnOnce(&StubBackend) -> T) -> T {
        let backends = self.backends.borrow();
        let stub = backends
            .get(&(backend.as_ptr() as usize))
            .unwrap_or_else(|| panic!("{:p} is not a live stub backend", backend));
        f(stub)
    }
}

unsafe impl BackendLibrary for StubLibrary {
    unsafe fn backend_autocreate(&self, display: NonNull<ffi::wl_display>) -> *mut ffi::wlr_backend {
        self.autocreate_calls.set(self.autocreate_calls.get() + 1);
        if !self.options.available {
            return std::ptr::null_mut();
        }

        let stub = Box::new(StubBackend {
            display: display.as_ptr() as usize,
            renderer: self.options.renderer.then(|| Box::new(0)),
            session: self.options.session.then(|| Box::new(0)),
            drm_fd: self.options.drm_fd,
        });
        let ptr = &*stub as *const StubBackend as *mut ffi::wlr_backend;
        self.backends.borrow_mut().insert(ptr as usize, stub);
        ptr
    }

    unsafe fn backend_get_renderer(&self, backend: NonNull<ffi::wlr_backend>) -> *mut ffi::wlr_renderer {
        self.with_backend(backend, |stub| match &stub.renderer {
            Some(renderer) => &**renderer as *const u64 as *mut ffi::wlr_renderer,
            None => std::ptr::null_mut(),
        })
    }

    unsafe fn backend_start(&self, backend: NonNull<ffi::wlr_backend>) -> bool {
        self.with_backend(backend, |_| ());
        self.start_calls.set(self.start_calls.get() + 1);
        self.options.start_succeeds
    }

    unsafe fn backend_destroy(&self, backend: NonNull<ffi::wlr_backend>) {
        self.destroy_calls.set(self.destroy_calls.get() + 1);
        if self.backends.borrow_mut().remove(&(backend.as_ptr() as usize)).is_none() {
            panic!("{:p} destroyed twice or never created", backend);
        }
    }

    unsafe fn backend_get_session(&self, backend: NonNull<ffi::wlr_backend>) -> *mut ffi::wlr_session {
        self.with_backend(backend, |stub| match &stub.session {
            Some(session) => &**session as *const u64 as *mut ffi::wlr_session,
            None => std::ptr::null_mut(),
        })
    }

    unsafe fn backend_get_drm_fd(&self, backend: NonNull<ffi::wlr_backend>) -> c_int {
        self.with_backend(backend, |stub| stub.drm_fd.unwrap_or(-1))
    }
}

/// Stand-in for a `wl_display`, for use with [`StubLibrary`].
#[derive(Debug, Default)]
pub struct StubDisplay {
    storage: Box<u64>,
}

impl StubDisplay {
    pub fn new() -> StubDisplay {
        StubDisplay::default()
    }

    /// Handle borrowing this display
    pub fn handle(&self) -> DisplayHandle<'_> {
        let ptr = &*self.storage as *const u64 as *mut ffi::wl_display;
        // the box lives as long as `self`
        unsafe { DisplayHandle::from_ptr(ptr) }.unwrap_or_else(|| unreachable!())
    }
}
