//! Creation and ownership of the compositor backend
//!
//! A compositor obtains its backend from the native library's auto-detection, which
//! picks a direct session on a tty, a nested Wayland or X11 window when running inside
//! another graphical session, or whatever the library's own configuration requests.
//! This crate imposes no policy on that choice.
//!
//! ## Usage
//!
//! ```no_run
//! use wlr_bootstrap::{backend::Backend, display::DisplayHandle, library::Wlroots};
//!
//! # fn run(raw_display: *mut wlr_bootstrap::ffi::wl_display) -> Result<(), Box<dyn std::error::Error>> {
//! let wlroots = Wlroots::global()?;
//! let display = unsafe { DisplayHandle::from_ptr(raw_display) }.ok_or("no display")?;
//!
//! let mut backend = Backend::autocreate(wlroots, display).ok_or("no suitable backend")?;
//! let renderer = backend.renderer().ok_or("backend has no renderer")?;
//! // set up outputs, inputs and the renderer here
//! # let _ = renderer;
//! backend.start()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Ownership
//!
//! The [`Backend`] owns the native object and destroys it when dropped. The
//! [`RendererRef`] and [`SessionRef`] handed out by it borrow the backend, so they
//! cannot be used after the backend is gone. Raw pointers obtained through their
//! `as_ptr` methods carry no such guarantee.

use std::{
    fmt,
    marker::PhantomData,
    mem::ManuallyDrop,
    os::unix::io::BorrowedFd,
    ptr::{self, NonNull},
};

use tracing::{debug, debug_span, info, warn};

use crate::{display::DisplayHandle, ffi, library::BackendLibrary};

mod renderer;
mod session;

pub use self::renderer::RendererRef;
pub use self::session::SessionRef;

/// Errors of a created backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `wlr_backend_start` reported a failure
    #[error("The backend failed to start")]
    StartFailed,
}

/// A backend created by the native library, destroyed on drop.
///
/// `'d` is the lifetime of the display the backend was created on; the native backend
/// keeps using the display until it is destroyed.
pub struct Backend<'d, L: BackendLibrary> {
    ptr: NonNull<ffi::wlr_backend>,
    library: L,
    started: bool,
    span: tracing::Span,
    _display: PhantomData<DisplayHandle<'d>>,
}

impl<'d, L: BackendLibrary> fmt::Debug for Backend<'d, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("ptr", &self.ptr)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl<'d, L: BackendLibrary> Backend<'d, L> {
    /// Create the most suitable backend for the current environment.
    ///
    /// Returns `None` if the library could not create any backend, for example because
    /// neither a session nor a parent display is available. Nothing is leaked in that
    /// case and the call may be repeated once the environment changed.
    pub fn autocreate(library: L, display: DisplayHandle<'d>) -> Option<Backend<'d, L>> {
        let span = debug_span!("backend_bootstrap", backend = tracing::field::Empty);
        let _guard = span.enter();

        let ptr = unsafe { library.backend_autocreate(display.as_non_null()) };
        let Some(ptr) = NonNull::new(ptr) else {
            warn!("Could not create any backend, possibilities exhausted");
            return None;
        };

        span.record("backend", tracing::field::debug(ptr));
        info!("Created backend");

        drop(_guard);
        Some(Backend {
            ptr,
            library,
            started: false,
            span,
            _display: PhantomData,
        })
    }

    /// Take ownership of a backend created outside of this crate.
    ///
    /// Returns `None` for null. The backend is assumed not to be started yet.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live backend created by `library` on `display`, and nothing else
    /// may destroy it.
    pub unsafe fn from_raw(
        library: L,
        ptr: *mut ffi::wlr_backend,
        _display: DisplayHandle<'d>,
    ) -> Option<Backend<'d, L>> {
        let ptr = NonNull::new(ptr)?;
        Some(Backend {
            ptr,
            library,
            started: false,
            span: debug_span!("backend_bootstrap", backend = ?ptr),
            _display: PhantomData,
        })
    }

    /// Renderer the backend created alongside itself.
    ///
    /// Returns `None` for backend implementations without a renderer of their own.
    /// Repeated calls return the same renderer.
    pub fn renderer(&self) -> Option<RendererRef<'_>> {
        let ptr = unsafe { self.library.backend_get_renderer(self.ptr) };
        NonNull::new(ptr).map(RendererRef::new)
    }

    /// Session the backend acquired, if it runs on one.
    pub fn session(&self) -> Option<SessionRef<'_>> {
        let ptr = unsafe { self.library.backend_get_session(self.ptr) };
        NonNull::new(ptr).map(SessionRef::new)
    }

    /// DRM device the backend renders with, if any.
    pub fn drm_fd(&self) -> Option<BorrowedFd<'_>> {
        let fd = unsafe { self.library.backend_get_drm_fd(self.ptr) };
        // owned by the backend and open until it is destroyed
        (fd >= 0).then(|| unsafe { BorrowedFd::borrow_raw(fd) })
    }

    /// Start the backend, which begins emitting outputs and input devices.
    ///
    /// Starting an already started backend does nothing.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.started {
            return Ok(());
        }

        let _guard = self.span.enter();
        if unsafe { self.library.backend_start(self.ptr) } {
            info!("Backend started");
            self.started = true;
            Ok(())
        } else {
            warn!("Backend failed to start");
            Err(Error::StartFailed)
        }
    }

    /// Whether [`start`](Backend::start) succeeded
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Raw pointer to the native backend
    pub fn as_ptr(&self) -> *mut ffi::wlr_backend {
        self.ptr.as_ptr()
    }

    /// Library the backend was created with
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Give up ownership without destroying the native backend.
    ///
    /// The caller becomes responsible for calling `wlr_backend_destroy`.
    pub fn into_raw(self) -> *mut ffi::wlr_backend {
        let this = ManuallyDrop::new(self);
        // every field but the pointer still has to be dropped
        unsafe {
            drop(ptr::read(&this.library));
            drop(ptr::read(&this.span));
        }
        this.ptr.as_ptr()
    }
}

impl<'d, L: BackendLibrary> Drop for Backend<'d, L> {
    fn drop(&mut self) {
        let _guard = self.span.enter();
        debug!("Destroying backend");
        unsafe { self.library.backend_destroy(self.ptr) };
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, Error};
    use crate::library::stub::{StubDisplay, StubLibrary, StubOptions};

    #[test]
    fn creates_backend_when_available() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();

        let backend = Backend::autocreate(&library, display.handle()).expect("backend");
        assert_eq!(library.live_backends(), 1);
        assert_eq!(library.display_of(backend.as_ptr()), Some(display.handle().as_ptr()));
        assert!(!backend.is_started());
    }

    #[test]
    fn unavailable_backend_is_none_and_leaks_nothing() {
        let library = StubLibrary::unavailable();
        let display = StubDisplay::new();

        assert!(Backend::autocreate(&library, display.handle()).is_none());
        assert_eq!(library.autocreate_calls(), 1);
        assert_eq!(library.live_backends(), 0);
        assert_eq!(library.destroy_calls(), 0);
    }

    #[test]
    fn failure_can_be_retried() {
        let library = StubLibrary::unavailable();
        let display = StubDisplay::new();

        assert!(Backend::autocreate(&library, display.handle()).is_none());
        assert!(Backend::autocreate(&library, display.handle()).is_none());
        assert_eq!(library.autocreate_calls(), 2);
    }

    #[test]
    fn renderer_is_available_and_stable() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();
        let backend = Backend::autocreate(&library, display.handle()).unwrap();

        let first = backend.renderer().expect("renderer");
        let second = backend.renderer().expect("renderer");
        assert_eq!(first, second);
        assert_eq!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn backends_have_distinct_renderers() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();
        let a = Backend::autocreate(&library, display.handle()).unwrap();
        let b = Backend::autocreate(&library, display.handle()).unwrap();

        assert_ne!(a.renderer(), b.renderer());
        assert_eq!(library.live_backends(), 2);
    }

    #[test]
    fn backend_without_renderer() {
        let library = StubLibrary::new(StubOptions {
            renderer: false,
            ..Default::default()
        });
        let display = StubDisplay::new();
        let backend = Backend::autocreate(&library, display.handle()).unwrap();

        assert!(backend.renderer().is_none());
    }

    #[test]
    fn drop_destroys_exactly_once() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();

        let backend = Backend::autocreate(&library, display.handle()).unwrap();
        drop(backend);

        assert_eq!(library.destroy_calls(), 1);
        assert_eq!(library.live_backends(), 0);
    }

    #[test]
    fn into_raw_keeps_backend_alive() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();

        let raw = Backend::autocreate(&library, display.handle()).unwrap().into_raw();
        assert_eq!(library.destroy_calls(), 0);
        assert_eq!(library.live_backends(), 1);

        let adopted = unsafe { Backend::from_raw(&library, raw, display.handle()) }.unwrap();
        assert_eq!(adopted.as_ptr(), raw);
        drop(adopted);
        assert_eq!(library.live_backends(), 0);
    }

    #[test]
    fn from_raw_rejects_null() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();
        assert!(unsafe { Backend::from_raw(&library, std::ptr::null_mut(), display.handle()) }.is_none());
    }

    #[test]
    fn start_is_forwarded_once() {
        let library = StubLibrary::default();
        let display = StubDisplay::new();
        let mut backend = Backend::autocreate(&library, display.handle()).unwrap();

        backend.start().unwrap();
        backend.start().unwrap();
        assert!(backend.is_started());
        assert_eq!(library.start_calls(), 1);
    }

    #[test]
    fn start_failure_is_reported() {
        let library = StubLibrary::new(StubOptions {
            start_succeeds: false,
            ..Default::default()
        });
        let display = StubDisplay::new();
        let mut backend = Backend::autocreate(&library, display.handle()).unwrap();

        assert!(matches!(backend.start(), Err(Error::StartFailed)));
        assert!(!backend.is_started());
        // a failed start may be retried
        assert!(backend.start().is_err());
        assert_eq!(library.start_calls(), 2);
    }

    #[test]
    fn session_and_drm_fd() {
        let library = StubLibrary::new(StubOptions {
            drm_fd: Some(0),
            ..Default::default()
        });
        let display = StubDisplay::new();
        let backend = Backend::autocreate(&library, display.handle()).unwrap();

        assert!(backend.session().is_some());
        assert_eq!(backend.session(), backend.session());
        assert!(backend.drm_fd().is_some());
    }

    #[test]
    fn nested_backend_has_no_session_or_drm_fd() {
        let library = StubLibrary::new(StubOptions {
            session: false,
            drm_fd: None,
            ..Default::default()
        });
        let display = StubDisplay::new();
        let backend = Backend::autocreate(&library, display.handle()).unwrap();

        assert!(backend.session().is_none());
        assert!(backend.drm_fd().is_none());
    }

    #[test]
    fn shared_library() {
        let library = std::rc::Rc::new(StubLibrary::default());
        let display = StubDisplay::new();
        let backend = Backend::autocreate(library.clone(), display.handle()).unwrap();

        assert_eq!(backend.library().live_backends(), 1);
        drop(backend);
        assert_eq!(library.live_backends(), 0);
    }

    fn lifecycle(options: StubOptions) -> (bool, bool, bool, usize, usize, usize) {
        let library = StubLibrary::new(options);
        let display = StubDisplay::new();
        let (created, has_renderer, started) = match Backend::autocreate(&library, display.handle()) {
            Some(mut backend) => (true, backend.renderer().is_some(), backend.start().is_ok()),
            None => (false, false, false),
        };
        (
            created,
            has_renderer,
            started,
            library.start_calls(),
            library.destroy_calls(),
            library.live_backends(),
        )
    }

    #[test]
    fn logging_does_not_change_results() {
        let scenarios = [
            StubOptions::default(),
            StubOptions {
                available: false,
                ..Default::default()
            },
            StubOptions {
                renderer: false,
                start_succeeds: false,
                ..Default::default()
            },
        ];

        for options in scenarios {
            let silent = lifecycle(options.clone());
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .finish();
            let logged = tracing::subscriber::with_default(subscriber, || lifecycle(options.clone()));

            assert_eq!(silent, logged, "{:?}", options);
            assert_eq!(logged.5, 0);
        }
    }

    // Using a `RendererRef` after its backend was dropped is rejected by the borrow
    // checker. Keeping the raw pointer from `RendererRef::as_ptr` and dereferencing it
    // afterwards is undefined behaviour and intentionally not tested.
}
