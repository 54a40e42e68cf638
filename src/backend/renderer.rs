use std::{marker::PhantomData, ptr::NonNull};

use crate::ffi;

/// Renderer owned by a [`Backend`](super::Backend), borrowed for `'b`.
///
/// Two handles compare equal if they refer to the same native renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererRef<'b> {
    ptr: NonNull<ffi::wlr_renderer>,
    _backend: PhantomData<&'b ffi::wlr_backend>,
}

impl<'b> RendererRef<'b> {
    pub(super) fn new(ptr: NonNull<ffi::wlr_renderer>) -> Self {
        RendererRef {
            ptr,
            _backend: PhantomData,
        }
    }

    /// Raw pointer to the renderer.
    ///
    /// The pointer dangles once the backend is destroyed.
    pub fn as_ptr(&self) -> *mut ffi::wlr_renderer {
        self.ptr.as_ptr()
    }
}
