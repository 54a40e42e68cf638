use std::{marker::PhantomData, ptr::NonNull};

use crate::ffi;

/// Session acquired by a [`Backend`](super::Backend), borrowed for `'b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionRef<'b> {
    ptr: NonNull<ffi::wlr_session>,
    _backend: PhantomData<&'b ffi::wlr_backend>,
}

impl<'b> SessionRef<'b> {
    pub(super) fn new(ptr: NonNull<ffi::wlr_session>) -> Self {
        SessionRef {
            ptr,
            _backend: PhantomData,
        }
    }

    /// Raw pointer to the session
    pub fn as_ptr(&self) -> *mut ffi::wlr_session {
        self.ptr.as_ptr()
    }
}
