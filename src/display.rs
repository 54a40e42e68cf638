//! Borrowed handle to the compositor's `wl_display`.

use std::{marker::PhantomData, ptr::NonNull};

use crate::ffi;

/// A live `wl_display`, borrowed for `'d`.
///
/// The display is owned by whoever created it (usually the compositor through
/// libwayland-server) and is never destroyed through this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle<'d> {
    ptr: NonNull<ffi::wl_display>,
    _lifetime: PhantomData<&'d ffi::wl_display>,
}

impl<'d> DisplayHandle<'d> {
    /// Wrap a raw display pointer. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a `wl_display` that stays alive for `'d`.
    pub unsafe fn from_ptr(ptr: *mut ffi::wl_display) -> Option<DisplayHandle<'d>> {
        NonNull::new(ptr).map(|ptr| DisplayHandle {
            ptr,
            _lifetime: PhantomData,
        })
    }

    /// Raw pointer to the display
    pub fn as_ptr(&self) -> *mut ffi::wl_display {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_non_null(&self) -> NonNull<ffi::wl_display> {
        self.ptr
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::DisplayHandle;
    use crate::library::stub::StubDisplay;

    #[test]
    fn null_is_rejected() {
        assert!(unsafe { DisplayHandle::from_ptr(ptr::null_mut()) }.is_none());
    }

    #[test]
    fn handle_keeps_pointer() {
        let display = StubDisplay::new();
        let handle = display.handle();
        let copy = unsafe { DisplayHandle::from_ptr(handle.as_ptr()) }.unwrap();
        assert_eq!(handle, copy);
    }
}
