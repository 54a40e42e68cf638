use libloading::Library;
use tracing::debug;
use wlr_bootstrap::{display::DisplayHandle, ffi::wl_display};

type WlDisplayCreate = unsafe extern "C" fn() -> *mut wl_display;
type WlDisplayDestroy = unsafe extern "C" fn(display: *mut wl_display);

const LIBRARY: &str = "libwayland-server.so.0";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to load libwayland-server.so.0")]
    Load(#[from] libloading::Error),
    #[error("wl_display_create failed")]
    CreateFailed,
}

/// libwayland-server, just enough of it to own a display.
#[derive(Debug)]
pub struct WaylandServer {
    create: WlDisplayCreate,
    destroy: WlDisplayDestroy,
    _library: Library,
}

impl WaylandServer {
    pub fn load() -> Result<WaylandServer, Error> {
        unsafe {
            let library = Library::new(LIBRARY)?;
            let create = *library.get::<WlDisplayCreate>(b"wl_display_create\0")?;
            let destroy = *library.get::<WlDisplayDestroy>(b"wl_display_destroy\0")?;
            Ok(WaylandServer {
                create,
                destroy,
                _library: library,
            })
        }
    }

    pub fn create_display(&self) -> Result<OwnedDisplay<'_>, Error> {
        let ptr = unsafe { (self.create)() };
        if ptr.is_null() {
            return Err(Error::CreateFailed);
        }
        debug!("Created wl_display {:p}", ptr);
        Ok(OwnedDisplay { ptr, server: self })
    }
}

/// A `wl_display` destroyed on drop.
#[derive(Debug)]
pub struct OwnedDisplay<'s> {
    ptr: *mut wl_display,
    server: &'s WaylandServer,
}

impl OwnedDisplay<'_> {
    pub fn handle(&self) -> DisplayHandle<'_> {
        // non-null and alive until `self` is dropped
        unsafe { DisplayHandle::from_ptr(self.ptr) }.unwrap_or_else(|| unreachable!())
    }
}

impl Drop for OwnedDisplay<'_> {
    fn drop(&mut self) {
        debug!("Destroying wl_display {:p}", self.ptr);
        unsafe { (self.server.destroy)(self.ptr) };
    }
}
