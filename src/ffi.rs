//! Raw declarations for the parts of libwlroots this crate calls into.
//!
//! The native structures are only ever handled through pointers, so they are
//! declared as opaque zero-sized types. Their real layout (which contains
//! flexible array members) never has to be described on the Rust side.
//!
//! The signatures follow the wlroots 0.12 ABI, in which `wlr_backend_autocreate`
//! also takes a renderer factory. Passing `None` there selects the library's default
//! renderer.

#![allow(non_camel_case_types, missing_docs, missing_debug_implementations)]

use libc::{c_int, c_uint};

/// Opaque `struct wl_display` from libwayland-server.
#[repr(C)]
pub struct wl_display {
    _private: [u8; 0],
}

/// Opaque `struct wlr_backend`.
#[repr(C)]
pub struct wlr_backend {
    _private: [u8; 0],
}

/// Opaque `struct wlr_renderer`.
#[repr(C)]
pub struct wlr_renderer {
    _private: [u8; 0],
}

/// Opaque `struct wlr_egl`.
#[repr(C)]
pub struct wlr_egl {
    _private: [u8; 0],
}

/// Opaque `struct wlr_session`.
#[repr(C)]
pub struct wlr_session {
    _private: [u8; 0],
}

/// `wlr_renderer_create_func_t`, nullable
pub type wlr_renderer_create_func_t = Option<
    unsafe extern "C" fn(
        egl: *mut wlr_egl,
        platform: c_uint,
        remote_display: *mut libc::c_void,
        config_attribs: *mut c_int,
        visual_id: c_int,
    ) -> *mut wlr_renderer,
>;

pub type wlr_backend_autocreate_t = unsafe extern "C" fn(
    display: *mut wl_display,
    create_renderer_func: wlr_renderer_create_func_t,
) -> *mut wlr_backend;
pub type wlr_backend_get_renderer_t = unsafe extern "C" fn(backend: *mut wlr_backend) -> *mut wlr_renderer;
pub type wlr_backend_start_t = unsafe extern "C" fn(backend: *mut wlr_backend) -> bool;
pub type wlr_backend_destroy_t = unsafe extern "C" fn(backend: *mut wlr_backend);
pub type wlr_backend_get_session_t = unsafe extern "C" fn(backend: *mut wlr_backend) -> *mut wlr_session;
pub type wlr_backend_get_drm_fd_t = unsafe extern "C" fn(backend: *mut wlr_backend) -> c_int;

pub const WLR_BACKEND_AUTOCREATE: &str = "wlr_backend_autocreate";
pub const WLR_BACKEND_GET_RENDERER: &str = "wlr_backend_get_renderer";
pub const WLR_BACKEND_START: &str = "wlr_backend_start";
pub const WLR_BACKEND_DESTROY: &str = "wlr_backend_destroy";
pub const WLR_BACKEND_GET_SESSION: &str = "wlr_backend_get_session";
pub const WLR_BACKEND_GET_DRM_FD: &str = "wlr_backend_get_drm_fd";
