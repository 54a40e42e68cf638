#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! # wlr-bootstrap: the first two calls of a wlroots compositor
//!
//! Before a compositor built on wlroots can do anything, it asks the library for a
//! backend (the library decides between a direct session, a nested Wayland or X11
//! window, and so on) and for the renderer that backend created. This crate provides
//! exactly that boundary, with handles that encode who owns what.
//!
//! ## Structure of the crate
//!
//! - [`backend`] contains [`Backend`](backend::Backend), which owns the native backend,
//!   and the borrowed [`RendererRef`](backend::RendererRef) and
//!   [`SessionRef`](backend::SessionRef) it hands out.
//! - [`library`] resolves libwlroots at runtime and defines the
//!   [`BackendLibrary`](library::BackendLibrary) trait every native call goes through.
//! - [`display`] wraps the compositor's `wl_display`.
//! - [`ffi`] declares the opaque native types.
//!
//! The native structures are never described on the Rust side, only passed around by
//! pointer. Their layout (including the flexible array members some of them end in)
//! stays the library's business.
//!
//! ## Logging
//!
//! This crate uses [`tracing`] for its internal logging. Native calls happen inside a
//! `backend_bootstrap` span, library loading inside a `wlroots_loader` span.
//!
//! ## Testing without wlroots
//!
//! With the `library_stub` feature, [`library::stub`] provides an in-memory
//! implementation of [`BackendLibrary`](library::BackendLibrary) that tracks every
//! backend it creates.

pub mod backend;
pub mod display;
pub mod ffi;
pub mod library;
