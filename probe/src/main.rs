use std::{os::unix::io::AsRawFd, path::PathBuf};

use clap::Parser;
use tracing::{error, info};
use wlr_bootstrap::{
    backend::Backend,
    library::{LibraryConfig, Wlroots},
};

mod display;

/// Create a wlroots backend the way a compositor would at startup and report what the
/// library picked.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// wlroots shared object to load, instead of the defaults or WLR_BOOTSTRAP_LIBRARY
    #[arg(short, long)]
    library: Option<PathBuf>,
    /// Also start the backend
    #[arg(short, long)]
    start: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().init();
    }

    let cli = Cli::parse();
    let config = match cli.library {
        Some(path) => LibraryConfig::with_library(path),
        None => LibraryConfig::from_env(),
    };

    let wlroots = Wlroots::load_with(&config)?;
    info!("Using {}", wlroots.path().display());

    let server = display::WaylandServer::load()?;
    let display = server.create_display()?;

    let Some(mut backend) = Backend::autocreate(&wlroots, display.handle()) else {
        error!("No suitable backend could be created");
        return Err("no suitable backend".into());
    };

    println!("backend:  {:p}", backend.as_ptr());
    match backend.renderer() {
        Some(renderer) => println!("renderer: {:p}", renderer.as_ptr()),
        None => println!("renderer: none"),
    }
    match backend.session() {
        Some(session) => println!("session:  {:p}", session.as_ptr()),
        None => println!("session:  none"),
    }
    match backend.drm_fd() {
        Some(fd) => println!("drm fd:   {}", fd.as_raw_fd()),
        None => println!("drm fd:   none"),
    }

    if cli.start {
        backend.start()?;
        println!("started");
    }

    Ok(())
}
