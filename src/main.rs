//! Entry point for the **monsync** daemon.
//!
//! Connects to Hyprland, activates the synchronization controller and
//! processes host events on the main thread until the engine shuts down.

use log::{error, info, warn};
use monsync::config::Config;
use monsync::hyprland::desktop::HyprlandDesktop;
use monsync::lifecycle::Controller;
use std::path::PathBuf;

/// `$XDG_CONFIG_HOME/monsync/config.json`, or `~/.config/monsync/config.json`
/// when `XDG_CONFIG_HOME` is unset or relative.
fn config_path() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|dir| dir.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("monsync")
        .join("config.json")
}

/// Load the timings, falling back to the defaults when the file is absent
/// or unusable.
fn load_config() -> Config {
    let path = config_path();
    match Config::load(&path) {
        Ok(cfg) => {
            info!("using timings from {}", path.display());
            cfg
        }
        Err(e) if e.is_missing() => {
            info!("{} not found, using default timings", path.display());
            Config::default()
        }
        Err(e) => {
            warn!("{}, using default timings", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    let mut controller = Controller::new(HyprlandDesktop::new(), config.sync);

    if let Err(e) = controller.activate() {
        error!("failed to activate: {}", e);
        std::process::exit(1);
    }

    controller.run();
    controller.deactivate();
    info!("engine stopped, exiting");
}
