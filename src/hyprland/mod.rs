//! Hyprland-specific implementations.
//!
//! This module provides a concrete [`Desktop`](crate::traits::Desktop)
//! backed by Hyprland's IPC sockets: queries and window moves go through the
//! command socket, notifications are read from the event socket (`socket2`)
//! on a background thread.
//!
//! Workspace index `i` maps to Hyprland workspace id `i + 1`; special
//! (negative id) workspaces are never touched.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod desktop;
pub mod events;

use std::path::PathBuf;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

/// Build the path of a Hyprland socket.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/<name>`.
fn socket_path_in(runtime_dir: &str, instance_signature: &str, name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}/hypr/{}/{}",
        runtime_dir, instance_signature, name
    ))
}

/// Resolve a Hyprland socket path from the environment.
fn socket_path(name: &str) -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(socket_path_in(&runtime_dir, &his, name))
}

/// Workspace index of a Hyprland workspace id.  Special workspaces have
/// no index.
pub(crate) fn workspace_index(id: i64) -> Option<usize> {
    if id >= 1 {
        Some((id - 1) as usize)
    } else {
        None
    }
}

/// Hyprland workspace id of a workspace index.
pub(crate) fn workspace_id(index: usize) -> i64 {
    index as i64 + 1
}
