//! [`Desktop`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation.

use super::events::{EventHub, Listener};
use super::{socket_path, workspace_id, workspace_index, HyprlandError};
use crate::model::{Bounds, HostEvent, Monitor, Signal, Window, WindowId};
use crate::traits::{Desktop, SubscriptionId};
use log::{debug, info};
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

/// Hyprland-backed desktop.
///
/// Queries open a short-lived IPC request each.  The event socket is
/// connected when the first subscriber arrives and closed again when the
/// last one leaves.
pub struct HyprlandDesktop {
    hub: Arc<EventHub>,
    listener: Mutex<Option<Listener>>,
}

impl Default for HyprlandDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl HyprlandDesktop {
    pub fn new() -> Self {
        Self {
            hub: Arc::new(EventHub::default()),
            listener: Mutex::new(None),
        }
    }

    fn listener(&self) -> MutexGuard<'_, Option<Listener>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connect the event socket unless a reader is already running.
    fn ensure_listener(&self) -> Result<(), HyprlandError> {
        let mut listener = self.listener();
        if listener.as_ref().is_some_and(Listener::is_running) {
            return Ok(());
        }
        if let Some(dead) = listener.take() {
            dead.stop();
        }
        let path = socket_path(".socket2.sock")?;
        let stream = UnixStream::connect(&path).map_err(|e| {
            HyprlandError(format!("event socket {} unreachable: {}", path.display(), e))
        })?;
        info!("listening for Hyprland events on {}", path.display());
        *listener = Some(Listener::spawn(stream, Arc::clone(&self.hub), workspace_owner)?);
        Ok(())
    }

    /// Close the event socket once nobody is subscribed any more.
    fn release_listener_if_idle(&self) {
        if !self.hub.is_empty() {
            return;
        }
        if let Some(listener) = self.listener().take() {
            info!("no subscribers left, closing the event socket");
            listener.stop();
        }
    }
}

impl Drop for HyprlandDesktop {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.stop();
        }
    }
}

//  Command socket

/// Send `command` to the Hyprland command socket and return the reply.
fn ipc_request(command: &str) -> Result<String, HyprlandError> {
    let failed = |step: &str, e: std::io::Error| {
        HyprlandError(format!("`{}`: {}: {}", command, step, e))
    };
    let path = socket_path(".socket.sock")?;
    let mut stream = UnixStream::connect(&path).map_err(|e| failed("command socket unreachable", e))?;
    stream
        .write_all(command.as_bytes())
        .map_err(|e| failed("send failed", e))?;
    let mut reply = String::new();
    stream
        .read_to_string(&mut reply)
        .map_err(|e| failed("reply unreadable", e))?;
    Ok(reply)
}

/// Run the JSON query `j/<query>` and decode the reply.
fn ipc_json<T: for<'de> Deserialize<'de>>(query: &str) -> Result<T, HyprlandError> {
    let reply = ipc_request(&format!("j/{}", query))?;
    serde_json::from_str(&reply)
        .map_err(|e| HyprlandError(format!("`j/{}`: unexpected reply: {}", query, e)))
}

/// Move `window` to Hyprland workspace `id` without following it.
fn move_silently(window: &WindowId, id: i64) -> Result<(), HyprlandError> {
    let command = format!("/dispatch movetoworkspacesilent {},address:{}", id, window);
    match ipc_request(&command)?.trim() {
        "ok" => Ok(()),
        reply => Err(HyprlandError(format!("`{}` refused: {}", command, reply))),
    }
}

/// Index of the monitor showing Hyprland workspace `id`.
///
/// Runs on the event thread; a failed lookup leaves the origin unknown.
fn workspace_owner(id: i64) -> Option<usize> {
    let lookup = ipc_json::<Vec<WorkspaceJson>>("workspaces").and_then(|workspaces| {
        let (_, monitor_ids) = index_monitors(ipc_json("monitors")?);
        Ok(owner_of(&workspaces, &monitor_ids, id))
    });
    match lookup {
        Ok(owner) => owner,
        Err(e) => {
            debug!("cannot tell which monitor shows workspace {}: {}", id, e);
            None
        }
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    id: i64,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
}

/// Subset of the JSON object returned by `j/workspaces` and
/// `j/activeworkspace`.  Client entries embed it without `monitorID`.
#[derive(Debug, Deserialize)]
struct WorkspaceJson {
    id: i64,
    #[serde(rename = "monitorID", default)]
    monitor_id: Option<i64>,
}

/// Subset of the JSON object returned by `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
    title: String,
    monitor: i64,
    workspace: WorkspaceJson,
}

/// Response of `j/cursorpos`.
#[derive(Debug, Deserialize)]
struct CursorJson {
    x: i32,
    y: i32,
}

/// Order monitors by Hyprland id and number them from 0.
///
/// Returns the monitors together with the Hyprland id of each index.
fn index_monitors(mut raw: Vec<MonitorJson>) -> (Vec<Monitor>, Vec<i64>) {
    raw.sort_by_key(|m| m.id);
    let ids = raw.iter().map(|m| m.id).collect();
    let monitors = raw
        .into_iter()
        .enumerate()
        .map(|(index, m)| Monitor::new(index, Bounds::new(m.x, m.y, m.width, m.height)))
        .collect();
    (monitors, ids)
}

/// Number of workspaces: the highest regular workspace id.
fn count_workspaces(raw: &[WorkspaceJson]) -> usize {
    raw.iter()
        .filter_map(|w| workspace_index(w.id))
        .map(|i| i + 1)
        .max()
        .unwrap_or(0)
}

/// Monitor index of Hyprland workspace `id`, from a `j/workspaces` reply.
fn owner_of(workspaces: &[WorkspaceJson], monitor_ids: &[i64], id: i64) -> Option<usize> {
    let monitor = workspaces.iter().find(|w| w.id == id)?.monitor_id?;
    monitor_ids.iter().position(|m| *m == monitor)
}

/// Clients on regular workspaces, with their monitor translated to an index.
fn windows_from(clients: Vec<ClientJson>, monitor_ids: &[i64]) -> Vec<Window> {
    clients
        .into_iter()
        .filter_map(|c| {
            let workspace = workspace_index(c.workspace.id)?;
            Some(Window {
                monitor: monitor_ids.iter().position(|id| *id == c.monitor),
                id: WindowId(c.address),
                title: c.title,
                workspace,
            })
        })
        .collect()
}

//  Desktop implementation

impl Desktop for HyprlandDesktop {
    type Error = HyprlandError;

    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error> {
        let (monitors, _) = index_monitors(ipc_json("monitors")?);
        Ok(monitors)
    }

    fn workspace_count(&self) -> Result<usize, Self::Error> {
        let workspaces: Vec<WorkspaceJson> = ipc_json("workspaces")?;
        Ok(count_workspaces(&workspaces))
    }

    fn active_workspace(&self) -> Result<usize, Self::Error> {
        let ws: WorkspaceJson = ipc_json("activeworkspace")?;
        workspace_index(ws.id)
            .ok_or_else(|| HyprlandError(format!("special workspace {} is active", ws.id)))
    }

    fn windows_on_workspace(&self, workspace: usize) -> Result<Vec<Window>, Self::Error> {
        let mut windows = self.windows()?;
        windows.retain(|w| w.workspace == workspace);
        Ok(windows)
    }

    fn windows(&self) -> Result<Vec<Window>, Self::Error> {
        let (_, monitor_ids) = index_monitors(ipc_json("monitors")?);
        let clients: Vec<ClientJson> = ipc_json("clients")?;
        Ok(windows_from(clients, &monitor_ids))
    }

    fn pointer(&self) -> Result<(i32, i32), Self::Error> {
        let cursor: CursorJson = ipc_json("cursorpos")?;
        Ok((cursor.x, cursor.y))
    }

    fn move_window(&self, window: &WindowId, workspace: usize) -> Result<(), Self::Error> {
        move_silently(window, workspace_id(workspace))
    }

    fn subscribe(
        &self,
        signal: Signal,
        sink: mpsc::Sender<HostEvent>,
    ) -> Result<SubscriptionId, Self::Error> {
        self.ensure_listener()?;
        let id = self.hub.add(signal, sink);
        info!("hyprland: {} subscribed as {}", signal, id);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), Self::Error> {
        self.hub.remove(id);
        self.release_listener_if_idle();
        Ok(())
    }
}
