//! Translates Hyprland's event socket into [`HostEvent`]s.
//!
//! Hyprland emits one line per event on its event socket (`socket2`) in the
//! `EVENT>>DATA\n` format.  The events monsync cares about are:
//!
//! | Event                | Payload        | Becomes                        |
//! |----------------------|----------------|--------------------------------|
//! | `workspacev2`        | `<id>,<name>`  | active-workspace-changed       |
//! | `focusedmon`         | `<mon>,<ws>`   | focus moved (incidental)       |
//! | `monitoradded`       | `<name>`       | monitors-changed               |
//! | `monitorremoved`     | `<name>`       | monitors-changed               |
//! | `createworkspacev2`  | `<id>,<name>`  | workspace-added                |
//! | `destroyworkspacev2` | `<id>,<name>`  | workspace-removed              |
//!
//! Hyprland also emits v1/v2 twins of most events; only one of each pair is
//! translated so a change is reported once.
//!
//! Every Hyprland workspace lives on one monitor, so a workspace switch
//! carries the monitor owning the new workspace.  Focusing another monitor
//! makes that monitor's workspace active without a switch; Hyprland
//! announces it with `focusedmon`, which the engine treats as incidental.
//!
//! The [`EventHub`] fans translated events out to every subscriber of the
//! matching [`Signal`].  A [`Listener`] owns the reader thread.

use super::{workspace_index, HyprlandError};
use crate::model::{HostEvent, Signal};
use crate::traits::SubscriptionId;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA\n`.
pub(crate) fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// Hyprland workspace id from a `<id>,<name>` payload.
fn workspace_id_from(data: &str) -> Option<i64> {
    data.split(',').next()?.trim().parse().ok()
}

/// Map one socket2 event to a [`HostEvent`], if it is one we care about.
///
/// `owner` resolves a Hyprland workspace id to the index of the monitor
/// showing it.
pub(crate) fn translate(
    event: &str,
    data: &str,
    owner: impl Fn(i64) -> Option<usize>,
) -> Option<HostEvent> {
    match event {
        "workspacev2" => {
            let id = workspace_id_from(data)?;
            // Switching to a special workspace is not a switch in the
            // shared sequence.
            workspace_index(id)?;
            Some(HostEvent::ActiveWorkspaceChanged { monitor: owner(id) })
        }
        "focusedmon" => Some(HostEvent::FocusMoved),
        "monitoradded" | "monitorremoved" => Some(HostEvent::MonitorsChanged),
        "createworkspacev2" => workspace_id_from(data)
            .and_then(workspace_index)
            .map(|index| HostEvent::WorkspaceAdded { index }),
        "destroyworkspacev2" => workspace_id_from(data)
            .and_then(workspace_index)
            .map(|index| HostEvent::WorkspaceRemoved { index }),
        _ => None,
    }
}

/// A subscriber registered through [`Desktop::subscribe`](crate::traits::Desktop::subscribe).
#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    signal: Signal,
    sink: mpsc::Sender<HostEvent>,
}

/// Subscribers shared between the desktop and the listener thread.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventHub {
    /// Register `sink` for `signal`.
    pub fn add(&self, signal: Signal, sink: mpsc::Sender<HostEvent>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().push(Subscriber { id, signal, sink });
        id
    }

    /// Forget a subscriber.  Unknown ids are ignored.
    pub fn remove(&self, id: SubscriptionId) {
        self.lock().retain(|s| s.id != id);
    }

    /// Deliver `event` to every subscriber of its signal and return how
    /// many received it.  Subscribers whose receiver is gone are dropped.
    pub fn publish(&self, event: &HostEvent) -> usize {
        let signal = event.signal();
        let mut delivered = 0;
        self.lock().retain(|s| {
            if s.signal != signal {
                return true;
            }
            match s.sink.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    debug!("dropping closed subscriber {}", s.id);
                    false
                }
            }
        });
        delivered
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The socket2 reader thread.
///
/// Dropping the handle without [`stop`](Listener::stop) leaves the thread
/// reading until Hyprland closes the socket.
#[derive(Debug)]
pub struct Listener {
    stream: UnixStream,
    thread: JoinHandle<()>,
}

impl Listener {
    /// Read events from `stream` on a new thread and publish them to `hub`.
    pub fn spawn<F>(stream: UnixStream, hub: Arc<EventHub>, owner: F) -> Result<Self, HyprlandError>
    where
        F: Fn(i64) -> Option<usize> + Send + 'static,
    {
        let reader = stream
            .try_clone()
            .map_err(|e| HyprlandError(format!("cannot share the event socket: {}", e)))?;
        let thread = std::thread::spawn(move || {
            if let Err(e) = read_events(reader, &hub, owner) {
                warn!("event listener stopped: {}", e);
            }
        });
        Ok(Self { stream, thread })
    }

    /// Whether the reader thread is still running.
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Close the socket and wait for the reader thread to exit.
    pub fn stop(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("event socket already closed: {}", e);
        }
        if self.thread.join().is_err() {
            warn!("event listener panicked");
        }
    }
}

/// Publish every translated line read from `stream` until it closes.
fn read_events<F>(stream: UnixStream, hub: &EventHub, owner: F) -> Result<(), HyprlandError>
where
    F: Fn(i64) -> Option<usize>,
{
    for line in BufReader::new(stream).lines() {
        let line = line.map_err(|e| HyprlandError(format!("event socket read failed: {}", e)))?;
        let Some((event, data)) = parse_event_line(&line) else {
            continue;
        };
        if let Some(host_event) = translate(event, data, &owner) {
            debug!("{} -> {:?}", line, host_event);
            hub.publish(&host_event);
        }
    }
    info!("event socket closed");
    Ok(())
}
