//! **monsync** — per-monitor workspaces on a desktop with one shared
//! workspace sequence.
//!
//! The host desktop has a single workspace sequence that every monitor
//! switches in unison.  monsync makes the monitor under the pointer behave
//! as if it had its own sequence: the windows of every *other* monitor are
//! carried along when the active workspace changes, so those monitors keep
//! showing the same content.
//!
//! # Architecture
//!
//! * [`traits::Desktop`] abstracts every query and command the engine needs
//!   from the host, so the synchronization logic is not coupled to any
//!   specific compositor.
//! * [`engine::SyncEngine`] is the single-threaded state machine.  It is
//!   driven by [`model::HostEvent`]s and by an explicit clock; timed work is
//!   queued on a cancellable [`scheduler::Scheduler`].
//! * [`lifecycle::Controller`] owns a desktop and an engine, holds the host
//!   subscriptions, and runs the blocking event loop.
//!
//! The concrete host implementation lives in [`hyprland`].

pub mod config;
pub mod engine;
pub mod focus;
pub mod hyprland;
pub mod ledger;
pub mod lifecycle;
pub mod model;
pub mod placement;
pub mod scheduler;
pub mod topology;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
