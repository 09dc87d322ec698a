//! WindowLocker service: responsibility and boundaries
//!
//! This module and its submodules own the lock state machine and its two
//! confinement strategies (direct pointer capture and the XFixes barrier
//! fence) plus the process classifier that chooses between them. It is the
//! ONLY writer of lock state and the only caller of blocking display-session
//! operations. Reading the hotkey belongs to the hotkey_listener service;
//! this module only observes the `requested` flag once per reconciliation
//! tick.

mod barrier_fence;
mod classifier;
mod locker;
mod pointer_capture;

pub use locker::WindowLocker;
