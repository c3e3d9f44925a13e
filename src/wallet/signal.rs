// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-shot rendezvous between a wallet transport's connect event and the
//! tasks waiting for it.

use tokio::sync::watch;

/// Single-use async gate.
///
/// Any number of tasks may [`wait`](Signal::wait); all of them resume once
/// [`notify`](Signal::notify) fires. Notifying again is a no-op. A fulfilled
/// signal cannot be reset; construct a new one to restart the rendezvous.
#[derive(Debug)]
pub struct Signal {
    fired: watch::Sender<bool>,
}

impl Signal {
    pub fn new() -> Self {
        let (fired, _) = watch::channel(false);
        Self { fired }
    }

    /// Resolve once the signal has been notified. Returns immediately if it
    /// already was.
    pub async fn wait(&self) -> bool {
        let mut rx = self.fired.subscribe();
        // The sender lives in `self`, so the channel cannot close while borrowed.
        if rx.wait_for(|fired| *fired).await.is_err() {
            unreachable!("signal sender dropped while a waiter held a reference");
        }
        true
    }

    /// Fulfil the signal. Later calls have no additional effect.
    pub fn notify(&self) {
        let first = self.fired.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        });
        if first {
            tracing::debug!("Wallet signal fulfilled");
        }
    }

    pub fn is_notified(&self) -> bool {
        *self.fired.borrow()
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}
