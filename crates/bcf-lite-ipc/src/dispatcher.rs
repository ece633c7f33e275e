// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Idle-synchronized dispatcher
//!
//! Transport threads may only enqueue work. The work runs when the host
//! calls [`Dispatcher::on_idle`] with its context, at most one callback per
//! tick, outside the queue lock. A callback that fails or panics is logged
//! and reported through the [`ErrorNotifier`]; the next tick carries on.

use bcf_lite_model::{BridgeError, ErrorNotifier, LogNotifier};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Work item run against the host context `C`
pub type Callback<C> = Box<dyn FnOnce(&mut C) -> Result<(), BridgeError> + Send>;

const DEFAULT_ERROR_TITLE: &str = "Error processing a request.";

/// Order in which queued callbacks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOrder {
    /// Most recently queued first
    #[default]
    Lifo,
    /// Oldest first
    Fifo,
}

/// Result of one idle tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was queued
    Idle,
    /// One callback ran to completion
    Ran,
    /// One callback returned an error or panicked
    Failed,
}

struct Queued<C> {
    error_title: String,
    callback: Callback<C>,
}

struct Queue<C> {
    items: Mutex<VecDeque<Queued<C>>>,
    order: DispatchOrder,
}

impl<C> Queue<C> {
    fn push(&self, item: Queued<C>) {
        self.items.lock().push_back(item);
    }

    fn pop(&self) -> Option<Queued<C>> {
        let mut items = self.items.lock();
        match self.order {
            DispatchOrder::Lifo => items.pop_back(),
            DispatchOrder::Fifo => items.pop_front(),
        }
    }
}

/// Cloneable enqueue-only handle for transport threads
pub struct DispatcherHandle<C> {
    queue: Arc<Queue<C>>,
}

impl<C> Clone for DispatcherHandle<C> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<C> DispatcherHandle<C> {
    /// Queue a callback
    pub fn enqueue<F>(&self, callback: F)
    where
        F: FnOnce(&mut C) -> Result<(), BridgeError> + Send + 'static,
    {
        self.enqueue_with_title(DEFAULT_ERROR_TITLE, callback);
    }

    /// Queue a callback with the title shown if it fails
    pub fn enqueue_with_title<F>(&self, error_title: impl Into<String>, callback: F)
    where
        F: FnOnce(&mut C) -> Result<(), BridgeError> + Send + 'static,
    {
        self.queue.push(Queued {
            error_title: error_title.into(),
            callback: Box::new(callback),
        });
    }

    /// Number of queued callbacks
    pub fn len(&self) -> usize {
        self.queue.items.lock().len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-threaded executor drained by host idle ticks
pub struct Dispatcher<C> {
    handle: DispatcherHandle<C>,
    notifier: Arc<dyn ErrorNotifier>,
}

impl<C> Dispatcher<C> {
    /// Create a dispatcher reporting failures through `notifier`
    pub fn new(order: DispatchOrder, notifier: Arc<dyn ErrorNotifier>) -> Self {
        Self {
            handle: DispatcherHandle {
                queue: Arc::new(Queue {
                    items: Mutex::new(VecDeque::new()),
                    order,
                }),
            },
            notifier,
        }
    }

    /// Create a dispatcher that only logs failures
    pub fn with_order(order: DispatchOrder) -> Self {
        Self::new(order, Arc::new(LogNotifier))
    }

    /// Enqueue-only handle for other threads
    pub fn handle(&self) -> DispatcherHandle<C> {
        self.handle.clone()
    }

    /// Dispatch order
    pub fn order(&self) -> DispatchOrder {
        self.handle.queue.order
    }

    /// Queue a callback
    pub fn enqueue<F>(&self, callback: F)
    where
        F: FnOnce(&mut C) -> Result<(), BridgeError> + Send + 'static,
    {
        self.handle.enqueue(callback);
    }

    /// Queue a callback with the title shown if it fails
    pub fn enqueue_with_title<F>(&self, error_title: impl Into<String>, callback: F)
    where
        F: FnOnce(&mut C) -> Result<(), BridgeError> + Send + 'static,
    {
        self.handle.enqueue_with_title(error_title, callback);
    }

    /// Number of queued callbacks
    pub fn len(&self) -> usize {
        self.handle.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    /// Drop every queued callback without running it
    pub fn clear(&self) {
        let dropped = {
            let mut items = self.handle.queue.items.lock();
            let n = items.len();
            items.clear();
            n
        };
        if dropped > 0 {
            log::debug!("Dropped {} queued callbacks", dropped);
        }
    }

    /// Run at most one queued callback against the host context
    ///
    /// Must be called from the host's idle notification, the only place
    /// where mutating `context` is safe.
    pub fn on_idle(&self, context: &mut C) -> TickOutcome {
        let Some(Queued {
            error_title,
            callback,
        }) = self.handle.queue.pop()
        else {
            return TickOutcome::Idle;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| callback(context))) {
            Ok(Ok(())) => TickOutcome::Ran,
            Ok(Err(e)) => {
                log::error!("{} {}", error_title, e);
                self.notifier.show_error(&error_title, &e.to_string());
                TickOutcome::Failed
            }
            Err(payload) => {
                let message = PanicMessage(payload.as_ref()).to_string();
                log::error!("{} Callback panicked: {}", error_title, message);
                self.notifier.show_error(&error_title, &message);
                TickOutcome::Failed
            }
        }
    }

    /// Run ticks until the queue is empty, returning how many failed
    pub fn drain(&self, context: &mut C) -> usize {
        let mut failed = 0;
        loop {
            match self.on_idle(context) {
                TickOutcome::Idle => return failed,
                TickOutcome::Failed => failed += 1,
                TickOutcome::Ran => {}
            }
        }
    }
}

struct PanicMessage<'a>(&'a (dyn Any + Send));

impl fmt::Display for PanicMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<&str>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else {
            f.write_str("unknown panic")
        }
    }
}
