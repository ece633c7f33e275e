// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BCF-Lite IPC
//!
//! Cross-process plumbing between a BIM host and its companion UI:
//!
//! - [`Envelope`] / [`MessageType`] - the wire unit and its vocabulary
//! - [`IpcServer`] / [`IpcClient`] - loopback TCP, one JSON line per envelope
//! - [`Dispatcher`] - queue drained on host idle ticks, the only place where
//!   host state is mutated
//!
//! ## Example
//!
//! ```rust,ignore
//! use bcf_lite_ipc::{Dispatcher, DispatchOrder, IpcServer};
//!
//! let dispatcher: Dispatcher<MyHost> = Dispatcher::with_order(DispatchOrder::Lifo);
//! let handle = dispatcher.handle();
//! let server = IpcServer::bind(move |envelope| {
//!     handle.enqueue(move |host| host.route(envelope));
//! })?;
//!
//! // later, from the host's idle notification:
//! dispatcher.on_idle(&mut host);
//! ```

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod transport;

pub use dispatcher::{Callback, DispatchOrder, Dispatcher, DispatcherHandle, TickOutcome};
pub use envelope::{new_tracking_id, Envelope, MessageType, NOTIFICATION_TRACKING_ID};
pub use error::{Result, TransportError};
pub use transport::{free_port, EnvelopeHandler, IpcClient, IpcServer, DEFAULT_CONNECT_TIMEOUT};
