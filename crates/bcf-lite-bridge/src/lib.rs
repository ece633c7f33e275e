// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BCF-Lite Bridge
//!
//! Both ends of the host/companion message bridge:
//!
//! - [`HostBridge`] - runs inside the host, routes viewpoint messages onto
//!   the idle dispatcher and replies with generated viewpoints
//! - [`Companion`] - runs as `bcf-lite-bridge ipc <own> <peer>`, relaying
//!   envelopes between the host and the UI over stdin/stdout
//! - [`BridgeConfig`] - shared settings loaded from the user config directory
//!
//! ## Example
//!
//! ```rust,ignore
//! use bcf_lite_bridge::{BridgeConfig, HostBridge};
//! use bcf_lite_model::LogNotifier;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::load()?;
//! let bridge = HostBridge::start(companion_port, &config, Arc::new(LogNotifier))?;
//! spawn_companion(bridge.launch_args(companion_port));
//!
//! // on every host idle event:
//! bridge.on_idle(&mut document);
//! ```

pub mod companion;
pub mod config;
pub mod host;

pub use companion::{Companion, CompanionExit};
pub use config::{BridgeConfig, ConfigError};
pub use host::HostBridge;
