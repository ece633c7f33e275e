// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side message routing
//!
//! The server thread only decodes envelopes and queues work; everything that
//! touches the host document runs inside [`HostBridge::on_idle`].

use crate::BridgeConfig;
use bcf_lite_ipc::{
    Dispatcher, DispatcherHandle, Envelope, IpcClient, IpcServer, MessageType, TickOutcome,
};
use bcf_lite_model::{BridgeError, ErrorNotifier, HostDocument, SnapshotSource};
use bcf_lite_viewpoint::{
    apply_viewpoint, decode_viewpoint_envelope, encode_generated_payload, generate_viewpoint,
    ApplyOutcome, CodecOptions,
};
use std::sync::Arc;

const OPEN_VIEWPOINT_ERROR_TITLE: &str = "Error opening a viewpoint.";
const GENERATE_VIEWPOINT_ERROR_TITLE: &str = "Error generating a viewpoint.";
const INVALID_VIEW_TITLE: &str = "Invalid view";
const INVALID_VIEW_MESSAGE: &str = "Viewpoints can only be generated from 3D views.";

/// Host end of the bridge
pub struct HostBridge<H> {
    server: IpcServer,
    client: IpcClient,
    dispatcher: Dispatcher<H>,
}

impl<H> HostBridge<H>
where
    H: HostDocument + SnapshotSource + 'static,
{
    /// Bind the host server and connect to the companion on `companion_port`
    pub fn start(
        companion_port: u16,
        config: &BridgeConfig,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> bcf_lite_ipc::Result<Self> {
        let client = IpcClient::new(companion_port).with_connect_timeout(config.connect_timeout());
        let dispatcher = Dispatcher::new(config.dispatch_order, Arc::clone(&notifier));

        let router = Router {
            client: client.clone(),
            options: config.codec_options(),
            notifier,
            handle: dispatcher.handle(),
        };
        let server = IpcServer::bind(move |envelope| router.route(envelope))?;

        log::info!(
            "Host bridge on port {} talking to companion on port {}",
            server.port(),
            companion_port
        );

        Ok(Self {
            server,
            client,
            dispatcher,
        })
    }

    /// Port the host server listens on
    pub fn port(&self) -> u16 {
        self.server.port()
    }

    /// Arguments for launching the companion process
    pub fn launch_args(&self, companion_port: u16) -> Vec<String> {
        vec![
            "ipc".to_string(),
            companion_port.to_string(),
            self.port().to_string(),
        ]
    }

    /// Run at most one queued callback; call from the host's idle event
    pub fn on_idle(&self, host: &mut H) -> TickOutcome {
        self.dispatcher.on_idle(host)
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    pub fn send_open_settings(&self) {
        self.client.send(&Envelope::notification(MessageType::GoToSettings));
    }

    pub fn send_bring_to_foreground(&self) {
        self.client
            .send(&Envelope::notification(MessageType::SetBrowserToForeground));
    }

    /// Ask the companion to exit
    pub fn send_shutdown(&self) {
        self.client
            .send(&Envelope::notification(MessageType::CloseDesktopApplication));
    }

    /// Tell the companion to exit, stop the server and drop pending work
    pub fn shutdown(&mut self) {
        self.send_shutdown();
        self.server.shutdown();
        self.dispatcher.clear();
    }
}

struct Router<H> {
    client: IpcClient,
    options: CodecOptions,
    notifier: Arc<dyn ErrorNotifier>,
    handle: DispatcherHandle<H>,
}

impl<H> Clone for Router<H> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            options: self.options.clone(),
            notifier: Arc::clone(&self.notifier),
            handle: self.handle.clone(),
        }
    }
}

impl<H> Router<H>
where
    H: HostDocument + SnapshotSource + 'static,
{
    fn route(&self, envelope: Envelope) {
        log::debug!(
            "Received {} (tracking id {})",
            envelope.message_type,
            envelope.tracking_id
        );
        match envelope.message_type {
            MessageType::ViewpointData => {
                let router = self.clone();
                self.handle
                    .enqueue_with_title(OPEN_VIEWPOINT_ERROR_TITLE, move |host: &mut H| {
                        router.open_viewpoint(host, &envelope)
                    });
            }
            MessageType::ViewpointGenerationRequested => {
                let router = self.clone();
                self.handle
                    .enqueue_with_title(GENERATE_VIEWPOINT_ERROR_TITLE, move |host: &mut H| {
                        router.generate_viewpoint(host, &envelope)
                    });
            }
            other => log::warn!("Ignoring unsupported message type {}", other),
        }
    }

    fn open_viewpoint(&self, host: &mut H, envelope: &Envelope) -> Result<(), BridgeError> {
        let viewpoint = decode_viewpoint_envelope(envelope)?;
        match apply_viewpoint(host, &viewpoint, &self.options)? {
            ApplyOutcome::NoCamera => {}
            ApplyOutcome::Applied(applied) => {
                log::info!("Opened viewpoint in {}", applied.view);
                if let Some(zoom) = applied.zoom {
                    zoom.schedule(&self.handle);
                }
            }
        }
        Ok(())
    }

    fn generate_viewpoint(&self, host: &mut H, envelope: &Envelope) -> Result<(), BridgeError> {
        let viewpoint = match generate_viewpoint(&*host, &self.options) {
            Ok(viewpoint) => viewpoint,
            Err(BridgeError::NotThreeDView) => {
                self.notifier
                    .show_warning(INVALID_VIEW_TITLE, INVALID_VIEW_MESSAGE);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let payload = encode_generated_payload(&viewpoint)?;
        self.client
            .send(&envelope.reply(MessageType::ViewpointGenerated, payload));
        Ok(())
    }
}
