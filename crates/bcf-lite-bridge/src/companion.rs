// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Companion-side relay
//!
//! Envelopes from the host are written to the output as JSON lines.
//! Envelope lines read from the input are forwarded to the host.

use bcf_lite_ipc::{new_tracking_id, Envelope, IpcClient, IpcServer, MessageType};
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// Why [`Companion::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionExit {
    /// The host sent `CLOSE_DESKTOP_APPLICATION`
    CloseRequested,
    /// The input reached end of file
    InputClosed,
}

enum Event {
    Host(Envelope),
    Input(String),
    InputClosed,
}

pub struct Companion {
    server: IpcServer,
    client: IpcClient,
    events: Sender<Event>,
    inbox: Receiver<Event>,
}

impl Companion {
    /// Listen on `own_port` and forward to the host on `peer_port`
    pub fn bind(own_port: u16, peer_port: u16) -> bcf_lite_ipc::Result<Self> {
        let (events, inbox) = mpsc::channel();
        let from_host = events.clone();
        let server = IpcServer::bind_to(own_port, move |envelope| {
            // Receiver gone means run() already returned
            let _ = from_host.send(Event::Host(envelope));
        })?;

        Ok(Self {
            server,
            client: IpcClient::new(peer_port),
            events,
            inbox,
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_connect_timeout(timeout);
        self
    }

    pub fn port(&self) -> u16 {
        self.server.port()
    }

    /// Relay until the host asks to close or the input ends
    pub fn run<R, W>(&self, input: R, output: &mut W) -> bcf_lite_ipc::Result<CompanionExit>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let events = self.events.clone();
        thread::Builder::new()
            .name("bcf-companion-input".to_string())
            .spawn(move || read_input(input, events))?;

        while let Ok(event) = self.inbox.recv() {
            match event {
                Event::Host(envelope) => {
                    writeln!(output, "{}", envelope.to_json()?)?;
                    output.flush()?;
                    if envelope.message_type == MessageType::CloseDesktopApplication {
                        log::info!("Host requested shutdown");
                        return Ok(CompanionExit::CloseRequested);
                    }
                }
                Event::Input(line) => self.forward(&line),
                Event::InputClosed => {
                    log::info!("Input closed");
                    return Ok(CompanionExit::InputClosed);
                }
            }
        }
        Ok(CompanionExit::InputClosed)
    }

    fn forward(&self, line: &str) {
        match Envelope::from_json(line) {
            Ok(mut envelope) => {
                if envelope.tracking_id.is_empty() {
                    envelope.tracking_id = new_tracking_id();
                }
                self.client.send(&envelope);
            }
            Err(e) => log::warn!("Skipping input line: {}", e),
        }
    }
}

fn read_input<R: BufRead>(input: R, events: Sender<Event>) {
    for line in input.lines() {
        match line {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => {
                if events.send(Event::Input(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::warn!("Failed to read input: {}", e);
                break;
            }
        }
    }
    let _ = events.send(Event::InputClosed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    /// Reader that blocks until its sender is dropped, then reports EOF
    struct BlockingReader(Receiver<()>);

    impl Read for BlockingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_input_forwarded_with_tracking_id() {
        let (tx, rx) = mpsc::channel();
        let host = IpcServer::bind(move |envelope| {
            let _ = tx.send(envelope);
        })
        .unwrap();

        let companion = Companion::bind(0, host.port()).unwrap();
        let input = Cursor::new(b"{\"messageType\":\"GO_TO_SETTINGS\"}\n\n".to_vec());
        let mut output = Vec::new();

        let exit = companion.run(input, &mut output).unwrap();
        assert_eq!(exit, CompanionExit::InputClosed);
        assert!(output.is_empty());

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received.message_type, MessageType::GoToSettings);
        assert!(!received.tracking_id.is_empty());
    }

    #[test]
    fn test_close_request_ends_run() {
        let companion = Companion::bind(0, 1).unwrap();
        IpcClient::new(companion.port())
            .try_send(&Envelope::notification(MessageType::CloseDesktopApplication))
            .unwrap();

        let (hold, blocked) = mpsc::channel();
        let mut output = Vec::new();
        let exit = companion
            .run(BufReader::new(BlockingReader(blocked)), &mut output)
            .unwrap();
        drop(hold);

        assert_eq!(exit, CompanionExit::CloseRequested);
        let relayed = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = relayed.lines().collect();
        assert_eq!(lines.len(), 1);
        let envelope = Envelope::from_json(lines[0]).unwrap();
        assert_eq!(envelope.message_type, MessageType::CloseDesktopApplication);
        assert_eq!(envelope.tracking_id, "0");
    }
}
