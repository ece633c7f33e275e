// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host bridge against an in-memory host and a fake companion

use approx::assert_relative_eq;
use bcf_lite_bridge::{BridgeConfig, HostBridge};
use bcf_lite_ipc::{Envelope, IpcClient, IpcServer, MessageType, TickOutcome};
use bcf_lite_model::{
    ElementId, ElementSource, ErrorNotifier, Point3, Vector3, ViewId, ViewReader, ViewState,
    ZoomCorners,
};
use bcf_lite_viewpoint::testing::MemoryHost;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct RecordingNotifier {
    warnings: Mutex<Vec<(String, String)>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl ErrorNotifier for RecordingNotifier {
    fn show_warning(&self, title: &str, message: &str) {
        self.warnings.lock().push((title.to_string(), message.to_string()));
    }

    fn show_error(&self, title: &str, message: &str) {
        self.errors.lock().push((title.to_string(), message.to_string()));
    }
}

struct Fixture {
    bridge: HostBridge<MemoryHost>,
    notifier: Arc<RecordingNotifier>,
    companion: IpcServer,
    from_host: Receiver<Envelope>,
}

impl Fixture {
    fn start() -> Self {
        let (tx, from_host) = mpsc::channel();
        let companion = IpcServer::bind(move |envelope| {
            let _ = tx.send(envelope);
        })
        .unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let bridge = HostBridge::start(
            companion.port(),
            &BridgeConfig::default(),
            Arc::clone(&notifier) as Arc<dyn ErrorNotifier>,
        )
        .unwrap();

        Self {
            bridge,
            notifier,
            companion,
            from_host,
        }
    }

    fn send_to_host(&self, envelope: &Envelope) {
        IpcClient::new(self.bridge.port()).try_send(envelope).unwrap();
    }

    fn wait_for_work(&self) {
        let deadline = Instant::now() + TIMEOUT;
        while self.bridge.dispatcher().is_empty() {
            assert!(Instant::now() < deadline, "nothing was queued");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn next_from_host(&self) -> Envelope {
        self.from_host.recv_timeout(TIMEOUT).unwrap()
    }
}

fn document() -> MemoryHost {
    let mut host = MemoryHost::new()
        .with_unit_scale(1.0)
        .with_snapshot(vec![0x89, b'P', b'N', b'G']);
    host.add_element(ElementId(1), Some("guid-1"));
    host.add_element(ElementId(2), Some("guid-2"));
    let view = host.add_view(ViewState {
        id: ViewId(100),
        name: "{3D}".to_string(),
        is_3d: true,
        is_perspective: false,
        origin: Point3::new(0.0, 0.0, 10.0),
        view_direction: Vector3::z(),
        up_direction: Vector3::y(),
        right_direction: Vector3::x(),
        zoom_corners: Some(ZoomCorners {
            bottom_left: Point3::new(-4.0, -3.0, 0.0),
            top_right: Point3::new(4.0, 3.0, 0.0),
        }),
        section_box: None,
    });
    host.set_active(view);
    host
}

const ORTHOGONAL_VIEWPOINT: &str = r#"{
    "orthogonal_camera": {
        "camera_view_point": {"x": 2.0, "y": 3.0, "z": 10.0},
        "camera_direction": {"x": 0.0, "y": 0.0, "z": -1.0},
        "camera_up_vector": {"x": 0.0, "y": 1.0, "z": 0.0},
        "view_to_world_scale": 4.0
    },
    "components": {
        "selection": [{"ifc_guid": "guid-2"}],
        "visibility": {"default_visibility": true, "exceptions": [{"ifc_guid": "guid-1"}]}
    }
}"#;

#[test]
fn generation_request_is_answered_with_same_tracking_id() {
    let fixture = Fixture::start();
    let mut host = document();

    let request = Envelope::request(MessageType::ViewpointGenerationRequested, "");
    fixture.send_to_host(&request);
    fixture.wait_for_work();
    assert_eq!(fixture.bridge.on_idle(&mut host), TickOutcome::Ran);

    let reply = fixture.next_from_host();
    assert_eq!(reply.message_type, MessageType::ViewpointGenerated);
    assert_eq!(reply.tracking_id, request.tracking_id);

    let payload: serde_json::Value = serde_json::from_str(&reply.message_payload).unwrap();
    assert!(payload.get("orthogonal_camera").is_some());
    assert_eq!(payload["snapshot"], "data:image/png;base64,iVBORw==");
}

#[test]
fn viewpoint_is_applied_and_zoomed_on_next_tick() {
    let fixture = Fixture::start();
    let mut host = document();

    fixture.send_to_host(&Envelope::request(
        MessageType::ViewpointData,
        ORTHOGONAL_VIEWPOINT,
    ));
    fixture.wait_for_work();
    assert_eq!(fixture.bridge.on_idle(&mut host), TickOutcome::Ran);

    let active = host.active_view().unwrap();
    assert_eq!(active.name, "BCF Orthogonal");
    assert_relative_eq!(active.origin, Point3::new(2.0, 3.0, 10.0), epsilon = 1e-9);
    assert_eq!(host.selection(), vec![ElementId(2)]);
    assert_eq!(host.visible_elements(active.id).unwrap(), vec![ElementId(2)]);

    // Zoom correction was queued by the first callback
    assert_eq!(fixture.bridge.dispatcher().len(), 1);
    assert_eq!(fixture.bridge.on_idle(&mut host), TickOutcome::Ran);

    let corners = host.view_state(active.id).unwrap().zoom_corners.unwrap();
    assert_relative_eq!(corners.bottom_left, Point3::new(-2.0, 1.0, 10.0), epsilon = 1e-9);
    assert_relative_eq!(corners.top_right, Point3::new(6.0, 5.0, 10.0), epsilon = 1e-9);
    assert!(fixture.notifier.errors.lock().is_empty());
}

#[test]
fn generation_from_plan_view_warns() {
    let fixture = Fixture::start();
    let mut host = document();
    host.update_view(ViewId(100), |v| v.is_3d = false);

    fixture.send_to_host(&Envelope::request(
        MessageType::ViewpointGenerationRequested,
        "",
    ));
    fixture.wait_for_work();
    assert_eq!(fixture.bridge.on_idle(&mut host), TickOutcome::Ran);

    let warnings = fixture.notifier.warnings.lock();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, "Invalid view");
    assert!(fixture.notifier.errors.lock().is_empty());
    assert!(fixture
        .from_host
        .recv_timeout(Duration::from_millis(200))
        .is_err());
}

#[test]
fn malformed_viewpoint_is_reported() {
    let fixture = Fixture::start();
    let mut host = document();

    fixture.send_to_host(&Envelope::request(MessageType::ViewpointData, "not json"));
    fixture.wait_for_work();
    assert_eq!(fixture.bridge.on_idle(&mut host), TickOutcome::Failed);

    let errors = fixture.notifier.errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "Error opening a viewpoint.");
    assert_eq!(host.active_view().unwrap().id, ViewId(100));
}

#[test]
fn viewpoint_without_camera_changes_nothing() {
    let fixture = Fixture::start();
    let mut host = document();

    fixture.send_to_host(&Envelope::request(MessageType::ViewpointData, "{}"));
    fixture.wait_for_work();
    assert_eq!(fixture.bridge.on_idle(&mut host), TickOutcome::Ran);

    assert!(host.calls().is_empty());
    assert!(fixture.bridge.dispatcher().is_empty());
}

#[test]
fn unsupported_messages_queue_nothing() {
    let fixture = Fixture::start();

    fixture.send_to_host(&Envelope::request(MessageType::AllInstancesRequested, ""));
    thread::sleep(Duration::from_millis(200));

    assert!(fixture.bridge.dispatcher().is_empty());
}

#[test]
fn notifications_use_tracking_id_zero() {
    let mut fixture = Fixture::start();

    fixture.bridge.send_open_settings();
    let settings = fixture.next_from_host();
    assert_eq!(settings.message_type, MessageType::GoToSettings);
    assert_eq!(settings.tracking_id, "0");

    fixture.bridge.send_bring_to_foreground();
    let foreground = fixture.next_from_host();
    assert_eq!(foreground.message_type, MessageType::SetBrowserToForeground);
    assert_eq!(foreground.tracking_id, "0");

    fixture.bridge.shutdown();
    let close = fixture.next_from_host();
    assert_eq!(close.message_type, MessageType::CloseDesktopApplication);
    assert_eq!(close.tracking_id, "0");
}

#[test]
fn launch_args_name_both_ports() {
    let fixture = Fixture::start();
    let args = fixture.bridge.launch_args(fixture.companion.port());

    assert_eq!(
        args,
        vec![
            "ipc".to_string(),
            fixture.companion.port().to_string(),
            fixture.bridge.port().to_string(),
        ]
    );
}
