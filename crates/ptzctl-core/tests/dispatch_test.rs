#![allow(clippy::unwrap_used)]
// Dispatch tests: connectivity preconditions, command-to-driver mapping,
// timeouts, and isolation between cameras.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ptzctl_api::{ImagingSettings, PtzVector};
use ptzctl_core::{
    CameraConfig, CameraId, CameraRegistry, Command, CommandResult, ConnectionState,
    ControlDispatcher, CoreError, DispatchSettings, RegistrySettings, parse_legacy,
    parse_structured,
};

use common::{CallLog, Handshake, MockConnector, MockDriver, camera};

async fn dispatcher(
    configs: Vec<CameraConfig>,
    connector: MockConnector,
    request_timeout: Duration,
) -> (ControlDispatcher<MockDriver>, CallLog) {
    let log = connector.log();
    let registry = Arc::new(CameraRegistry::initialize(
        configs,
        connector,
        RegistrySettings {
            connect_timeout: Duration::from_secs(30),
        },
    ));
    registry.wait_settled().await;
    let dispatcher = ControlDispatcher::new(registry, DispatchSettings { request_timeout });
    (dispatcher, log)
}

async fn single(connector: MockConnector) -> (ControlDispatcher<MockDriver>, CallLog) {
    dispatcher(vec![camera("main", "10.0.0.1")], connector, Duration::from_secs(10)).await
}

// ── Preconditions ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_camera_is_not_found() {
    let (dispatcher, log) = single(MockConnector::new()).await;

    for raw in [0, 2, 99] {
        let err = dispatcher
            .dispatch(CameraId::new(raw), Command::Stop)
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoreError::CameraNotFound { id } if id == CameraId::new(raw)),
            "got {err:?}"
        );
    }
    assert!(log.device_calls("10.0.0.1").is_empty());
}

#[tokio::test]
async fn test_connecting_camera_is_rejected_without_driver_calls() {
    let connector = MockConnector::new().handshake("10.0.0.1", Handshake::Hang);
    let log = connector.log();
    let registry = Arc::new(CameraRegistry::initialize(
        vec![camera("main", "10.0.0.1")],
        connector,
        RegistrySettings::default(),
    ));
    let dispatcher = ControlDispatcher::new(registry, DispatchSettings::default());

    let err = dispatcher
        .dispatch(CameraId::new(1), Command::Home)
        .await
        .unwrap_err();

    match err {
        CoreError::CameraNotConnected {
            id, state, reason, ..
        } => {
            assert_eq!(id, CameraId::new(1));
            assert_eq!(state, ConnectionState::Connecting);
            assert!(reason.is_none());
        }
        other => panic!("expected CameraNotConnected, got {other:?}"),
    }
    assert!(log.device_calls("10.0.0.1").is_empty());
}

#[tokio::test]
async fn test_failed_camera_is_rejected_with_reason() {
    let (dispatcher, log) =
        single(MockConnector::new().handshake("10.0.0.1", Handshake::Fail("bad password"))).await;

    for command in [Command::Stop, Command::GetStatus, Command::GetPresets] {
        let err = dispatcher
            .dispatch(CameraId::new(1), command)
            .await
            .unwrap_err();
        match err {
            CoreError::CameraNotConnected { state, reason, name, .. } => {
                assert_eq!(state, ConnectionState::Failed);
                assert_eq!(name, "main");
                assert!(reason.unwrap().contains("bad password"));
            }
            other => panic!("expected CameraNotConnected, got {other:?}"),
        }
    }
    assert!(log.device_calls("10.0.0.1").is_empty());
}

// ── Execution ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeated_stop_reaches_device_each_time() {
    let (dispatcher, log) = single(MockConnector::new()).await;

    for _ in 0..2 {
        let result = dispatcher
            .dispatch(CameraId::new(1), Command::Stop)
            .await
            .unwrap();
        assert_eq!(result, CommandResult::Ok);
    }
    assert_eq!(log.count("10.0.0.1", "stop"), 2);
}

#[tokio::test]
async fn test_each_command_maps_to_one_driver_call() {
    let (dispatcher, log) = single(MockConnector::new()).await;

    let cases = [
        (
            Command::Move {
                pan: 0.5,
                tilt: -0.5,
                zoom: 0.0,
            },
            "continuous_move",
            "0.5,-0.5,0",
        ),
        (Command::Stop, "stop", ""),
        (Command::Home, "goto_home", ""),
        (
            Command::GotoPreset {
                token: "3".into(),
                velocity: None,
            },
            "goto_preset",
            "3@default",
        ),
        (
            Command::GotoPreset {
                token: "3".into(),
                velocity: Some(PtzVector::new(1.0, 1.0, 0.5)),
            },
            "goto_preset",
            "3@1,1,0.5",
        ),
        (
            Command::SetPreset {
                token: "4".into(),
                name: "Altar".into(),
            },
            "set_preset",
            "4=Altar",
        ),
        (
            Command::RemovePreset { token: "4".into() },
            "remove_preset",
            "4",
        ),
        (Command::FocusMove { speed: -0.5 }, "focus_move", "-0.5"),
        (Command::FocusStop, "focus_stop", ""),
    ];

    for (command, op, args) in cases {
        let name = command.name();
        let result = dispatcher.dispatch(CameraId::new(1), command).await.unwrap();
        assert_eq!(result, CommandResult::Ok, "{name}");

        let last = log.device_calls("10.0.0.1").pop().unwrap();
        assert_eq!((last.op, last.args.as_str()), (op, args), "{name}");
    }
    assert_eq!(log.device_calls("10.0.0.1").len(), 9);
}

#[tokio::test]
async fn test_queries_return_device_data() {
    let (dispatcher, _log) = single(MockConnector::new()).await;
    let id = CameraId::new(1);

    let CommandResult::Status(status) = dispatcher.dispatch(id, Command::GetStatus).await.unwrap() else {
        panic!("expected status");
    };
    assert_eq!(status.position, Some(PtzVector::new(0.1, 0.2, 0.0)));

    let CommandResult::Presets(presets) = dispatcher.dispatch(id, Command::GetPresets).await.unwrap() else {
        panic!("expected presets");
    };
    let tokens: Vec<_> = presets.iter().map(|p| p.token.as_str()).collect();
    assert_eq!(tokens, ["1", "2", "10"]);

    let result = dispatcher.dispatch(id, Command::GetImaging).await.unwrap();
    assert_eq!(
        result,
        CommandResult::Imaging(ImagingSettings {
            brightness: Some(50.0),
            ..ImagingSettings::default()
        })
    );

    let result = dispatcher
        .dispatch(
            id,
            Command::SetImaging(ImagingSettings {
                sharpness: Some(10.0),
                ..ImagingSettings::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(result, CommandResult::Ok);
}

#[tokio::test]
async fn test_translated_commands_reach_the_driver() {
    let (dispatcher, log) = single(MockConnector::new()).await;
    let id = CameraId::new(1);

    dispatcher
        .dispatch(id, parse_legacy("ptzcmd&right&100").unwrap())
        .await
        .unwrap();
    dispatcher
        .dispatch(id, parse_legacy("ptzcmd&poscall&3").unwrap())
        .await
        .unwrap();
    dispatcher
        .dispatch(id, parse_structured("focus", [("speed", "0.25")]).unwrap())
        .await
        .unwrap();

    let calls: Vec<_> = log
        .device_calls("10.0.0.1")
        .into_iter()
        .map(|c| format!("{}({})", c.op, c.args))
        .collect();
    assert_eq!(
        calls,
        [
            "continuous_move(-5,0,0)",
            "goto_preset(2@default)",
            "focus_move(0.25)"
        ]
    );
}

#[tokio::test]
async fn test_driver_failure_is_surfaced() {
    let (dispatcher, log) = single(MockConnector::new().failing_ops("10.0.0.1")).await;

    let err = dispatcher
        .dispatch(CameraId::new(1), Command::Home)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Driver(ptzctl_api::Error::Fault { .. })
    ));
    assert!(!err.is_timeout());
    assert_eq!(log.count("10.0.0.1", "goto_home"), 1, "no retry");
}

// ── Timing ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_request_timeout_is_a_driver_timeout() {
    let (dispatcher, _log) = dispatcher(
        vec![camera("main", "10.0.0.1")],
        MockConnector::new().slow_ops("10.0.0.1", Duration::from_secs(60)),
        Duration::from_secs(2),
    )
    .await;

    let err = dispatcher
        .dispatch(CameraId::new(1), Command::Stop)
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "got {err:?}");
    assert!(matches!(
        err,
        CoreError::Driver(ptzctl_api::Error::Timeout { timeout_secs: 2 })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_camera_does_not_block_other_cameras() {
    let (dispatcher, log) = dispatcher(
        vec![camera("slow", "10.0.0.1"), camera("fast", "10.0.0.2")],
        MockConnector::new().slow_ops("10.0.0.1", Duration::from_secs(5)),
        Duration::from_secs(30),
    )
    .await;

    let slow = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.dispatch(CameraId::new(1), Command::Home).await })
    };
    tokio::task::yield_now().await;

    let started = tokio::time::Instant::now();
    dispatcher
        .dispatch(CameraId::new(2), Command::Home)
        .await
        .unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(!slow.is_finished());
    assert_eq!(log.count("10.0.0.1", "goto_home"), 1);

    slow.await.unwrap().unwrap();
}
