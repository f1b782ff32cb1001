mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::{Loopback, RecordingAuthenticator, TestController, WAIT};
use pokeagent_client::{EngineConfig, EngineError, EnginePhase, ProtocolEngine};

async fn connected(
    config: EngineConfig,
    authenticator: RecordingAuthenticator,
) -> ProtocolEngine<RecordingAuthenticator> {
    let mut engine = ProtocolEngine::with_authenticator(config, authenticator).unwrap();
    engine.connect().await.unwrap();
    assert_eq!(engine.phase(), EnginePhase::Connected);
    engine
}

#[tokio::test]
async fn test_missing_authentication_address_is_fatal() {
    let config = EngineConfig::new("alice", "secret", "127.0.0.1:1");

    let result = ProtocolEngine::new(config);

    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[tokio::test]
async fn test_empty_username_is_fatal() {
    let config = EngineConfig::new(" ", "secret", "127.0.0.1:1")
        .with_authentication_address("http://127.0.0.1:9/action.php");

    let result = ProtocolEngine::new(config);

    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[tokio::test]
async fn test_challstr_runs_login_handshake() {
    let mut server = Loopback::start().await;
    let auth = RecordingAuthenticator::accepting("X");
    let mut engine = connected(server.config("alice"), auth.clone()).await;
    let mut controller = TestController::default();

    let driver = async {
        server.push("|challstr|A|B");
        let frame = server.next_frame().await;
        let rest = server.drain().await;
        server.close();
        (frame, rest)
    };
    let (result, (frame, rest)) = tokio::join!(engine.run(&mut controller), driver);

    assert!(matches!(result, Err(EngineError::ConnectionClosed)));
    assert_eq!(auth.calls(), vec!["A|B".to_string()]);
    assert_eq!(frame, "|/trn alice,0,X");
    assert!(frame.ends_with(",0,X"));
    assert!(rest.is_empty(), "unexpected frames: {:?}", rest);
    assert_eq!(engine.phase(), EnginePhase::Terminated);
}

#[tokio::test]
async fn test_handshake_selects_avatar() {
    let mut server = Loopback::start().await;
    let config = server.config("alice").with_avatar("42");
    let mut engine = connected(config, RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController::default();

    let driver = async {
        server.push("|challstr|A|B");
        let frames = vec![server.next_frame().await, server.next_frame().await];
        server.close();
        frames
    };
    let (_, frames) = tokio::join!(engine.run(&mut controller), driver);

    assert_eq!(frames, vec!["|/trn alice,0,X", "|/avatar 42"]);
}

#[tokio::test]
async fn test_rejected_login_ends_receive_loop() {
    let server = Loopback::start().await;
    let auth = RecordingAuthenticator::rejecting("Wrong password.");
    let mut engine = connected(server.config("alice"), auth).await;
    let mut controller = TestController::default();

    server.push("|challstr|A|B");
    let result = tokio::time::timeout(WAIT, engine.run(&mut controller))
        .await
        .unwrap();

    assert!(matches!(result, Err(EngineError::LoginRejected(_))));
    assert!(!engine.is_logged_in());
    assert_eq!(engine.phase(), EnginePhase::Terminated);
}

#[tokio::test]
async fn test_updateuser_confirms_login() {
    let server = Loopback::start().await;
    let mut engine =
        connected(server.config("Alice Bot"), RecordingAuthenticator::accepting("X")).await;
    let handle = engine.handle();
    let mut controller = TestController {
        stop_after_login: true,
        ..Default::default()
    };

    server.push("|updateuser| Guest 4421|0|1|{}");
    server.push("|someunknown|data");
    server.push("|updateuser| Alice Bot|1|102|{}");
    let result = tokio::time::timeout(WAIT, engine.run(&mut controller))
        .await
        .unwrap();

    assert!(result.is_ok());
    assert!(handle.is_logged_in());
    assert_eq!(controller.logged_in_as.as_deref(), Some("Alice Bot"));
}

#[tokio::test]
async fn test_accepts_challenge_in_configured_format() {
    let mut server = Loopback::start().await;
    let config = server.config("alice").with_format("fmt1");
    let mut engine = connected(config, RecordingAuthenticator::accepting("X")).await;
    let handle = engine.handle();
    let mut controller = TestController::default();

    let driver = async {
        server.push(r#"|updatechallenges|{"challengesFrom":{"bob":"fmt1"},"challengeTo":null}"#);
        let frames = server.drain().await;
        let waiting = handle.is_waiting_to_start();
        server.close();
        (frames, waiting)
    };
    let (_, (frames, waiting)) = tokio::join!(engine.run(&mut controller), driver);

    assert_eq!(frames, vec!["|/accept bob"]);
    assert!(waiting);
}

#[tokio::test]
async fn test_ignores_challenge_in_other_format() {
    let mut server = Loopback::start().await;
    let config = server.config("alice").with_format("fmt2");
    let mut engine = connected(config, RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController::default();

    let driver = async {
        server.push(r#"|updatechallenges|{"challengesFrom":{"bob":"fmt1"},"challengeTo":null}"#);
        let frames = server.drain().await;
        server.close();
        frames
    };
    let (_, frames) = tokio::join!(engine.run(&mut controller), driver);

    assert!(frames.is_empty(), "unexpected frames: {:?}", frames);
    assert!(!engine.is_waiting_to_start());
}

#[tokio::test]
async fn test_controller_can_refuse_challenges() {
    let mut server = Loopback::start().await;
    let config = server.config("alice").with_format("fmt1");
    let mut engine = connected(config, RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController {
        refuse_challenges: true,
        ..Default::default()
    };

    let driver = async {
        server.push(r#"|updatechallenges|{"challengesFrom":{"bob":"fmt1"}}"#);
        let frames = server.drain().await;
        server.close();
        frames
    };
    let (_, frames) = tokio::join!(engine.run(&mut controller), driver);

    assert!(frames.is_empty());
    assert!(!engine.is_waiting_to_start());
}

#[tokio::test]
async fn test_malformed_challenges_are_skipped() {
    let mut server = Loopback::start().await;
    let config = server.config("alice").with_format("fmt1");
    let mut engine = connected(config, RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController::default();

    let driver = async {
        server.push("|updatechallenges|{broken");
        server.push(r#"|updatechallenges|{"challengesFrom":{"carol":"fmt1"}}"#);
        let frames = server.drain().await;
        server.close();
        frames
    };
    let (result, frames) = tokio::join!(engine.run(&mut controller), driver);

    assert!(matches!(result, Err(EngineError::ConnectionClosed)));
    assert_eq!(frames, vec!["|/accept carol"]);
}

#[tokio::test]
async fn test_battle_frames_are_forwarded_verbatim() {
    let server = Loopback::start().await;
    let config = server.config("alice").with_format("fmt1");
    let mut engine = connected(config, RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController {
        stop_after_battle_messages: Some(2),
        ..Default::default()
    };

    let first = ">battle-fmt1-1\n|init|battle\n|title|alice vs. bob";
    let second = ">battle-fmt1-1\n|turn|1";
    server.push(r#"|updatechallenges|{"challengesFrom":{"bob":"fmt1"}}"#);
    server.push(first);
    server.push(second);
    let result = tokio::time::timeout(WAIT, engine.run(&mut controller))
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(controller.sessions, vec!["battle-fmt1-1"]);
    assert_eq!(
        controller.battle_messages,
        vec![
            ("battle-fmt1-1".to_string(), first.to_string()),
            ("battle-fmt1-1".to_string(), second.to_string()),
        ]
    );
    assert!(!engine.is_waiting_to_start());
}

#[tokio::test]
async fn test_battle_frame_with_malformed_line_is_forwarded() {
    let server = Loopback::start().await;
    let mut engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController {
        stop_after_battle_messages: Some(1),
        ..Default::default()
    };

    let frame = ">battle-fmt1-1\n|init|battle\n|popup\n|turn|1";
    server.push(frame);
    let result = tokio::time::timeout(WAIT, engine.run(&mut controller))
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(controller.sessions, vec!["battle-fmt1-1"]);
    assert_eq!(
        controller.battle_messages,
        vec![("battle-fmt1-1".to_string(), frame.to_string())]
    );
}

#[tokio::test]
async fn test_malformed_line_keeps_rest_of_frame() {
    let server = Loopback::start().await;
    let mut engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController {
        stop_after_login: true,
        ..Default::default()
    };

    server.push("|updatesearch|{broken\n|updateuser| alice|1|1|{}");
    let result = tokio::time::timeout(WAIT, engine.run(&mut controller))
        .await
        .unwrap();

    assert!(result.is_ok());
    assert!(engine.is_logged_in());
    assert_eq!(controller.logged_in_as.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_name_taken_reaches_controller() {
    let mut server = Loopback::start().await;
    let mut engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController::default();

    let driver = async {
        server.push("|nametaken|alice|Someone is already using that name.");
        server.drain().await;
        server.close();
    };
    let (result, _) = tokio::join!(engine.run(&mut controller), driver);

    assert!(matches!(result, Err(EngineError::ConnectionClosed)));
    assert_eq!(controller.names_taken, vec!["alice"]);
}

#[tokio::test]
async fn test_terminates_before_reading() {
    let server = Loopback::start().await;
    let mut engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;
    let mut controller = TestController {
        stop_after_battle_messages: Some(0),
        ..Default::default()
    };

    let result = engine.run(&mut controller).await;

    assert!(result.is_ok());
    assert_eq!(engine.phase(), EnginePhase::Terminated);
}

#[tokio::test]
async fn test_run_requires_connection() {
    let config = Loopback::start().await.config("alice");
    let mut engine =
        ProtocolEngine::with_authenticator(config, RecordingAuthenticator::accepting("X")).unwrap();

    let result = engine.run(&mut TestController::default()).await;

    assert!(matches!(result, Err(EngineError::NotConnected)));
}

#[tokio::test]
async fn test_send_before_connect_fails() {
    let config = Loopback::start().await.config("alice");
    let engine =
        ProtocolEngine::with_authenticator(config, RecordingAuthenticator::accepting("X")).unwrap();

    let result = engine.handle().leave("battle-fmt1-1").await;

    assert!(matches!(result, Err(EngineError::NotConnected)));
}

#[tokio::test]
async fn test_challenge_requires_login() {
    let mut server = Loopback::start().await;
    let mut engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;
    let handle = engine.handle();
    let mut controller = TestController::default();

    assert!(matches!(
        handle.challenge("", "gen7randombattle").await,
        Err(EngineError::InvalidChallenge { .. })
    ));
    assert!(matches!(
        handle.challenge("bob", " ").await,
        Err(EngineError::InvalidChallenge { .. })
    ));
    assert!(!handle.challenge("bob", "gen7randombattle").await.unwrap());

    let driver = async {
        server.push("|updateuser| alice|1|1|{}");
        while !handle.is_logged_in() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let sent = handle.challenge("bob", "gen7randombattle").await.unwrap();
        let frames = server.drain().await;
        server.close();
        (sent, frames)
    };
    let (_, (sent, frames)) = tokio::join!(engine.run(&mut controller), driver);

    assert!(sent);
    assert_eq!(frames, vec!["|/challenge bob, gen7randombattle"]);
}

#[tokio::test]
async fn test_room_scoped_commands() {
    let mut server = Loopback::start().await;
    let engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;
    let handle = engine.handle();

    handle.leave("battle-fmt1-1").await.unwrap();
    handle
        .choose("battle-fmt1-2", "move 3", Some(4))
        .await
        .unwrap();
    handle.send("", "/search fmt1", None).await.unwrap();

    assert_eq!(server.next_frame().await, "battle-fmt1-1|/leave");
    assert_eq!(server.next_frame().await, "battle-fmt1-2|/choose move 3|4");
    assert_eq!(server.next_frame().await, "|/search fmt1");
}

#[tokio::test]
async fn test_concurrent_sends_never_interleave() {
    const TASKS: usize = 8;
    const PER_TASK: usize = 25;

    let mut server = Loopback::start().await;
    let engine =
        connected(server.config("alice"), RecordingAuthenticator::accepting("X")).await;

    let mut tasks = Vec::new();
    for task in 0..TASKS {
        let handle = engine.handle();
        tasks.push(tokio::spawn(async move {
            for i in 0..PER_TASK {
                let room = format!("battle-fmt1-{}", task);
                let turn = i.to_string();
                handle
                    .send(&room, &format!("/choose move {}", i % 4 + 1), Some(&turn))
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut seen = HashSet::new();
    for _ in 0..TASKS * PER_TASK {
        let frame = server.next_frame().await;
        let fields: Vec<&str> = frame.split('|').collect();
        assert_eq!(fields.len(), 3, "malformed frame: {}", frame);
        assert!(fields[0].starts_with("battle-fmt1-"), "bad room: {}", frame);
        assert!(fields[1].starts_with("/choose move "), "bad command: {}", frame);
        assert!(fields[2].parse::<usize>().is_ok(), "bad turn: {}", frame);
        assert!(seen.insert((fields[0].to_string(), fields[2].to_string())));
    }
    assert_eq!(seen.len(), TASKS * PER_TASK);
}
