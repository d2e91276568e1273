mod test_helpers;

use std::time::Duration;

use hangman_types::{ClientMessage, GameStatus, RoundResult, ServerMessage};
use test_helpers::*;

#[tokio::test]
async fn create_then_join_seats_players_until_auto_start() {
    let setup = TestServerSetup::with_word("RUST").await;

    let (_, alice, mut alice_rx) = setup.connect().await;
    send(
        &alice,
        ClientMessage::CreateGame {
            player_name: "Alice".to_string(),
            public_game: false,
        },
    )
    .await;

    let game_id = match recv_message(&mut alice_rx).await {
        ServerMessage::GameCreated { game_id, .. } => game_id,
        other => panic!("Expected GameCreated, got: {:?}", other),
    };
    match recv_message(&mut alice_rx).await {
        ServerMessage::GameStateUpdate { game_state } => {
            assert_eq!(game_state.status, GameStatus::Waiting);
            assert_eq!(game_state.players_needed, 2);
        }
        other => panic!("Expected GameStateUpdate, got: {:?}", other),
    }

    let (_, bob, mut bob_rx) = setup.connect().await;
    send(
        &bob,
        ClientMessage::JoinGame {
            game_id: game_id.clone(),
            player_name: "Bob".to_string(),
        },
    )
    .await;

    match recv_message(&mut bob_rx).await {
        ServerMessage::PlayerJoined { game_state, .. } => {
            assert_eq!(game_state.status, GameStatus::Waiting);
            assert_eq!(game_state.players_needed, 1);
        }
        other => panic!("Expected PlayerJoined, got: {:?}", other),
    }

    let (_, carol, mut carol_rx) = setup.connect().await;
    send(
        &carol,
        ClientMessage::JoinGame {
            game_id: game_id.clone(),
            player_name: "Carol".to_string(),
        },
    )
    .await;

    // Third seat fills the game and starts the round
    match recv_message(&mut carol_rx).await {
        ServerMessage::PlayerJoined { game_state, .. } => {
            assert_eq!(game_state.status, GameStatus::Playing);
            assert_eq!(game_state.players_needed, 0);
            assert_eq!(
                game_state.current_player.as_ref().map(|p| p.name.as_str()),
                Some("Alice")
            );
            assert_eq!(game_state.word, "____");
        }
        other => panic!("Expected PlayerJoined, got: {:?}", other),
    }
}

#[tokio::test]
async fn public_join_matches_players_into_the_same_game() {
    let setup = TestServerSetup::with_word("RUST").await;

    let (_, alice, mut alice_rx) = setup.connect().await;
    send(
        &alice,
        ClientMessage::JoinPublicGame {
            player_name: "Alice".to_string(),
        },
    )
    .await;
    let first_join = recv_message(&mut alice_rx).await;
    assert!(matches!(first_join, ServerMessage::PlayerJoined { .. }));

    let (_, bob, mut bob_rx) = setup.connect().await;
    send(
        &bob,
        ClientMessage::JoinPublicGame {
            player_name: "Bob".to_string(),
        },
    )
    .await;

    match recv_message(&mut bob_rx).await {
        ServerMessage::PlayerJoined { game_state, .. } => {
            assert_eq!(game_state.players.len(), 2);
        }
        other => panic!("Expected PlayerJoined, got: {:?}", other),
    }
    assert_eq!(setup.registry.game_count().await, 1);
}

#[tokio::test]
async fn guessing_out_of_turn_is_rejected() {
    let setup = TestServerSetup::with_word("AB").await;
    let (game_id, handlers, mut receivers) = seat_three(&setup).await;

    // Bob is not the current player
    send(&handlers[1], make_guess(&game_id, "A")).await;

    match recv_message(&mut receivers[1]).await {
        ServerMessage::Error { message } => {
            assert_eq!(message, "It's not your turn");
        }
        other => panic!("Expected Error, got: {:?}", other),
    }
}

#[tokio::test]
async fn completing_the_word_finishes_the_round_and_persists_scores() {
    let setup = TestServerSetup::with_word("AB").await;
    let (game_id, handlers, mut receivers) = seat_three(&setup).await;

    send(&handlers[0], make_guess(&game_id, "A")).await;
    for rx in receivers.iter_mut() {
        match recv_message(rx).await {
            ServerMessage::GameStateUpdate { game_state } => {
                assert_eq!(game_state.word, "A_");
                assert_eq!(game_state.status, GameStatus::Playing);
            }
            other => panic!("Expected GameStateUpdate, got: {:?}", other),
        }
    }

    send(&handlers[1], make_guess(&game_id, "B")).await;
    for rx in receivers.iter_mut() {
        match recv_message(rx).await {
            ServerMessage::GameStateUpdate { game_state } => {
                assert_eq!(game_state.status, GameStatus::Finished);
                assert_eq!(game_state.word, "AB");
            }
            other => panic!("Expected GameStateUpdate, got: {:?}", other),
        }
    }

    // Every seat gets its own game over notice; only the first seat is host
    let mut host_flags = Vec::new();
    for rx in receivers.iter_mut() {
        match recv_message(rx).await {
            ServerMessage::GameOver { result, word, is_host, .. } => {
                assert_eq!(result, RoundResult::Win);
                assert_eq!(word, "AB");
                host_flags.push(is_host);
            }
            other => panic!("Expected GameOver, got: {:?}", other),
        }
    }
    assert_eq!(host_flags, vec![true, false, false]);

    // Score writes happen off the request path
    let rows = wait_for_scores(&setup, &game_id, 3).await;
    let alice = rows.iter().find(|r| r.player_name == "Alice").unwrap();
    let bob = rows.iter().find(|r| r.player_name == "Bob").unwrap();
    let carol = rows.iter().find(|r| r.player_name == "Carol").unwrap();
    assert_eq!(alice.score, 10);
    assert_eq!(bob.score, 10);
    assert_eq!(carol.score, 0);
    assert!(alice.is_winner);
    assert!(bob.is_winner);
    assert!(!carol.is_winner);
}

#[tokio::test]
async fn unanimous_rematch_vote_starts_a_fresh_round_with_scores_kept() {
    let setup = TestServerSetup::with_word("AB").await;
    let (game_id, handlers, mut receivers) = seat_three(&setup).await;

    send(&handlers[0], make_guess(&game_id, "A")).await;
    send(&handlers[1], make_guess(&game_id, "B")).await;
    for rx in receivers.iter_mut() {
        drain(rx);
    }

    send(
        &handlers[0],
        ClientMessage::RequestNewGame {
            game_id: game_id.clone(),
        },
    )
    .await;

    for rx in receivers.iter_mut().skip(1) {
        match recv_message(rx).await {
            ServerMessage::NewGameRequested { requested_by } => {
                assert_eq!(requested_by, "Alice");
            }
            other => panic!("Expected NewGameRequested, got: {:?}", other),
        }
    }

    send(
        &handlers[1],
        ClientMessage::NewGameResponse {
            game_id: game_id.clone(),
            accepted: true,
        },
    )
    .await;
    for rx in receivers.iter_mut() {
        match recv_message(rx).await {
            ServerMessage::WaitingForResponses { received, total } => {
                assert_eq!((received, total), (1, 2));
            }
            other => panic!("Expected WaitingForResponses, got: {:?}", other),
        }
    }

    send(
        &handlers[2],
        ClientMessage::NewGameResponse {
            game_id: game_id.clone(),
            accepted: true,
        },
    )
    .await;
    for rx in receivers.iter_mut() {
        match recv_message(rx).await {
            ServerMessage::NewGameStarted { game_state, .. } => {
                assert_eq!(game_state.status, GameStatus::Playing);
                assert_eq!(game_state.word, "__");
                // Standings carry across rounds
                let alice = game_state
                    .players
                    .iter()
                    .find(|p| p.name == "Alice")
                    .unwrap();
                assert_eq!(alice.score, 10);
            }
            other => panic!("Expected NewGameStarted, got: {:?}", other),
        }
    }
}

#[tokio::test]
async fn rejecting_a_rematch_returns_everyone_to_the_menu() {
    let setup = TestServerSetup::with_word("AB").await;
    let (game_id, handlers, mut receivers) = seat_three(&setup).await;

    send(&handlers[0], make_guess(&game_id, "A")).await;
    send(&handlers[1], make_guess(&game_id, "B")).await;
    for rx in receivers.iter_mut() {
        drain(rx);
    }

    send(
        &handlers[0],
        ClientMessage::RequestNewGame {
            game_id: game_id.clone(),
        },
    )
    .await;
    send(
        &handlers[1],
        ClientMessage::NewGameResponse {
            game_id: game_id.clone(),
            accepted: false,
        },
    )
    .await;
    send(
        &handlers[2],
        ClientMessage::NewGameResponse {
            game_id: game_id.clone(),
            accepted: true,
        },
    )
    .await;

    // One "no" sinks the vote once all responses are in
    for rx in receivers.iter_mut() {
        drain_until_return_to_menu(rx).await;
    }
}

#[tokio::test]
async fn disconnect_mid_round_ends_the_round_for_the_others() {
    let setup = TestServerSetup::with_word("AB").await;
    let (_game_id, handlers, mut receivers) = seat_three(&setup).await;

    handlers[1].handle_disconnect().await;

    match recv_message(&mut receivers[0]).await {
        ServerMessage::PlayerLeft { game_state, .. } => {
            assert_eq!(game_state.status, GameStatus::Finished);
            assert_eq!(game_state.players.len(), 2);
        }
        other => panic!("Expected PlayerLeft, got: {:?}", other),
    }
    assert_eq!(setup.registry.game_count().await, 1);
}

#[tokio::test]
async fn game_is_evicted_when_the_last_player_disconnects() {
    let setup = TestServerSetup::with_word("AB").await;
    let (_game_id, handlers, _receivers) = seat_three(&setup).await;

    for handler in &handlers {
        handler.handle_disconnect().await;
    }

    assert_eq!(setup.registry.game_count().await, 0);
}

#[tokio::test]
async fn empty_letter_burns_a_turn_without_consuming_a_guessable_letter() {
    let setup = TestServerSetup::with_word("AB").await;
    let (game_id, handlers, mut receivers) = seat_three(&setup).await;

    // Turn timeout sentinel from the current player's client
    send(&handlers[0], make_guess(&game_id, "")).await;

    match recv_message(&mut receivers[0]).await {
        ServerMessage::GameStateUpdate { game_state } => {
            assert!(game_state.guessed_letters.is_empty());
            assert_eq!(game_state.remaining_guesses, 8);
            assert_eq!(
                game_state.current_player.as_ref().map(|p| p.name.as_str()),
                Some("Bob")
            );
        }
        other => panic!("Expected GameStateUpdate, got: {:?}", other),
    }
}

/// Seats Alice, Bob, and Carol into one private game; the round has
/// started and Alice holds the first turn.
async fn seat_three(
    setup: &TestServerSetup,
) -> (
    String,
    Vec<hangman_server::websocket::handlers::MessageHandler>,
    Vec<tokio::sync::mpsc::UnboundedReceiver<hangman_types::ServerMessage>>,
) {
    let mut handlers = Vec::new();
    let mut receivers = Vec::new();

    let (_, alice, alice_rx) = setup.connect().await;
    send(
        &alice,
        ClientMessage::CreateGame {
            player_name: "Alice".to_string(),
            public_game: false,
        },
    )
    .await;
    handlers.push(alice);
    receivers.push(alice_rx);

    let game_id = match recv_message(&mut receivers[0]).await {
        ServerMessage::GameCreated { game_id, .. } => game_id,
        other => panic!("Expected GameCreated, got: {:?}", other),
    };

    for name in ["Bob", "Carol"] {
        let (_, handler, rx) = setup.connect().await;
        send(
            &handler,
            ClientMessage::JoinGame {
                game_id: game_id.clone(),
                player_name: name.to_string(),
            },
        )
        .await;
        handlers.push(handler);
        receivers.push(rx);
    }

    for rx in receivers.iter_mut() {
        drain(rx);
    }

    (game_id, handlers, receivers)
}

async fn drain_until_return_to_menu(
    receiver: &mut tokio::sync::mpsc::UnboundedReceiver<ServerMessage>,
) {
    loop {
        match recv_message(receiver).await {
            ServerMessage::ReturnToMenu { .. } => return,
            _ => continue,
        }
    }
}

async fn wait_for_scores(
    setup: &TestServerSetup,
    game_id: &str,
    expected: usize,
) -> Vec<hangman_types::ScoreRecord> {
    for _ in 0..50 {
        let rows = setup.scores.scores_for_game(game_id).await.unwrap();
        if rows.len() >= expected {
            return rows;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("scores for game {} were never persisted", game_id);
}
