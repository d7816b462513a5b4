//! End-to-end test over real WebSocket connections.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use strictly_mastermind::ScriptedNaming;
use strictly_server::{Server, ServerConfig};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Starts a server on an ephemeral port with scripted ids and names.
async fn start_server() -> SocketAddr {
    let config = ServerConfig::default().with_port(0);
    let naming = ScriptedNaming::new(["alice", "bob"], ["ember"]);
    let server = Server::bind(&config, Box::new(naming))
        .await
        .expect("Bind failed");
    let addr = server.local_addr().expect("No local addr");
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/"))
        .await
        .expect("Connect failed");
    socket
}

async fn recv(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(TIMEOUT, socket.next())
            .await
            .expect("Timeout waiting for message")
            .expect("Stream ended")
            .expect("Socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Invalid JSON");
        }
    }
}

async fn send(socket: &mut Socket, message: Value) {
    socket
        .send(Message::text(message.to_string()))
        .await
        .expect("Send failed");
}

#[tokio::test]
async fn test_two_players_play_a_round() {
    let addr = start_server().await;

    let mut alice = connect(addr).await;
    assert_eq!(recv(&mut alice).await, json!({"type": "id", "payload": {"id": "alice"}}));
    let mut bob = connect(addr).await;
    assert_eq!(recv(&mut bob).await, json!({"type": "id", "payload": {"id": "bob"}}));

    send(&mut alice, json!({"type": "set-user-name", "id": "alice", "payload": {"name": "Alice"}})).await;
    send(&mut bob, json!({"type": "set-user-name", "id": "bob", "payload": {"name": "Bob"}})).await;

    send(&mut alice, json!({"type": "create-game", "id": "alice", "payload": {}})).await;
    let created = recv(&mut alice).await;
    assert_eq!(created["payload"]["name"], "ember");
    assert_eq!(created["payload"]["phase"], "awaiting-second-player");

    send(&mut bob, json!({"type": "join-game", "id": "bob", "payload": {"name": "ember"}})).await;
    assert_eq!(recv(&mut alice).await["payload"]["phase"], "choosing-secrets");
    assert_eq!(recv(&mut bob).await["payload"]["phase"], "choosing-secrets");

    send(&mut alice, json!({"type": "set-number", "id": "alice", "payload": {"gameName": "ember", "number": "5042"}})).await;
    recv(&mut alice).await;
    recv(&mut bob).await;
    send(&mut bob, json!({"type": "set-number", "id": "bob", "payload": {"gameName": "ember", "number": "1245"}})).await;
    let for_alice = recv(&mut alice).await;
    let for_bob = recv(&mut bob).await;
    assert_eq!(for_alice["payload"]["phase"], "guessing");
    assert!(for_alice["payload"]["sideB"]["secret"].is_null());
    assert!(for_bob["payload"]["sideA"]["secret"].is_null());

    send(&mut alice, json!({"type": "guess-number", "id": "alice", "payload": {"gameName": "ember", "number": "1234"}})).await;
    let after_guess = recv(&mut bob).await;
    assert_eq!(after_guess["payload"]["sideB"]["guessHistory"][0]["exactMatches"], 2);
    assert_eq!(after_guess["payload"]["sideB"]["turn"], true);
    recv(&mut alice).await;

    send(&mut bob, json!({"type": "guess-number", "id": "bob", "payload": {"gameName": "ember", "number": "5042"}})).await;
    for socket in [&mut alice, &mut bob] {
        let finished = recv(socket).await;
        assert_eq!(finished["payload"]["phase"], "finished");
        assert_eq!(finished["payload"]["winnerDisplayName"], "Bob");
        assert_eq!(finished["payload"]["sideA"]["secret"], "5042");
        assert_eq!(finished["payload"]["sideB"]["secret"], "1245");
    }
}

#[tokio::test]
async fn test_malformed_message_does_not_break_other_sessions() {
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    recv(&mut alice).await;
    let mut bob = connect(addr).await;
    recv(&mut bob).await;

    bob.send(Message::text("{ definitely not json")).await.expect("Send failed");
    send(&mut bob, json!({"type": "join-game", "id": "bob"})).await;

    send(&mut alice, json!({"type": "get-user", "id": "alice"})).await;
    let user = recv(&mut alice).await;
    assert_eq!(user["type"], "user");
    assert_eq!(user["payload"]["id"], "alice");

    send(&mut bob, json!({"type": "get-user", "id": "bob"})).await;
    assert_eq!(recv(&mut bob).await["payload"]["id"], "bob");
}
