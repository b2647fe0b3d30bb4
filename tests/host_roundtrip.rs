//! Round trips against an in-process mock host.
//!
//! The mock host is a bare `tokio-tungstenite` accept loop standing in for
//! the control-surface software: it expects the registration frame first,
//! then feeds input events and asserts on the command frames coming back.

use deck_counter::inspector::{BridgeState, InspectorBridge};
use deck_counter::launch::LaunchArgs;
use deck_counter::protocol::InspectorField;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, connect_async, WebSocketStream};

type HostSocket = WebSocketStream<TcpStream>;

async fn next_json(ws: &mut HostSocket) -> Value {
    loop {
        match ws.next().await.expect("socket closed early").unwrap() {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn plugin_registers_then_counts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let host = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();

        // Registration must be the first frame on the socket.
        assert_eq!(
            next_json(&mut ws).await,
            json!({ "event": "registerPlugin", "uuid": "instance-1" })
        );

        // keyDown on {count:3, increment:2} → persisted {5,2}, title "5".
        ws.send(Message::text(
            json!({
                "event": "keyDown",
                "action": "com.example.counter.increment",
                "context": "ctx-1",
                "payload": { "settings": { "count": 3, "increment": 2 } }
            })
            .to_string(),
        ))
        .await
        .unwrap();
        assert_eq!(
            next_json(&mut ws).await,
            json!({
                "event": "setSettings",
                "context": "ctx-1",
                "payload": { "count": 5, "increment": 2 }
            })
        );
        assert_eq!(
            next_json(&mut ws).await,
            json!({
                "event": "setTitle",
                "context": "ctx-1",
                "payload": { "title": "5" }
            })
        );

        // dialRotate from empty settings with ticks=3 → persisted {3,1},
        // feedback value 3.
        ws.send(Message::text(
            json!({
                "event": "dialRotate",
                "context": "ctx-2",
                "payload": { "settings": {}, "ticks": 3, "pressed": false }
            })
            .to_string(),
        ))
        .await
        .unwrap();
        assert_eq!(
            next_json(&mut ws).await["payload"],
            json!({ "count": 3, "increment": 1 })
        );
        let feedback = next_json(&mut ws).await;
        assert_eq!(feedback["event"], "setFeedback");
        assert_eq!(feedback["payload"]["value"], 3);
        assert_eq!(feedback["payload"]["title"], "Dial rotating 3");

        // A frame the plugin doesn't handle must not produce output; the
        // next event's commands arrive in order right after it.
        ws.send(Message::text(
            json!({ "event": "deviceDidConnect", "device": "dev-1" }).to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::text(
            json!({
                "event": "touchTap",
                "context": "ctx-2",
                "payload": { "settings": { "count": 3 } }
            })
            .to_string(),
        ))
        .await
        .unwrap();
        assert_eq!(
            next_json(&mut ws).await["payload"],
            json!({ "count": 100, "increment": 1 })
        );
        assert_eq!(next_json(&mut ws).await["payload"]["value"], 100);

        ws.close(None).await.unwrap();
    });

    let args = LaunchArgs {
        port,
        uuid: "instance-1".to_string(),
        register_event: "registerPlugin".to_string(),
        info: "{}".to_string(),
        action_info: None,
    };
    deck_counter::client::run(args).await.unwrap();
    host.await.unwrap();
}

#[tokio::test]
async fn bridge_registers_and_relays_over_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let host = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();

        assert_eq!(
            next_json(&mut ws).await,
            json!({ "event": "registerPropertyInspector", "uuid": "pi-1" })
        );
        assert_eq!(
            next_json(&mut ws).await,
            json!({
                "action": "com.example.counter.increment",
                "event": "sendToPlugin",
                "context": "pi-1",
                "payload": { "increment": 4 }
            })
        );

        // Plugin pushing a value back to the panel.
        ws.send(Message::text(
            json!({
                "event": "sendToPropertyInspector",
                "context": "ctx-9",
                "payload": { "increment": 8 }
            })
            .to_string(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
    });

    let (socket, _) = connect_async(format!("ws://127.0.0.1:{port}"))
        .await
        .unwrap();
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let mut bridge = InspectorBridge::new(
        "pi-1",
        r#"{"action":"com.example.counter.increment","context":"ctx-9"}"#,
        outbound_tx,
    )
    .unwrap();

    // Same wiring as the pi-bridge binary: a writer task drains the queue.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if sink.send(Message::text(frame)).await.is_err() {
                break;
            }
        }
    });

    bridge.socket_opened("registerPropertyInspector").unwrap();
    assert_eq!(bridge.state(), BridgeState::Registered);
    bridge.send_to_plugin(InspectorField::Increment(4));

    let mut refresh = bridge.subscribe();
    while let Some(frame) = stream.next().await {
        match frame.unwrap() {
            Message::Text(text) => bridge.handle_frame(text.as_str()),
            Message::Close(_) => break,
            _ => {}
        }
    }
    assert_eq!(*refresh.borrow_and_update(), json!({ "increment": 8 }));

    drop(bridge);
    writer.await.unwrap();
    host.await.unwrap();
}
