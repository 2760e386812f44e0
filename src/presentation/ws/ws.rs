use std::collections::HashMap;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::ports::realtime_port::{ClientFrame, SocketEvent};
use crate::application::use_cases::books::watch_book::WatchBook;
use crate::bootstrap::app_context::AppContext;

const OUTBOUND_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    StartProcess(Uuid),
    Leave(Uuid),
}

/// Parses one text frame. The error string is sent back as an `error` event.
pub fn parse_command(text: &str) -> Result<ClientCommand, String> {
    let frame: ClientFrame =
        serde_json::from_str(text).map_err(|_| "malformed frame".to_string())?;
    let book_id = || {
        frame
            .data
            .get("book_id")
            .or_else(|| frame.data.get("bookId"))
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| format!("{} requires a book_id", frame.event))
    };
    match frame.event.as_str() {
        "start_process" => Ok(ClientCommand::StartProcess(book_id()?)),
        "leave" => Ok(ClientCommand::Leave(book_id()?)),
        other => Err(format!("unknown event {:?}", other)),
    }
}

#[utoipa::path(
    get,
    path = "/socket",
    responses(
        (status = 101, description = "Switching Protocols (WebSocket upgrade)"),
        (status = 403, description = "Origin not allowed")
    ),
    tag = "Realtime"
)]
pub async fn socket_entry(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(ctx): State<AppContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let origin = headers
        .get(axum::http::header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    if !ctx.socket().accepts_origin(origin) {
        tracing::warn!(origin = origin.unwrap_or(""), "socket_origin_rejected");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(ws.on_upgrade(move |socket| peer(socket, ctx)))
}

fn spawn_forwarder(
    mut rx: broadcast::Receiver<SocketEvent>,
    tx: mpsc::Sender<SocketEvent>,
    book_id: Uuid,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    if tx.send(ev).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(%book_id, skipped, "socket_forwarder_lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn leave_room(ctx: &AppContext, rooms: &mut HashMap<Uuid, JoinHandle<()>>, book_id: Uuid) {
    if let Some(h) = rooms.remove(&book_id) {
        h.abort();
        // The forwarder owns the receiver; wait until it is gone.
        let _ = h.await;
        ctx.socket().hub().release(book_id).await;
    }
}

async fn start_process(
    ctx: &AppContext,
    tx: &mpsc::Sender<SocketEvent>,
    rooms: &mut HashMap<Uuid, JoinHandle<()>>,
    book_id: Uuid,
) {
    // Subscribe before the snapshot so nothing published in between is lost.
    let rx = if rooms.contains_key(&book_id) {
        None
    } else {
        Some(ctx.socket().hub().subscribe(book_id).await)
    };
    let books = ctx.book_repo();
    let uc = WatchBook {
        books: books.as_ref(),
    };
    let snapshot = uc.execute(book_id).await;
    let events = match snapshot {
        Ok(Some(events)) => {
            if let Some(rx) = rx {
                rooms.insert(book_id, spawn_forwarder(rx, tx.clone(), book_id));
            }
            events
        }
        failed => {
            drop(rx);
            leave_room(ctx, rooms, book_id).await;
            ctx.socket().hub().release(book_id).await;
            match failed {
                Err(e) => {
                    tracing::error!(error = ?e, %book_id, "socket_snapshot_failed");
                    vec![SocketEvent::Error {
                        message: "could not load book progress".into(),
                    }]
                }
                _ => vec![SocketEvent::Error {
                    message: format!("book {} not found", book_id),
                }],
            }
        }
    };
    for ev in events {
        let _ = tx.send(ev).await;
    }
}

async fn peer(socket: WebSocket, ctx: AppContext) {
    let (sink, stream) = socket.split();
    run_connection(stream, sink, ctx).await;
}

/// Drives one socket connection until the client goes away. Rooms joined by
/// the connection are released on the way out.
pub async fn run_connection<S, K>(stream: S, sink: K, ctx: AppContext)
where
    S: Stream<Item = Result<Message, axum::Error>>,
    K: Sink<Message> + Send + 'static,
{
    let sid = Uuid::new_v4();
    tracing::debug!(%sid, "socket_connected");
    let (tx, mut rx) = mpsc::channel::<SocketEvent>(OUTBOUND_CAPACITY);

    let writer = tokio::spawn(async move {
        let mut sink = std::pin::pin!(sink);
        while let Some(ev) = rx.recv().await {
            let text = match serde_json::to_string(&ev) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = ?e, "socket_event_encode_failed");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(SocketEvent::Connected { sid }).await;
    let mut rooms: HashMap<Uuid, JoinHandle<()>> = HashMap::new();
    let mut stream = std::pin::pin!(stream);

    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        match parse_command(&text) {
            Ok(ClientCommand::StartProcess(book_id)) => {
                start_process(&ctx, &tx, &mut rooms, book_id).await;
            }
            Ok(ClientCommand::Leave(book_id)) => {
                leave_room(&ctx, &mut rooms, book_id).await;
            }
            Err(message) => {
                let _ = tx.send(SocketEvent::Error { message }).await;
            }
        }
    }

    let joined: Vec<Uuid> = rooms.keys().copied().collect();
    for book_id in joined {
        leave_room(&ctx, &mut rooms, book_id).await;
    }
    drop(tx);
    let _ = writer.await;
    tracing::debug!(%sid, "socket_disconnected");
}
