//! WebSocket pump.

use crate::Session;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use widgetsync_core::Frame;

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Move frames between a socket and a session until the peer closes.
///
/// Outbound frames come from the receiver paired with the session's
/// kernel and are written as JSON text. Inbound text is parsed into frames
/// and dispatched; anything unparseable or unroutable is logged and
/// skipped.
pub async fn serve_socket<S>(
    ws: WebSocketStream<S>,
    session: &mut Session,
    outbound: &mut mpsc::UnboundedReceiver<Frame>,
) -> Result<(), SocketError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            msg = stream.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {}", e);
                        return Err(e.into());
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        let frame: Frame = match serde_json::from_str(&text) {
                            Ok(frame) => frame,
                            Err(e) => {
                                tracing::warn!("Invalid frame: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = session.dispatch(frame) {
                            tracing::warn!("Dropped frame: {}", e);
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }

            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                sink.send(Message::Text(serde_json::to_string(&frame)?.into())).await?;
            }
        }
    }

    tracing::debug!("socket closed");
    Ok(())
}
