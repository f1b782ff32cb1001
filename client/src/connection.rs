use futures_util::StreamExt;
use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::EngineError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the server connection
pub(crate) type WsSink = SplitSink<WsStream, Message>;

/// Open a websocket and split it into its write half and a frame reader
pub(crate) async fn connect(url: &str) -> Result<(WsSink, Inbound), EngineError> {
    let (ws, _response) = connect_async(url).await?;
    let (sink, stream) = ws.split();

    Ok((sink, Inbound { stream }))
}

/// Read half of the server connection. Only the receive loop holds it.
pub(crate) struct Inbound {
    stream: SplitStream<WsStream>,
}

impl Inbound {
    /// Next text frame, or `None` once the server closes the connection
    pub async fn next_text(&mut self) -> Result<Option<String>, EngineError> {
        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // Pings are answered by tungstenite on the next write
                _ => {}
            }
        }

        Ok(None)
    }
}
