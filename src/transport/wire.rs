// Connection seam for the session socket
//
// The transport state machine talks to these traits; the production
// connector dials a WebSocket. Tests substitute in-memory halves.

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Outbound half of a session connection
#[async_trait]
pub trait WireSink: Send {
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the connection with a normal-closure code.
    async fn close(&mut self) -> Result<()>;
}

/// Inbound half of a session connection
#[async_trait]
pub trait WireStream: Send {
    /// Next inbound text message; `None` once the connection is closed.
    async fn next_text(&mut self) -> Option<Result<String>>;
}

/// Opens one duplex connection per call
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(Box<dyn WireSink>, Box<dyn WireStream>)>;
}

/// WebSocket connector used against a live backend
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<(Box<dyn WireSink>, Box<dyn WireStream>)> {
        let (socket, _response) = tokio_tungstenite::connect_async(url).await?;
        let (sink, stream) = socket.split();
        Ok((Box::new(WsSink { sink }), Box::new(WsStream { stream })))
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct WsSink {
    sink: SplitSink<Socket, Message>,
}

#[async_trait]
impl WireSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.sink.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.sink
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "client disconnect".into(),
            })))
            .await?;
        self.sink.close().await?;
        Ok(())
    }
}

struct WsStream {
    stream: SplitStream<Socket>,
}

#[async_trait]
impl WireStream for WsStream {
    async fn next_text(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // Pings are answered by the protocol layer; binary
                // frames are not part of the session contract.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
