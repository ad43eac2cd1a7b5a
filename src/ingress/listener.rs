//! TCP listener feeding the dispatcher

use crate::dispatch::Dispatcher;
use anyhow::Result;
use pairing_shared::codec::FrameDecoder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Accepts bus connections and dispatches every message they carry
pub struct BusListener {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl BusListener {
    /// Bind the listen socket
    pub async fn bind(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails
    ///
    /// Each connection runs on its own task; a broken connection never affects
    /// the others.
    pub async fn run(self) -> Result<()> {
        info!("Bus listener on {}", self.local_addr()?);

        loop {
            let (socket, peer) = self.listener.accept().await?;
            debug!(%peer, "Bus connection opened");

            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                match serve_connection(socket, peer, &dispatcher).await {
                    Ok(count) => debug!(%peer, count, "Bus connection closed"),
                    Err(e) => warn!(%peer, error = %e, "Bus connection dropped"),
                }
            });
        }
    }
}

/// Read frames from one connection until EOF, returning how many were dispatched
///
/// A frame that fails to decode ends the connection.
pub async fn serve_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    dispatcher: &Dispatcher,
) -> Result<usize>
where
    S: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0u8; 4096];
    let mut dispatched = 0;

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            if decoder.buffer_len() > 0 {
                warn!(%peer, pending = decoder.buffer_len(), "Connection closed mid-frame");
            }
            return Ok(dispatched);
        }

        decoder.extend(&buf[..n]);

        // Process all complete frames
        while let Some(msg) = decoder.decode_next()? {
            let outcome = dispatcher.dispatch(&msg).await;
            debug!(%peer, source = %msg.source(), ?outcome, "Dispatched message");
            dispatched += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MessageHandler;
    use crate::error::HandlerResult;
    use async_trait::async_trait;
    use pairing_shared::codec::{self, FrameEncoder};
    use pairing_shared::{message_type, Address, AddressPattern, PlatformMessage};
    use std::sync::Mutex;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::mpsc;

    struct Collect(Mutex<Vec<PlatformMessage>>);

    #[async_trait]
    impl MessageHandler for Collect {
        fn name(&self) -> &'static str {
            "collect"
        }

        async fn handle(&self, msg: &PlatformMessage) -> HandlerResult {
            self.0.lock().unwrap().push(msg.clone());
            Ok(())
        }
    }

    /// Forwards every message to a channel so tests can await delivery
    struct Forward(mpsc::UnboundedSender<PlatformMessage>);

    #[async_trait]
    impl MessageHandler for Forward {
        fn name(&self) -> &'static str {
            "forward"
        }

        async fn handle(&self, msg: &PlatformMessage) -> HandlerResult {
            let _ = self.0.send(msg.clone());
            Ok(())
        }
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 50000))
    }

    fn deleted(id: &str) -> PlatformMessage {
        PlatformMessage::new(Address::driver_device(id), message_type::EVENT_DELETED)
            .with_place_id("11111111-1111-1111-1111-111111111111")
    }

    #[tokio::test]
    async fn test_serve_connection_dispatches_all_frames() {
        let collect = Arc::new(Collect(Mutex::new(Vec::new())));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            AddressPattern::driver_devices(),
            message_type::EVENT_DELETED,
            collect.clone(),
        );

        let mut encoder = FrameEncoder::new();
        encoder.encode(&deleted("aaaa")).unwrap();
        encoder.encode(&deleted("bbbb")).unwrap();
        // Unrouted messages are still read off the wire
        encoder
            .encode(&PlatformMessage::new(Address::driver_device("cccc"), message_type::EVENT_ADDED))
            .unwrap();
        let bytes = encoder.take();

        let (mut client, server) = tokio::io::duplex(16);
        let writer = tokio::spawn(async move {
            client.write_all(&bytes).await.unwrap();
            client.shutdown().await.unwrap();
        });

        let count = serve_connection(server, peer(), &dispatcher).await.unwrap();
        writer.await.unwrap();

        assert_eq!(count, 3);
        let seen = collect.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].source().id(), "aaaa");
        assert_eq!(seen[1].source().id(), "bbbb");
    }

    #[tokio::test]
    async fn test_bad_frame_ends_connection() {
        let dispatcher = Dispatcher::new();

        let mut bytes = codec::encode(&deleted("aaaa")).unwrap().to_vec();
        bytes.extend_from_slice(&(codec::MAX_MESSAGE_SIZE + 1).to_be_bytes());

        let (mut client, server) = tokio::io::duplex(1024);
        client.write_all(&bytes).await.unwrap();
        drop(client);

        let result = serve_connection(server, peer(), &dispatcher).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_listener_over_tcp() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            AddressPattern::driver_devices(),
            message_type::EVENT_DELETED,
            Arc::new(Forward(tx)),
        );

        let listener = BusListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)), Arc::new(dispatcher))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(listener.run());

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(&codec::encode(&deleted("abcd")).unwrap())
            .await
            .unwrap();

        let received = rx.recv().await.expect("message should be dispatched");
        assert_eq!(received, deleted("abcd"));

        server.abort();
    }
}
