use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use anyhow::{Context, Result};
use log::{info, warn};
use rand::Rng;
use crate::control::message::ControlMessage;
/// Random 8-byte hex id used to tag our own messages.
pub fn random_client_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
/// Line-delimited JSON connection to the instrument server.
///
/// A background thread reads lines and forwards parsed messages; the UI
/// drains them with [`SocketClient::poll`] once per frame.
pub struct SocketClient {
    client_id: String,
    writer: TcpStream,
    rx: Receiver<ControlMessage>,
    connected: bool,
    reader: Option<JoinHandle<()>>,
}
impl SocketClient {
    pub fn connect(addr: &str, client_id: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let writer = TcpStream::connect(addr)
            .with_context(|| format!("connecting to control server at {addr}"))?;
        writer.set_nodelay(true).ok();
        let read_half = writer
            .try_clone()
            .context("cloning control socket for reading")?;
        let (tx, rx) = mpsc::channel::<ControlMessage>();
        let reader = thread::Builder::new()
            .name("control-socket".into())
            .spawn(move || {
                let reader = BufReader::new(read_half);
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match ControlMessage::from_line(&line) {
                        Ok(msg) => {
                            if tx.send(msg).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("[CS] Dropping malformed message: {e}"),
                    }
                }
                info!("[CS] Control socket reader finished");
            })
            .context("spawning control socket reader")?;
        info!("[CS] Connected to {addr} as {client_id}");
        Ok(Self {
            client_id,
            writer,
            rx,
            connected: true,
            reader: Some(reader),
        })
    }
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
    pub fn is_connected(&self) -> bool {
        self.connected
    }
    pub fn send(&mut self, message: &ControlMessage) -> Result<()> {
        let line = message.to_line().context("encoding control message")?;
        let written = self
            .writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush());
        if let Err(e) = written {
            self.connected = false;
            return Err(e).context("writing to control socket");
        }
        Ok(())
    }
    /// Everything received since the last poll. Never blocks.
    pub fn poll(&mut self) -> Vec<ControlMessage> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => out.push(msg),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!("[CS] Control server closed the connection");
                    }
                    self.connected = false;
                    break;
                }
            }
        }
        out
    }
}
impl Drop for SocketClient {
    fn drop(&mut self) {
        let _ = self.writer.shutdown(Shutdown::Both);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::{Duration, Instant};
    fn poll_until(client: &mut SocketClient, want: usize) -> Vec<ControlMessage> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < want && Instant::now() < deadline {
            got.extend(client.poll());
            thread::sleep(Duration::from_millis(10));
        }
        got
    }
    #[test]
    fn client_id_is_hex() {
        let id = random_client_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, random_client_id());
    }
    #[test]
    fn exchanges_lines_with_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            writer
                .write_all(b"{\"type\":\"control\",\"source\":\"srv\",\"name\":\"sco\",\"value\":4}\n")
                .unwrap();
            writer.write_all(b"not json\n\n").unwrap();
            writer
                .write_all(b"{\"type\":\"full_state\",\"source\":\"srv\",\"state\":{\"mode\":\"AC\"}}\n")
                .unwrap();
            let mut line = String::new();
            BufReader::new(stream).read_line(&mut line).unwrap();
            line
        });
        let mut client = SocketClient::connect(&addr, "me").unwrap();
        client
            .send(&ControlMessage::control("me", "sca", 12))
            .unwrap();
        let received = poll_until(&mut client, 2);
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], ControlMessage::control("srv", "sco", 4));
        assert!(matches!(received[1], ControlMessage::FullState { .. }));
        let echoed = ControlMessage::from_line(&server.join().unwrap()).unwrap();
        assert_eq!(echoed, ControlMessage::control("me", "sca", 12));
    }
    #[test]
    fn connect_failure_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        assert!(SocketClient::connect(&addr, "me").is_err());
    }
}
