//! Syslog destination over UDP or TCP.
//!
//! Only the minimal `<PRI>tag: payload` framing is produced here; anything
//! fancier belongs to the receiver side.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::Mutex;

use crate::config::SyslogAttrs;
use crate::output::{Output, OutputError, OutputId, OutputKind};

// facility user (1) << 3 | severity info (6)
const PRI_USER_INFO: u8 = 14;

enum Conn {
    Udp(UdpSocket),
    Tcp(TcpStream),
}

pub struct SyslogOutput {
    id: OutputId,
    attrs: SyslogAttrs,
    conn: Mutex<Option<Conn>>,
}

impl SyslogOutput {
    pub fn new(attrs: SyslogAttrs) -> Self {
        Self {
            id: OutputId::derive(OutputKind::Syslog, &attrs),
            attrs,
            conn: Mutex::new(None),
        }
    }

    fn frame(&self, payload: &[u8]) -> Vec<u8> {
        let mut msg = format!("<{PRI_USER_INFO}>{}: ", self.attrs.tag).into_bytes();
        msg.extend_from_slice(payload);
        msg
    }
}

#[async_trait]
impl Output for SyslogOutput {
    fn id(&self) -> OutputId {
        self.id.clone()
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Syslog
    }

    async fn activate(&self) -> Result<(), OutputError> {
        let mut conn = self.conn.lock().await;
        if conn.is_some() {
            return Err(OutputError::AlreadyActive);
        }

        *conn = Some(match self.attrs.protocol.as_str() {
            "tcp" => Conn::Tcp(TcpStream::connect(&self.attrs.netaddr).await?),
            // udp is the default transport
            _ => {
                let socket = UdpSocket::bind("0.0.0.0:0").await?;
                socket.connect(&self.attrs.netaddr).await?;
                Conn::Udp(socket)
            }
        });
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), OutputError> {
        let mut conn = self.conn.lock().await;
        match conn.take() {
            None => Err(OutputError::NotActive),
            Some(Conn::Tcp(mut stream)) => {
                stream.shutdown().await?;
                Ok(())
            }
            Some(Conn::Udp(_)) => Ok(()),
        }
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, OutputError> {
        let mut conn = self.conn.lock().await;
        let msg = self.frame(payload);
        match conn.as_mut() {
            None => Err(OutputError::NullOutput),
            Some(Conn::Udp(socket)) => {
                socket.send(&msg).await?;
                Ok(payload.len())
            }
            Some(Conn::Tcp(stream)) => {
                stream.write_all(&msg).await?;
                stream.write_all(b"\n").await?;
                Ok(payload.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(netaddr: &str) -> SyslogAttrs {
        SyslogAttrs {
            protocol: "udp".to_string(),
            netaddr: netaddr.to_string(),
            tag: "logspray".to_string(),
        }
    }

    #[tokio::test]
    async fn test_udp_roundtrip() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap();

        let out = SyslogOutput::new(attrs(&addr.to_string()));
        out.activate().await.unwrap();
        out.write(b"hello syslog").await.unwrap();

        let mut buf = [0u8; 256];
        let n = receiver.recv(&mut buf).await.unwrap();
        let received = std::str::from_utf8(&buf[..n]).unwrap();
        assert_eq!(received, "<14>logspray: hello syslog");

        out.deactivate().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_before_activation_is_null() {
        let out = SyslogOutput::new(attrs("127.0.0.1:514"));
        assert!(matches!(
            out.write(b"x").await.unwrap_err(),
            OutputError::NullOutput
        ));
    }
}
