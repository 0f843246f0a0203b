//! The byte transport the engine writes commands to.
//!
//! Opening, closing and baud-rate configuration belong to the host. The
//! engine only asks whether the link is open and writes whole frames; incoming
//! bytes are pushed in by the host through
//! [`ProtocolEngine::on_bytes_received`](crate::ProtocolEngine::on_bytes_received).

use std::io;

use bytes::Bytes;

/// Outbound half of a serial link.
pub trait Transport {
    /// Whether the link can accept writes.
    fn is_open(&self) -> bool;

    /// Write bytes, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }
}

/// In-memory transport that records every write.
///
/// Used for tests and capture replay. A write limit simulates a link that
/// accepts only part of a frame.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    open: bool,
    writes: Vec<Bytes>,
    write_limit: Option<usize>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// An open transport.
    pub fn new() -> Self {
        MemoryTransport {
            open: true,
            writes: Vec::new(),
            write_limit: None,
        }
    }

    /// A closed transport.
    pub fn closed() -> Self {
        MemoryTransport {
            open: false,
            ..Self::new()
        }
    }

    /// Accept at most `limit` bytes per write.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Open or close the link.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Every accepted write, oldest first.
    pub fn writes(&self) -> &[Bytes] {
        &self.writes
    }

    /// The most recent write.
    pub fn last_write(&self) -> Option<&Bytes> {
        self.writes.last()
    }

    /// Drain the recorded writes.
    pub fn take_writes(&mut self) -> Vec<Bytes> {
        std::mem::take(&mut self.writes)
    }
}

impl Transport for MemoryTransport {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "transport closed"));
        }
        let accepted = match self.write_limit {
            Some(limit) => bytes.len().min(limit),
            None => bytes.len(),
        };
        self.writes.push(Bytes::copy_from_slice(&bytes[..accepted]));
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let mut transport = MemoryTransport::new();
        assert_eq!(transport.write(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(transport.write(&[4]).unwrap(), 1);
        assert_eq!(transport.writes().len(), 2);
        assert_eq!(transport.last_write().map(|b| &b[..]), Some(&[4u8][..]));

        let taken = transport.take_writes();
        assert_eq!(taken.len(), 2);
        assert!(transport.writes().is_empty());
    }

    #[test]
    fn test_closed_rejects_writes() {
        let mut transport = MemoryTransport::closed();
        assert!(!transport.is_open());
        let err = transport.write(&[1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);

        transport.set_open(true);
        assert!(transport.write(&[1]).is_ok());
    }

    #[test]
    fn test_write_limit() {
        let mut transport = MemoryTransport::new().with_write_limit(2);
        assert_eq!(transport.write(&[1, 2, 3, 4]).unwrap(), 2);
        assert_eq!(&transport.writes()[0][..], &[1, 2]);
    }

    #[test]
    fn test_boxed_transport() {
        let mut transport: Box<dyn Transport> = Box::new(MemoryTransport::new());
        assert!(transport.is_open());
        assert_eq!(transport.write(&[9, 9]).unwrap(), 2);
    }
}
