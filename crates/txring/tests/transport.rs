#![expect(missing_docs)]

use std::io::{self, Read};

use txring::{
    BString, ByteRing, CapacityExceeded, Decode, Encode, InsufficientData, WireRead, WireWrite,
};

#[derive(Debug, Clone, PartialEq)]
struct Message {
    id: u32,
    body: BString,
}

impl Decode for Message {
    type Error = InsufficientData;

    fn decode<R: WireRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        Ok(Message {
            id: r.read_var_u32()?,
            body: r.read_var_utf8_string()?,
        })
    }
}

impl Encode for Message {
    fn encode<W: WireWrite + ?Sized>(&self, w: &mut W) -> Result<(), CapacityExceeded> {
        w.write_var_u32(self.id)?;
        w.write_var_utf8_string(&self.body)
    }
}

/// Hands out at most `step` bytes per read, like a congested socket.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Accepts at most `step` bytes per write.
struct Narrow {
    out: Vec<u8>,
    step: usize,
}

impl io::Write for Narrow {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step);
        self.out.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn messages() -> Vec<Message> {
    (0..20)
        .map(|id| Message {
            id: id * 9,
            body: format!("message {id}").into(),
        })
        .collect()
}

fn encode_all(messages: &[Message]) -> Vec<u8> {
    let mut out = Vec::new();
    for message in messages {
        message.encode(&mut out).unwrap();
    }
    out
}

#[test]
fn inbound_frames_survive_tiny_reads() {
    let sent = messages();
    let bytes = encode_all(&sent);

    for step in [1, 2, 3, 7, 64] {
        let mut src = Trickle { data: &bytes, step };
        let mut ring = ByteRing::new(16);
        let mut received = Vec::new();
        loop {
            match ring.fill_from(&mut src) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => panic!("transport error: {e}"),
            }
            received.extend(ring.decode_available::<Message>().unwrap());
        }
        assert_eq!(received, sent, "step {step}");
        assert!(ring.is_empty());
    }
}

#[test]
fn outbound_frames_drain_through_a_narrow_writer() {
    let sent = messages();
    let mut ring = ByteRing::new(256);
    for message in &sent {
        ring.write_frame(message).unwrap();
    }

    let mut dst = Narrow {
        out: Vec::new(),
        step: 3,
    };
    let drained = ring.drain_into(&mut dst).unwrap();
    assert_eq!(drained, dst.out.len());
    assert_eq!(dst.out, encode_all(&sent));
    assert!(ring.is_empty());
}

#[test]
fn full_ring_pauses_the_transport() {
    let mut ring = ByteRing::new(4);
    let mut src: &[u8] = b"abcdef";
    assert_eq!(ring.fill_from(&mut src).unwrap(), 3);

    let err = ring.fill_from(&mut src).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    let inner = err.into_inner().unwrap().downcast::<CapacityExceeded>().unwrap();
    assert_eq!(
        *inner,
        CapacityExceeded {
            requested: 1,
            free: 0
        }
    );

    ring.skip_read(3).unwrap();
    ring.commit_read();
    assert_eq!(ring.fill_from(&mut src).unwrap(), 1);
    assert_eq!(ring.fill_from(&mut src).unwrap(), 2);
    assert_eq!(ring.read_all(), "def");
}

#[test]
fn io_copy_stops_at_the_ring_boundary() {
    let mut ring = ByteRing::new(8);
    let mut src: &[u8] = b"0123456789";
    let err = io::copy(&mut src, &mut ring).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    assert_eq!(ring.read_all(), "0123456");
}
