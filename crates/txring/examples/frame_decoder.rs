//! Decodes a stream of game-server packets that arrives in irregular chunks.
//!
//! Each packet starts with a one-byte type. A packet can straddle any number
//! of transport reads; the decoder simply tries again after every read and a
//! half-received packet is left in the ring untouched until the rest of it
//! arrives.
//!
//! Run with
//!
//! ```bash
//! cargo run -p txring --example frame_decoder
//! ```

use txring::{
    ByteRing, CapacityExceeded, Decode, Encode, Incomplete, InsufficientData, RingOptions,
    WireRead, WireWrite,
};

#[derive(Debug)]
enum Packet {
    Login { entity: i32, name: String },
    Chat(String),
    Move { dx: f32, dy: f32, on_ground: bool },
    Disconnect(String),
}

#[derive(Debug, thiserror::Error)]
enum PacketError {
    #[error(transparent)]
    Short(#[from] InsufficientData),
    #[error("unknown packet type {0:#04x}")]
    UnknownType(u8),
}

impl Incomplete for PacketError {
    fn is_incomplete(&self) -> bool {
        matches!(self, PacketError::Short(_))
    }
}

impl Decode for Packet {
    type Error = PacketError;

    fn decode<R: WireRead + ?Sized>(r: &mut R) -> Result<Self, Self::Error> {
        Ok(match r.read_byte()? {
            0x01 => Packet::Login {
                entity: r.read_be_i32()?,
                name: r.read_be_utf16_string16()?,
            },
            0x03 => Packet::Chat(r.read_be_utf16_string16()?),
            0x0a => Packet::Move {
                dx: r.read_be_f32()?,
                dy: r.read_be_f32()?,
                on_ground: r.read_bool()?,
            },
            0xff => Packet::Disconnect(r.read_be_utf16_string16()?),
            other => return Err(PacketError::UnknownType(other)),
        })
    }
}

impl Encode for Packet {
    fn encode<W: WireWrite + ?Sized>(&self, w: &mut W) -> Result<(), CapacityExceeded> {
        match self {
            Packet::Login { entity, name } => {
                w.write_byte(0x01)?;
                w.write_be_i32(*entity)?;
                w.write_be_utf16_string16(name)
            }
            Packet::Chat(text) => {
                w.write_byte(0x03)?;
                w.write_be_utf16_string16(text)
            }
            Packet::Move { dx, dy, on_ground } => {
                w.write_byte(0x0a)?;
                w.write_be_f32(*dx)?;
                w.write_be_f32(*dy)?;
                w.write_bool(*on_ground)
            }
            Packet::Disconnect(reason) => {
                w.write_byte(0xff)?;
                w.write_be_utf16_string16(reason)
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // What the server sends, encoded up front. In real life this would come
    // from a socket.
    let mut wire = Vec::new();
    for packet in [
        Packet::Login {
            entity: 42,
            name: "Steve".into(),
        },
        Packet::Chat("welcome to the server \u{2603}".into()),
        Packet::Move {
            dx: 0.25,
            dy: -1.0,
            on_ground: false,
        },
        Packet::Disconnect("bye".into()),
    ] {
        packet.encode(&mut wire)?;
    }

    // Small enough that the stream wraps around storage.
    let mut ring = ByteRing::with_options(RingOptions {
        size: 64,
        ..RingOptions::default()
    });

    let chunk_sizes = [3, 9, 1, 20, 7, 30, 2, 11];
    let mut transport = wire.as_slice();
    for size in chunk_sizes.iter().cycle() {
        let (chunk, rest) = transport.split_at((*size).min(transport.len()));
        transport = rest;

        let mut src = chunk;
        while !src.is_empty() {
            // a chunk can land across the end of storage, taking two reads
            ring.fill_from(&mut src)?;
        }
        println!(
            "read {:>2} bytes, {:>2} buffered",
            chunk.len(),
            ring.readable_space()
        );

        for packet in ring.decode_available::<Packet>()? {
            println!("  -> {packet:?}");
            if let Packet::Disconnect(_) = packet {
                return Ok(());
            }
        }

        if transport.is_empty() {
            break;
        }
    }

    Err("stream ended mid-packet".into())
}
