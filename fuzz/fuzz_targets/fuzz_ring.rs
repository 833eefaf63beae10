#![no_main]
use std::collections::VecDeque;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use txring::{ByteRing, RingOptions, WireRead, WireWrite};

#[derive(Debug, Arbitrary)]
enum Op {
    Write(Vec<u8>),
    ReadBuf(u8),
    Skip(u8),
    Advance(u8),
    BeI32,
    BeF64,
    VarU32,
    Utf16String,
    VarString,
    WriteUtf16(String),
    WriteVarString(Vec<u8>),
    ReadAll,
    Commit,
    Reset,
}

#[derive(Debug, Arbitrary)]
struct Input {
    size: u8,
    ops: Vec<Op>,
}

/// The committed-but-unread and uncommitted bytes, plus how many of them the
/// read cursor has already passed.
struct Model {
    live: VecDeque<u8>,
    consumed: usize,
}

impl Model {
    fn readable(&self) -> Vec<u8> {
        self.live.iter().skip(self.consumed).copied().collect()
    }
}

/// Runs a typed read and checks it either consumed exactly what the model
/// says it should, or failed without moving anything.
fn check_read<T>(
    ring: &mut ByteRing,
    model: &mut Model,
    read: impl FnOnce(&mut ByteRing) -> Result<T, txring::InsufficientData>,
) {
    let before = ring.readable_space();
    match read(ring) {
        Ok(_) => {
            let used = before - ring.readable_space();
            assert!(used > 0, "successful read consumed nothing");
            model.consumed += used;
        }
        Err(err) => {
            assert_eq!(ring.readable_space(), before, "failed read moved the cursor");
            assert_eq!(err.available, before);
            assert!(err.needed > err.available);
        }
    }
}

fn run(input: Input) {
    let mut ring = ByteRing::with_options(RingOptions {
        size: 1 + usize::from(input.size),
        verify_cursors: true,
    });
    let mut model = Model {
        live: VecDeque::new(),
        consumed: 0,
    };

    for op in input.ops {
        match op {
            Op::Write(bytes) => {
                let fits = bytes.len() <= ring.free_space();
                assert_eq!(ring.write(&bytes).is_ok(), fits);
                if fits {
                    model.live.extend(bytes);
                }
            }
            Op::ReadBuf(n) => {
                let mut buf = vec![0u8; usize::from(n)];
                let expected = model.readable();
                match ring.read_buf(&mut buf) {
                    Ok(()) => {
                        assert_eq!(buf, expected[..buf.len()]);
                        model.consumed += buf.len();
                    }
                    Err(_) => assert!(buf.len() > expected.len()),
                }
            }
            Op::Skip(n) => {
                let n = usize::from(n);
                let ok = n <= ring.readable_space();
                assert_eq!(ring.skip_read(n).is_ok(), ok);
                if ok {
                    model.consumed += n;
                }
            }
            Op::Advance(n) => {
                let n = usize::from(n).min(ring.readable_space());
                ring.advance_read_pos(n);
                model.consumed += n;
            }
            Op::BeI32 => check_read(&mut ring, &mut model, WireRead::read_be_i32),
            Op::BeF64 => check_read(&mut ring, &mut model, WireRead::read_be_f64),
            Op::VarU32 => check_read(&mut ring, &mut model, WireRead::read_var_u32),
            Op::Utf16String => {
                check_read(&mut ring, &mut model, WireRead::read_be_utf16_string16);
            }
            Op::VarString => check_read(&mut ring, &mut model, WireRead::read_var_utf8_string),
            Op::WriteUtf16(text) => {
                if text.encode_utf16().count() > usize::from(u16::MAX) {
                    continue;
                }
                let mut encoded = Vec::new();
                encoded.write_be_utf16_string16(&text).unwrap();
                let fits = encoded.len() <= ring.free_space();
                assert_eq!(ring.write_be_utf16_string16(&text).is_ok(), fits);
                if fits {
                    model.live.extend(encoded);
                }
            }
            Op::WriteVarString(bytes) => {
                let mut encoded = Vec::new();
                encoded.write_var_utf8_string(&bytes).unwrap();
                let fits = encoded.len() <= ring.free_space();
                assert_eq!(ring.write_var_utf8_string(&bytes).is_ok(), fits);
                if fits {
                    model.live.extend(encoded);
                }
            }
            Op::ReadAll => {
                assert_eq!(ring.read_all(), model.readable());
                model.consumed = model.live.len();
            }
            Op::Commit => {
                ring.commit_read();
                model.live.drain(..model.consumed);
                model.consumed = 0;
            }
            Op::Reset => {
                ring.reset_read();
                model.consumed = 0;
            }
        }

        assert_eq!(ring.used_space(), model.live.len());
        assert_eq!(ring.readable_space(), model.live.len() - model.consumed);
        assert_eq!(ring.free_space(), ring.capacity() - model.live.len());
        assert!(ring.cursors().is_valid());
    }
}

fuzz_target!(|input: Input| run(input));
