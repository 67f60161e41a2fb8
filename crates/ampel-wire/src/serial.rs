//! CSV-over-serial framing
//!
//! One message per line: `<kind>,<fields>*<checksum-hex>\n`. The checksum is
//! the XOR of every payload byte before the `*`.
//!
//! Layouts:
//! - `B,<leader>,<seq>,<case>,<am>,<off>,<leaseTtlMs>,<elapsedMs>*CS`
//! - `C,<id>,<rank>*CS`
//! - `Y,<from>,<to>*CS`

use ampel_core::{AmpelError, AmpelResult, Case, NodeId, Rank};

use crate::checksum::{checksum_hex, parse_checksum_hex, xor8};
use crate::message::{Beacon, Claim, Message, PhaseFlag, Yield};
use crate::{Codec, MAX_FRAME};

/// CSV framing with XOR trailer, for RS-485 and other UART links
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialCodec;

impl SerialCodec {
    pub fn new() -> Self {
        SerialCodec
    }

    fn render_payload(msg: &Message) -> String {
        match msg {
            Message::Beacon(b) => format!(
                "B,{},{},{},{},{},{},{}",
                b.leader,
                b.seq,
                b.case,
                b.flag.to_byte(),
                b.off_node,
                b.lease_ttl_ms,
                b.elapsed_ms
            ),
            Message::Claim(c) => format!("C,{},{}", c.node, c.rank),
            Message::Yield(y) => format!("Y,{},{}", y.from, y.to),
        }
    }
}

impl Codec for SerialCodec {
    fn encode(&self, msg: &Message) -> AmpelResult<Vec<u8>> {
        let payload = Self::render_payload(msg);
        let hex = checksum_hex(xor8(payload.as_bytes()));
        let mut out = Vec::with_capacity(payload.len() + 4);
        out.extend_from_slice(payload.as_bytes());
        out.push(b'*');
        out.extend_from_slice(&hex);
        out.push(b'\n');
        Ok(out)
    }

    fn decode(&self, frame: &[u8]) -> AmpelResult<Message> {
        if frame.len() > MAX_FRAME {
            return Err(AmpelError::FrameTooLong {
                len: frame.len(),
                max: MAX_FRAME,
            });
        }
        // UART receivers leave CR/whitespace tails on lines
        let frame = trim_line(frame);
        let star = frame
            .iter()
            .rposition(|&b| b == b'*')
            .ok_or(AmpelError::TruncatedFrame)?;
        let (payload, trailer) = (&frame[..star], &frame[star + 1..]);
        let transmitted = parse_checksum_hex(trailer).ok_or_else(|| AmpelError::BadField {
            field: "checksum",
            value: String::from_utf8_lossy(trailer).into_owned(),
        })?;
        let computed = xor8(payload);
        if computed != transmitted {
            return Err(AmpelError::ChecksumMismatch {
                computed,
                transmitted,
            });
        }
        parse_payload(payload)
    }
}

fn trim_line(mut frame: &[u8]) -> &[u8] {
    while let [rest @ .., last] = frame {
        if matches!(last, b'\n' | b'\r' | b' ' | b'\t') {
            frame = rest;
        } else {
            break;
        }
    }
    frame
}

fn parse_payload(payload: &[u8]) -> AmpelResult<Message> {
    if payload.len() < 2 || payload[1] != b',' {
        return Err(AmpelError::TruncatedFrame);
    }
    let kind = payload[0];
    let text = std::str::from_utf8(&payload[2..]).map_err(|_| AmpelError::BadField {
        field: "payload",
        value: String::from_utf8_lossy(payload).into_owned(),
    })?;
    let fields: Vec<&str> = text.split(',').collect();

    match kind {
        b'B' => {
            if fields.len() != 7 {
                return Err(AmpelError::BadFieldCount {
                    kind: 'B',
                    got: fields.len(),
                });
            }
            let am = parse_u8("am", fields[3])?;
            Ok(Message::Beacon(Beacon {
                leader: NodeId::new(parse_u8("leader", fields[0])?),
                seq: parse_u32("seq", fields[1])?,
                // Out-of-range case values clamp instead of killing the frame
                case: Case::saturating(parse_u8("case", fields[2])?),
                flag: PhaseFlag::from_byte(am).ok_or(AmpelError::BadPhaseFlag(am))?,
                off_node: NodeId::new(parse_u8("off", fields[4])?),
                lease_ttl_ms: parse_u32("leaseTtl", fields[5])?,
                elapsed_ms: parse_u32("elapsed", fields[6])?,
            }))
        }
        b'C' => {
            if fields.len() != 2 {
                return Err(AmpelError::BadFieldCount {
                    kind: 'C',
                    got: fields.len(),
                });
            }
            Ok(Message::Claim(Claim {
                node: NodeId::new(parse_u8("id", fields[0])?),
                rank: Rank::from_byte(parse_u8("rank", fields[1])?),
            }))
        }
        b'Y' => {
            if fields.len() != 2 {
                return Err(AmpelError::BadFieldCount {
                    kind: 'Y',
                    got: fields.len(),
                });
            }
            Ok(Message::Yield(Yield {
                from: NodeId::new(parse_u8("from", fields[0])?),
                to: NodeId::new(parse_u8("to", fields[1])?),
            }))
        }
        other => Err(AmpelError::UnknownKind(other)),
    }
}

fn parse_u8(field: &'static str, s: &str) -> AmpelResult<u8> {
    s.parse().map_err(|_| AmpelError::BadField {
        field,
        value: s.to_owned(),
    })
}

fn parse_u32(field: &'static str, s: &str) -> AmpelResult<u32> {
    s.parse().map_err(|_| AmpelError::BadField {
        field,
        value: s.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_beacon() -> Beacon {
        Beacon {
            leader: NodeId::new(0),
            seq: 5,
            case: Case::C2,
            flag: PhaseFlag::Amber,
            off_node: NodeId::new(0),
            lease_ttl_ms: 9_000,
            elapsed_ms: 1_234,
        }
    }

    #[test]
    fn test_beacon_golden_line() {
        let codec = SerialCodec::new();
        let bytes = codec.encode(&sample_beacon().into()).unwrap();
        assert_eq!(bytes, b"B,0,5,2,1,0,9000,1234*55\n");
    }

    #[test]
    fn test_claim_golden_line() {
        let codec = SerialCodec::new();
        let msg = Message::Claim(Claim {
            node: NodeId::new(1),
            rank: Rank::new(1),
        });
        assert_eq!(codec.encode(&msg).unwrap(), b"C,1,1*43\n");
    }

    #[test]
    fn test_yield_golden_line() {
        let codec = SerialCodec::new();
        let msg = Message::Yield(Yield {
            from: NodeId::new(1),
            to: NodeId::new(0),
        });
        assert_eq!(codec.encode(&msg).unwrap(), b"Y,1,0*58\n");
    }

    #[test]
    fn test_roundtrip_all_kinds() {
        let codec = SerialCodec::new();
        let msgs = [
            Message::from(sample_beacon()),
            Message::Claim(Claim {
                node: NodeId::new(2),
                rank: Rank::new(2),
            }),
            Message::Yield(Yield {
                from: NodeId::new(0),
                to: NodeId::new(1),
            }),
        ];
        for msg in msgs {
            let bytes = codec.encode(&msg).unwrap();
            assert_eq!(codec.decode(&bytes).unwrap(), msg);
        }
    }

    #[test]
    fn test_decode_tolerates_cr_and_missing_newline() {
        let codec = SerialCodec::new();
        let msg = Message::from(sample_beacon());
        assert_eq!(codec.decode(b"B,0,5,2,1,0,9000,1234*55\r\n").unwrap(), msg);
        assert_eq!(codec.decode(b"B,0,5,2,1,0,9000,1234*55").unwrap(), msg);
    }

    #[test]
    fn test_single_byte_flip_is_rejected() {
        let codec = SerialCodec::new();
        let bytes = codec.encode(&sample_beacon().into()).unwrap();
        let payload_len = bytes.iter().position(|&b| b == b'*').unwrap();
        for i in 0..payload_len {
            for mask in [0x01u8, 0x80] {
                let mut corrupted = bytes.clone();
                corrupted[i] ^= mask;
                assert!(
                    codec.decode(&corrupted).is_err(),
                    "flip at byte {} mask {:02X} must not decode",
                    i,
                    mask
                );
            }
        }
    }

    #[test]
    fn test_decode_rejects_checksum_mismatch() {
        let codec = SerialCodec::new();
        let err = codec.decode(b"C,1,1*44\n").unwrap_err();
        assert!(matches!(err, AmpelError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_malformed_lines() {
        let codec = SerialCodec::new();
        assert!(codec.decode(b"").is_err());
        assert!(codec.decode(b"\n").is_err());
        assert!(codec.decode(b"B,0,5,2,1,0,9000,1234").is_err()); // no trailer
        assert!(codec.decode(b"garbage*00\n").is_err());
        // Wrong field counts, checksums recomputed to isolate the count check
        assert!(matches!(
            codec.decode(&with_checksum(b"C,1")),
            Err(AmpelError::BadFieldCount { kind: 'C', got: 1 })
        ));
        assert!(matches!(
            codec.decode(&with_checksum(b"B,0,5,2,1,0,9000,1234,9")),
            Err(AmpelError::BadFieldCount { kind: 'B', got: 8 })
        ));
        // Non-numeric field
        assert!(matches!(
            codec.decode(&with_checksum(b"C,one,1")),
            Err(AmpelError::BadField { field: "id", .. })
        ));
        // Unknown kind
        assert!(matches!(
            codec.decode(&with_checksum(b"Q,1,2")),
            Err(AmpelError::UnknownKind(b'Q'))
        ));
    }

    #[test]
    fn test_decode_clamps_out_of_range_case() {
        let codec = SerialCodec::new();
        let line = with_checksum(b"B,0,5,9,0,0,9000,1234");
        match codec.decode(&line).unwrap() {
            Message::Beacon(b) => assert_eq!(b.case, Case::DEFAULT),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_bad_phase_flag() {
        let codec = SerialCodec::new();
        let line = with_checksum(b"B,0,5,2,7,0,9000,1234");
        assert!(matches!(
            codec.decode(&line),
            Err(AmpelError::BadPhaseFlag(7))
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_frame() {
        let codec = SerialCodec::new();
        let huge = vec![b'B'; MAX_FRAME + 1];
        assert!(matches!(
            codec.decode(&huge),
            Err(AmpelError::FrameTooLong { .. })
        ));
    }

    fn with_checksum(payload: &[u8]) -> Vec<u8> {
        let hex = checksum_hex(xor8(payload));
        let mut out = payload.to_vec();
        out.push(b'*');
        out.extend_from_slice(&hex);
        out.push(b'\n');
        out
    }
}
