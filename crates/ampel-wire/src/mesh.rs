//! JSON mesh framing
//!
//! One compact JSON object per frame, dispatched on the `"t"` tag. The
//! beacon layout is fixed field-for-field:
//! `{"t":"B","id":"<label>","lid":N,"seq":N,"c":N,"am":N,"off":N,"pe":N,"lt":N}`
//! Claims and yields ride the same envelope with tags `"C"` and `"Y"`.
//!
//! Decoding tolerates reordered and unknown keys and rejects missing or
//! ill-typed fields. The carrying mesh link CRC-protects whole packets, so
//! integrity here is structural validation rather than a checksum trailer.
//! The `id` label identifies the sending unit for field diagnostics; it is
//! attached at encode and carries no protocol meaning on receive.

use ampel_core::{AmpelError, AmpelResult, Case, NodeId, Rank};
use serde::{Deserialize, Serialize};

use crate::message::{Beacon, Claim, Message, PhaseFlag, Yield};
use crate::{Codec, MAX_FRAME};

#[derive(Serialize, Deserialize)]
#[serde(tag = "t")]
enum MeshFrame {
    #[serde(rename = "B")]
    Beacon {
        id: String,
        lid: u8,
        seq: u32,
        c: u8,
        am: u8,
        off: u8,
        pe: u32,
        lt: u32,
    },
    #[serde(rename = "C")]
    Claim { id: String, nid: u8, rk: u8 },
    #[serde(rename = "Y")]
    Yield { id: String, from: u8, to: u8 },
}

/// JSON framing for the wireless mesh
#[derive(Clone, Debug, Default)]
pub struct MeshCodec {
    label: String,
}

impl MeshCodec {
    pub fn new(label: impl Into<String>) -> Self {
        MeshCodec {
            label: label.into(),
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Codec for MeshCodec {
    fn encode(&self, msg: &Message) -> AmpelResult<Vec<u8>> {
        let frame = match *msg {
            Message::Beacon(b) => MeshFrame::Beacon {
                id: self.label.clone(),
                lid: b.leader.to_byte(),
                seq: b.seq,
                c: b.case.to_byte(),
                am: b.flag.to_byte(),
                off: b.off_node.to_byte(),
                pe: b.elapsed_ms,
                lt: b.lease_ttl_ms,
            },
            Message::Claim(c) => MeshFrame::Claim {
                id: self.label.clone(),
                nid: c.node.to_byte(),
                rk: c.rank.to_byte(),
            },
            Message::Yield(y) => MeshFrame::Yield {
                id: self.label.clone(),
                from: y.from.to_byte(),
                to: y.to.to_byte(),
            },
        };
        serde_json::to_vec(&frame).map_err(|e| AmpelError::BadJson(e.to_string()))
    }

    fn decode(&self, frame: &[u8]) -> AmpelResult<Message> {
        if frame.len() > MAX_FRAME {
            return Err(AmpelError::FrameTooLong {
                len: frame.len(),
                max: MAX_FRAME,
            });
        }
        let parsed: MeshFrame =
            serde_json::from_slice(frame).map_err(|e| AmpelError::BadJson(e.to_string()))?;
        Ok(match parsed {
            MeshFrame::Beacon {
                lid,
                seq,
                c,
                am,
                off,
                pe,
                lt,
                ..
            } => Message::Beacon(Beacon {
                leader: NodeId::new(lid),
                seq,
                case: Case::saturating(c),
                flag: PhaseFlag::from_byte(am).ok_or(AmpelError::BadPhaseFlag(am))?,
                off_node: NodeId::new(off),
                lease_ttl_ms: lt,
                elapsed_ms: pe,
            }),
            MeshFrame::Claim { nid, rk, .. } => Message::Claim(Claim {
                node: NodeId::new(nid),
                rank: Rank::from_byte(rk),
            }),
            MeshFrame::Yield { from, to, .. } => Message::Yield(Yield {
                from: NodeId::new(from),
                to: NodeId::new(to),
            }),
        })
    }
}
