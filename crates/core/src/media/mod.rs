//! Media descriptions consumed by the negotiator.
//!
//! A [`Media`] corresponds to one `m=` section of a session description
//! (RFC 4566 §5.14). The connection core never parses SDP itself; it only
//! needs the direction of each media, the codecs on offer, and the
//! `a=control` attribute the transport uses to address SETUP.
//!
//! ## Direction
//!
//! Direction is always expressed from the local side's point of view:
//!
//! | Direction | Local side | Example |
//! |-----------|------------|---------|
//! | `recvonly` | receives | camera video pulled by a client |
//! | `sendonly` | sends | backchannel audio pushed to a camera |
//! | `sendrecv` | both | two-way audio |

pub mod codec;

use std::fmt;

use serde::Serialize;

pub use codec::Codec;

/// Media direction attribute (RFC 4566 §6), from the local side's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    RecvOnly,
    SendOnly,
    SendRecv,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecvOnly => write!(f, "recvonly"),
            Self::SendOnly => write!(f, "sendonly"),
            Self::SendRecv => write!(f, "sendrecv"),
        }
    }
}

/// One media section of a session description.
///
/// Shared as `Arc<Media>` between the caller and the tracks negotiated for
/// it. Track caching compares media by identity (`Arc::ptr_eq`), not by
/// value: two identical `m=` lines are still two distinct tracks.
#[derive(Debug, Clone, Serialize)]
pub struct Media {
    /// Media type (`video`, `audio`, `application`).
    pub kind: String,
    pub direction: Direction,
    /// Codecs offered for this media, in preference order.
    pub codecs: Vec<Codec>,
    /// Value of the `a=control` attribute (e.g. `trackID=0`).
    pub control: String,
}

impl Media {
    /// Media without an `a=control` attribute.
    pub fn new(kind: &str, direction: Direction, codecs: Vec<Codec>) -> Self {
        Self {
            kind: kind.to_string(),
            direction,
            codecs,
            control: String::new(),
        }
    }

    pub fn with_control(mut self, control: &str) -> Self {
        self.control = control.to_string();
        self
    }

    /// First offered codec compatible with `remote`, if any.
    pub fn match_codec(&self, remote: &Codec) -> Option<&Codec> {
        self.codecs.iter().find(|codec| codec.matches(remote))
    }
}

impl fmt::Display for Media {
    /// Formats as `video, recvonly, H264, PCMA`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.kind, self.direction)?;
        for codec in &self.codecs {
            write!(f, ", {}", codec.name)?;
        }
        Ok(())
    }
}
