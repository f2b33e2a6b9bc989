use serde::Serialize;

pub const H264: &str = "H264";
pub const H265: &str = "H265";
pub const PCMA: &str = "PCMA";
pub const PCMU: &str = "PCMU";
pub const OPUS: &str = "OPUS";
pub const AAC: &str = "MPEG4-GENERIC";

/// Matches any codec name when used on the requesting side.
pub const ANY: &str = "ANY";
/// Matches any codec name when used on the requesting side.
pub const ALL: &str = "ALL";

/// A codec as described by an SDP `a=rtpmap` / `a=fmtp` pair (RFC 4566 §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Codec {
    /// Encoding name from `a=rtpmap` (e.g. `H264`, `PCMA`).
    pub name: String,
    /// RTP clock rate in Hz. Zero means unspecified.
    pub clock_rate: u32,
    /// Audio channel count. Zero means unspecified.
    pub channels: u16,
    /// RTP payload type (RFC 3551).
    pub payload_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fmtp: Option<String>,
}

impl Codec {
    /// Codec with no channel count, payload type or fmtp set.
    pub fn new(name: &str, clock_rate: u32) -> Self {
        Self {
            name: name.to_string(),
            clock_rate,
            channels: 0,
            payload_type: 0,
            fmtp: None,
        }
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_payload_type(mut self, payload_type: u8) -> Self {
        self.payload_type = payload_type;
        self
    }

    pub fn with_fmtp(mut self, fmtp: &str) -> Self {
        self.fmtp = Some(fmtp.to_string());
        self
    }

    /// Whether this codec satisfies a `remote` request.
    ///
    /// Names must be equal byte for byte, and [`ANY`]/[`ALL`] on the remote
    /// side match every name. A zero clock rate or channel count on the remote
    /// side acts as a wildcard for that field.
    pub fn matches(&self, remote: &Codec) -> bool {
        if remote.name == ANY || remote.name == ALL {
            return true;
        }

        self.name == remote.name
            && (remote.clock_rate == 0 || self.clock_rate == remote.clock_rate)
            && (remote.channels == 0 || self.channels == remote.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_same_codec() {
        let local = Codec::new(H264, 90000).with_payload_type(96);
        assert!(local.matches(&Codec::new(H264, 90000)));
    }

    #[test]
    fn names_compare_exactly() {
        assert!(!Codec::new(OPUS, 48000).matches(&Codec::new("opus", 48000)));
    }

    #[test]
    fn zero_fields_are_wildcards() {
        let local = Codec::new(OPUS, 48000).with_channels(2);
        assert!(local.matches(&Codec::new(OPUS, 0)));
        assert!(local.matches(&Codec::new(OPUS, 48000)));
        assert!(!local.matches(&Codec::new(OPUS, 48000).with_channels(1)));
    }

    #[test]
    fn clock_rate_mismatch() {
        assert!(!Codec::new(PCMA, 8000).matches(&Codec::new(PCMA, 16000)));
    }

    #[test]
    fn any_matches_everything() {
        assert!(Codec::new(H265, 90000).matches(&Codec::new(ANY, 0)));
        assert!(Codec::new(PCMU, 8000).matches(&Codec::new(ALL, 44100)));
    }
}
