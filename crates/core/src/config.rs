use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Used when no positive inactivity timeout is configured: monitor disabled.
pub const DEFAULT_BACKCHANNEL_INACTIVITY_TIMEOUT: Duration = Duration::ZERO;

/// Stream-level configuration shared by every connection.
///
/// Loading the file is the host process's concern; this type only defines
/// the shape:
///
/// ```
/// use rtsp::config::StreamsConfig;
/// use std::time::Duration;
///
/// let cfg = StreamsConfig::from_json(r#"{"backchannel":{"inactivity_timeout":30}}"#).unwrap();
/// assert_eq!(cfg.backchannel_inactivity_timeout(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamsConfig {
    pub backchannel: BackchannelConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackchannelConfig {
    /// Seconds without outgoing backchannel media before the track is
    /// considered inactive. Zero or negative disables the monitor.
    pub inactivity_timeout: f64,
}

impl StreamsConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Inactivity timeout for backchannel tracks; zero means disabled.
    pub fn backchannel_inactivity_timeout(&self) -> Duration {
        let secs = self.backchannel.inactivity_timeout;
        if secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            DEFAULT_BACKCHANNEL_INACTIVITY_TIMEOUT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_is_disabled() {
        let cfg = StreamsConfig::default();
        assert_eq!(cfg.backchannel_inactivity_timeout(), Duration::ZERO);

        let cfg = StreamsConfig::from_json("{}").unwrap();
        assert_eq!(cfg.backchannel_inactivity_timeout(), Duration::ZERO);
    }

    #[test]
    fn positive_value_is_used() {
        let cfg = StreamsConfig::from_json(r#"{"backchannel":{"inactivity_timeout":2.5}}"#).unwrap();
        assert_eq!(
            cfg.backchannel_inactivity_timeout(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn non_positive_value_disables() {
        for raw in ["0", "-5"] {
            let json = format!(r#"{{"backchannel":{{"inactivity_timeout":{raw}}}}}"#);
            let cfg = StreamsConfig::from_json(&json).unwrap();
            assert_eq!(cfg.backchannel_inactivity_timeout(), Duration::ZERO);
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(StreamsConfig::from_json(r#"{"backchannel":{"inactivity_timeout":"soon"}}"#).is_err());
    }
}
