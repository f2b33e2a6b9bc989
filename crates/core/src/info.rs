use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static CONNECTION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Descriptor of a connection, as reported to API consumers.
///
/// [`Conn`](crate::Conn) serializes as this struct; nothing about the
/// control state leaks into the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    /// Process-unique, auto-incrementing identifier.
    pub id: u64,
    pub format_name: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    /// Stream source this connection was opened for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Raw session description, once DESCRIBE (or ANNOUNCE) has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp: Option<String>,
}

impl ConnectionInfo {
    /// Descriptor with a fresh id and no addressing details.
    pub fn new(protocol: &str) -> Self {
        Self {
            id: CONNECTION_COUNTER.fetch_add(1, Ordering::SeqCst),
            format_name: "rtsp".to_string(),
            protocol: protocol.to_string(),
            remote_addr: None,
            source: None,
            url: None,
            user_agent: None,
            sdp: None,
        }
    }

    pub fn with_remote_addr(mut self, addr: &str) -> Self {
        self.remote_addr = Some(addr.to_string());
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn with_sdp(mut self, sdp: &str) -> Self {
        self.sdp = Some(sdp.to_string());
        self
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self::new("rtsp+tcp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ConnectionInfo::default();
        let b = ConnectionInfo::default();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn unset_fields_are_omitted() {
        let info = ConnectionInfo::default().with_url("rtsp://10.0.0.1:554/live");
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["format_name"], "rtsp");
        assert_eq!(value["protocol"], "rtsp+tcp");
        assert_eq!(value["url"], "rtsp://10.0.0.1:554/live");
        assert!(value.get("remote_addr").is_none());
        assert!(value.get("sdp").is_none());
    }
}
