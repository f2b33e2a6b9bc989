//! Error types for the RTSP connection core.

use crate::conn::{Mode, State};

/// Errors that can occur while driving an RTSP connection.
///
/// Variants map to specific failure modes:
///
/// - **Role**: [`InvalidMode`](Self::InvalidMode) — the operation is not
///   supported by the connection's [`Mode`].
/// - **State**: [`InvalidState`](Self::InvalidState) — the operation is not
///   legal in the current [`State`].
/// - **Invariant**: [`Internal`](Self::Internal) — a combination the state
///   machine treats as unreachable was observed.
/// - **Transport**: [`Transport`](Self::Transport), [`Io`](Self::Io) —
///   failures reported by the [`Transport`](crate::transport::Transport)
///   primitives, propagated unchanged.
/// - **Tracks**: [`ChannelsExhausted`](Self::ChannelsExhausted),
///   [`TrackClosed`](Self::TrackClosed).
#[derive(Debug, thiserror::Error)]
pub enum RtspError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A transport primitive (DIAL, DESCRIBE, SETUP, PLAY, ...) failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// `op` is not supported by the connection's role.
    #[error("wrong mode for {op}: {mode}")]
    InvalidMode { op: &'static str, mode: Mode },

    /// `op` is not legal in the current control state.
    #[error("cannot {op} from {state} state")]
    InvalidState { op: &'static str, state: State },

    /// The state machine observed a combination it considers unreachable.
    #[error("internal error: {0}")]
    Internal(String),

    /// The next interleaved channel does not fit in a byte.
    #[error("interleaved channels exhausted ({tracks} tracks registered)")]
    ChannelsExhausted { tracks: usize },

    /// [`Track::close`](crate::track::Track::close) was called twice.
    #[error("track on channel {0} already closed")]
    TrackClosed(u8),

    /// Failed to (de)serialize configuration or a connection snapshot.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, RtspError>`.
pub type Result<T> = std::result::Result<T, RtspError>;
