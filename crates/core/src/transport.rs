//! Boundary to the RTSP transport layer.
//!
//! The connection core drives the control lifecycle but never touches the
//! wire. Request encoding, SDP parsing and `$`-framed interleaved data
//! (RFC 2326 §10.12) all live behind [`Transport`]; the core only decides
//! *when* each primitive runs and what state follows.
//!
//! ```text
//! connect:    dial ─► describe
//! get_track:  [reconnect] ─► setup_media
//! start:      play ─► handle ─► handle ─► ...
//! reconnect:  close ─► dial ─► describe ─► setup_media × tracks
//! stop:       close
//! ```

use parking_lot::Mutex;

use crate::conn::Control;
use crate::error::Result;
use crate::media::Media;

/// Transport primitives for one RTSP control connection.
///
/// All methods take `&self`: the read loop in [`handle`](Self::handle)
/// runs on the worker driving [`Conn::start`](crate::Conn::start) while
/// other callers issue SETUP through [`Conn::get_track`](crate::Conn::get_track),
/// so implementations synchronize their own socket access.
pub trait Transport: Send + Sync {
    /// Open the underlying connection.
    fn dial(&self) -> Result<()>;

    /// Fetch and parse the session description (RFC 2326 §10.2).
    fn describe(&self) -> Result<()>;

    /// Negotiate one track (RFC 2326 §10.4) and return its interleaved channel.
    fn setup_media(&self, media: &Media) -> Result<u8>;

    /// Start delivery on an established session (RFC 2326 §10.5).
    fn play(&self) -> Result<()>;

    /// Tear down the underlying connection.
    fn close(&self) -> Result<()>;

    /// Block on incoming frames until the session changes state or fails.
    ///
    /// The handler may move the connection state through `control`
    /// (e.g. to [`State::None`](crate::State::None) on TEARDOWN, or back to
    /// [`State::Setup`](crate::State::Setup) to request another PLAY). It
    /// must not hold the lock while blocking on I/O.
    fn handle(&self, control: &Mutex<Control>) -> Result<()>;
}
