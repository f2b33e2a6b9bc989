//! RTSP connection control (RFC 2326 §A.1, §A.2).
//!
//! A [`Conn`] drives one RTSP control connection in one of three roles and
//! tracks the media channels negotiated on it.
//!
//! ## Control states
//!
//! ```text
//! connect        None  -> Conn
//! get_track      Conn  -> Setup, None -> Setup, Play -> (reconnect) -> Setup
//! start          Setup -> Play
//! handle         Play  -> None (teardown) | Setup (replay PLAY)
//! stop           *     -> None
//! ```
//!
//! ## Locking
//!
//! The state and both track registries live in one [`Control`] behind a
//! single mutex. [`get_track`](Conn::get_track) and
//! [`reconnect`](Conn::reconnect) hold it across blocking SETUP/DIAL calls:
//! the control channel is one serialized command stream. Only the
//! frame handler in [`start`](Conn::start) runs unlocked.

mod negotiate;
mod reconnect;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use crate::config::StreamsConfig;
use crate::error::{Result, RtspError};
use crate::info::ConnectionInfo;
use crate::track::Track;
use crate::transport::Transport;

pub use negotiate::interleaved_channel;

/// Role of the local side, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Client: dials the server, pulls media and may push a backchannel.
    ActiveProducer,
    /// Server pushing media to a connected client.
    PassiveProducer,
    /// Server receiving media from a connected client (e.g. ANNOUNCE/RECORD).
    PassiveConsumer,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveProducer => write!(f, "active producer"),
            Self::PassiveProducer => write!(f, "passive producer"),
            Self::PassiveConsumer => write!(f, "passive consumer"),
        }
    }
}

/// Control-channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// No session.
    #[default]
    None,
    /// Transport dialed, handshake in progress.
    Conn,
    /// At least one track negotiated; ready for PLAY.
    Setup,
    /// Media is flowing.
    Play,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Conn => write!(f, "CONN"),
            Self::Setup => write!(f, "SETUP"),
            Self::Play => write!(f, "PLAY"),
        }
    }
}

/// Mutable connection state guarded by the connection lock.
#[derive(Debug, Default)]
pub struct Control {
    state: State,
    receivers: Vec<Arc<Track>>,
    senders: Vec<Arc<Track>>,
}

impl Control {
    /// Current control state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Transition to `state`, logging the change.
    pub fn set_state(&mut self, state: State) {
        if self.state != state {
            tracing::debug!(old_state = %self.state, new_state = %state, "state transition");
        }
        self.state = state;
    }

    /// Inbound tracks, in registration order.
    pub fn receivers(&self) -> &[Arc<Track>] {
        &self.receivers
    }

    /// Outbound tracks, in registration order.
    pub fn senders(&self) -> &[Arc<Track>] {
        &self.senders
    }
}

/// Sink for lifecycle events such as `"RTSP reconnect"`.
pub type EventHandler = Box<dyn Fn(&str) + Send + Sync>;

/// One RTSP control connection.
///
/// Shared as `Arc<Conn<T>>` between the worker running [`start`](Self::start)
/// and callers negotiating tracks or stopping the connection.
pub struct Conn<T> {
    mode: Mode,
    transport: T,
    control: Mutex<Control>,
    info: ConnectionInfo,
    config: Arc<StreamsConfig>,
    on_event: Option<EventHandler>,
    /// Events raised while `control` is held, delivered once it is released.
    pending_events: Mutex<Vec<String>>,
}

impl<T: Transport> Conn<T> {
    /// Create an idle connection in the given role with default config.
    pub fn new(mode: Mode, transport: T) -> Self {
        Self {
            mode,
            transport,
            control: Mutex::new(Control::default()),
            info: ConnectionInfo::default(),
            config: Arc::new(StreamsConfig::default()),
            on_event: None,
            pending_events: Mutex::new(Vec::new()),
        }
    }

    /// Replace the descriptor reported by the JSON snapshot.
    pub fn with_info(mut self, info: ConnectionInfo) -> Self {
        self.info = info;
        self
    }

    /// Use a shared stream configuration.
    pub fn with_config(mut self, config: Arc<StreamsConfig>) -> Self {
        self.config = config;
        self
    }

    /// Install the sink for lifecycle events.
    ///
    /// The handler is never called while the connection lock is held, so it
    /// may call back into the `Conn` (e.g. [`state`](Self::state)).
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_event = Some(Box::new(handler));
        self
    }

    /// Role fixed at construction.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current control state.
    pub fn state(&self) -> State {
        self.control.lock().state
    }

    /// Snapshot of the inbound tracks.
    pub fn receivers(&self) -> Vec<Arc<Track>> {
        self.control.lock().receivers.clone()
    }

    /// Snapshot of the outbound tracks.
    pub fn senders(&self) -> Vec<Arc<Track>> {
        self.control.lock().senders.clone()
    }

    /// Connection descriptor.
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Inactivity timeout for the backchannel monitor; zero means disabled.
    pub fn backchannel_inactivity_timeout(&self) -> Duration {
        self.config.backchannel_inactivity_timeout()
    }

    /// Dial the server and fetch its session description.
    ///
    /// Client only. Leaves the connection in [`State::Conn`]; the first
    /// [`get_track`](Self::get_track) moves it on to [`State::Setup`].
    pub fn connect(&self) -> Result<()> {
        match self.mode {
            Mode::ActiveProducer => {}
            Mode::PassiveProducer | Mode::PassiveConsumer => {
                return Err(RtspError::InvalidMode {
                    op: "connect",
                    mode: self.mode,
                });
            }
        }

        let mut control = self.control.lock();
        if control.state != State::None {
            return Err(RtspError::InvalidState {
                op: "connect",
                state: control.state,
            });
        }

        self.transport.dial()?;
        control.set_state(State::Conn);
        self.transport.describe()?;

        tracing::info!(conn_id = self.info.id, url = ?self.info.url, "connected");
        Ok(())
    }

    /// Register an outbound track built from a [`get_track`](Self::get_track)
    /// result. Registered senders are replayed on reconnect and closed on stop.
    pub fn add_sender(&self, track: Arc<Track>) {
        let mut control = self.control.lock();
        tracing::debug!(conn_id = self.info.id, channel = track.id(), "sender registered");
        control.senders.push(track);
    }

    /// Run the connection until it stops or fails.
    ///
    /// Issues PLAY whenever the connection is in [`State::Setup`] (client
    /// only), then blocks in [`Transport::handle`]. The state the handler
    /// leaves behind decides what happens next:
    ///
    /// - `None`: stopped, returns `Ok(())`.
    /// - `Setup`: PLAY again (e.g. after a reconnect added a track).
    /// - `Play`: the session broke, returns the handler's result.
    pub fn start(&self) -> Result<()> {
        match self.mode {
            Mode::ActiveProducer | Mode::PassiveProducer => {}
            Mode::PassiveConsumer => {
                return Err(RtspError::InvalidMode {
                    op: "start",
                    mode: self.mode,
                });
            }
        }

        let mut handled: Option<Result<()>> = None;

        loop {
            {
                let mut control = self.control.lock();
                match control.state {
                    State::None => {
                        if let Some(result) = handled.take() {
                            if let Err(e) = result {
                                tracing::debug!(conn_id = self.info.id, error = %e, "handler exited after stop");
                            }
                            return Ok(());
                        }
                    }
                    State::Conn => {
                        return Err(RtspError::InvalidState {
                            op: "start",
                            state: State::Conn,
                        });
                    }
                    State::Setup => {
                        match self.mode {
                            Mode::ActiveProducer => self.transport.play()?,
                            Mode::PassiveProducer => {}
                            Mode::PassiveConsumer => {
                                return Err(RtspError::InvalidMode {
                                    op: "start",
                                    mode: self.mode,
                                });
                            }
                        }
                        control.set_state(State::Play);
                    }
                    State::Play => {
                        return handled.take().unwrap_or_else(|| {
                            Err(RtspError::Internal(
                                "start called on a playing connection".to_string(),
                            ))
                        });
                    }
                }
            }

            handled = Some(self.transport.handle(&self.control));
        }
    }

    /// Close every track and the transport.
    ///
    /// Tracks are drained and closed under the connection lock, so a
    /// concurrent `get_track` either registers its track before the drain
    /// (and it is closed here) or runs afterwards against an empty registry.
    /// A failing track close does not stop the pass; the transport close
    /// result is returned.
    pub fn stop(&self) -> Result<()> {
        let mut control = self.control.lock();

        let receivers = std::mem::take(&mut control.receivers);
        let senders = std::mem::take(&mut control.senders);
        for track in receivers.iter().chain(&senders) {
            if let Err(e) = track.close() {
                tracing::warn!(conn_id = self.info.id, channel = track.id(), error = %e, "track close failed");
            }
        }

        if control.state == State::None {
            return Ok(());
        }

        control.set_state(State::None);
        tracing::info!(conn_id = self.info.id, "connection stopped");
        self.transport.close()
    }

    /// Queue an event. Callers may hold the connection lock; delivery
    /// happens in [`flush_events`](Self::flush_events).
    fn fire(&self, event: &str) {
        tracing::debug!(conn_id = self.info.id, event, "event");
        if self.on_event.is_some() {
            self.pending_events.lock().push(event.to_string());
        }
    }

    /// Deliver queued events. Must be called without the connection lock.
    fn flush_events(&self) {
        let Some(handler) = &self.on_event else {
            return;
        };
        let events = std::mem::take(&mut *self.pending_events.lock());
        for event in &events {
            handler(event);
        }
    }
}

impl<T> Serialize for Conn<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.info.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(State::Conn.to_string(), "CONN");
        assert_eq!(State::default(), State::None);
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::PassiveConsumer.to_string(), "passive consumer");
    }

    #[test]
    fn invalid_state_message() {
        let err = RtspError::InvalidState {
            op: "start",
            state: State::Conn,
        };
        assert_eq!(err.to_string(), "cannot start from CONN state");
    }
}
