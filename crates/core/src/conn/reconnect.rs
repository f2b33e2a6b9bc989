use super::{Conn, Control, Mode};
use crate::error::{Result, RtspError};
use crate::transport::Transport;

impl<T: Transport> Conn<T> {
    /// Rebuild the transport session and replay SETUP for every known track.
    ///
    /// RTSP cannot add a track to a playing session, so the client tears the
    /// session down and negotiates it again: DIAL, DESCRIBE, then SETUP for
    /// each receiver and each sender in registration order, using the media
    /// stored on the track. The first failure is returned as is and leaves
    /// the session half rebuilt; the caller should [`stop`](Self::stop) it.
    ///
    /// The control state is not changed.
    pub fn reconnect(&self) -> Result<()> {
        match self.mode {
            Mode::ActiveProducer => {}
            Mode::PassiveProducer | Mode::PassiveConsumer => {
                return Err(RtspError::InvalidMode {
                    op: "reconnect",
                    mode: self.mode,
                });
            }
        }

        let result = self.reconnect_locked(&self.control.lock());
        self.flush_events();
        result
    }

    /// Caller holds the connection lock.
    pub(super) fn reconnect_locked(&self, control: &Control) -> Result<()> {
        self.fire("RTSP reconnect");

        if let Err(e) = self.transport.close() {
            tracing::debug!(conn_id = self.info.id, error = %e, "ignoring close error before reconnect");
        }

        self.transport.dial()?;
        self.transport.describe()?;

        for track in control.receivers.iter().chain(&control.senders) {
            self.transport.setup_media(track.media())?;
        }

        tracing::info!(
            conn_id = self.info.id,
            receivers = control.receivers.len(),
            senders = control.senders.len(),
            "session re-established"
        );
        Ok(())
    }
}
