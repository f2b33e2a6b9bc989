use std::sync::Arc;

use super::{Conn, Mode, State};
use crate::error::{Result, RtspError};
use crate::media::{Codec, Direction, Media};
use crate::track::Track;
use crate::transport::Transport;

/// Interleaved channel for the next track when `count` tracks of the same
/// kind are already registered.
///
/// Each track takes an even channel for RTP and leaves the odd one after it
/// for its RTCP companion (RFC 2326 §10.12), so the Nth track gets `2N`.
/// Used in server mode, where no SETUP response assigns the channel.
pub fn interleaved_channel(count: usize) -> Result<u8> {
    count
        .checked_mul(2)
        .and_then(|channel| u8::try_from(channel).ok())
        .ok_or(RtspError::ChannelsExhausted { tracks: count })
}

impl<T: Transport> Conn<T> {
    /// Return a track for `media`/`codec`, negotiating it if needed.
    ///
    /// Receive-only media already negotiated with a compatible codec is served
    /// from the registry without another SETUP. Otherwise:
    ///
    /// - **Client**: a playing session is rebuilt first ([`reconnect`](Self::reconnect)),
    ///   then SETUP assigns the channel and the state becomes [`State::Setup`].
    /// - **Server receiving**: channels are allocated locally with
    ///   [`interleaved_channel`].
    ///
    /// Receive-only tracks are registered as receivers. Send-only tracks are
    /// returned unregistered; the caller wraps them into a sender and passes
    /// it to [`add_sender`](Self::add_sender).
    pub fn get_track(&self, media: &Arc<Media>, codec: &Codec) -> Result<Arc<Track>> {
        let result = self.negotiate(media, codec);
        self.flush_events();
        result
    }

    fn negotiate(&self, media: &Arc<Media>, codec: &Codec) -> Result<Arc<Track>> {
        let mut control = self.control.lock();

        if media.direction == Direction::RecvOnly
            && let Some(track) = control.receivers.iter().find(|t| t.serves(media, codec))
        {
            tracing::trace!(conn_id = self.info.id, channel = track.id(), "track served from cache");
            return Ok(track.clone());
        }

        let channel = match (self.mode, media.direction) {
            (Mode::ActiveProducer, Direction::RecvOnly | Direction::SendOnly) => {
                if control.state == State::Play {
                    self.reconnect_locked(&control)?;
                }

                let channel = self.transport.setup_media(media)?;
                control.set_state(State::Setup);
                tracing::debug!(conn_id = self.info.id, channel, media = %media, "media set up");

                if media.direction == Direction::SendOnly {
                    return Ok(Arc::new(Track::new(media.clone(), codec.clone(), channel)));
                }
                channel
            }
            (Mode::ActiveProducer, Direction::SendRecv) => {
                return Err(RtspError::Internal(format!(
                    "get_track: unsupported mode/direction {}/{}",
                    self.mode, media.direction
                )));
            }
            (Mode::PassiveConsumer, Direction::RecvOnly) => {
                interleaved_channel(control.receivers.len())?
            }
            (Mode::PassiveConsumer, Direction::SendOnly | Direction::SendRecv) => {
                let channel = interleaved_channel(control.senders.len())?;
                return Ok(Arc::new(Track::new(media.clone(), codec.clone(), channel)));
            }
            (Mode::PassiveProducer, _) => {
                return Err(RtspError::InvalidMode {
                    op: "get_track",
                    mode: self.mode,
                });
            }
        };

        let track = Arc::new(Track::new(media.clone(), codec.clone(), channel));
        control.receivers.push(track.clone());
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_step_by_two() {
        assert_eq!(interleaved_channel(0).unwrap(), 0);
        assert_eq!(interleaved_channel(1).unwrap(), 2);
        assert_eq!(interleaved_channel(3).unwrap(), 6);
        assert_eq!(interleaved_channel(127).unwrap(), 254);
    }

    #[test]
    fn channels_exhausted_past_a_byte() {
        assert!(matches!(
            interleaved_channel(128),
            Err(RtspError::ChannelsExhausted { tracks: 128 })
        ));
        assert!(interleaved_channel(usize::MAX).is_err());
    }
}
