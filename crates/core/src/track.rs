use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{Result, RtspError};
use crate::media::{Codec, Media};

/// One negotiated media channel (a receiver or a sender).
///
/// Created by [`Conn::get_track`](crate::Conn::get_track) and owned by the
/// connection's registry afterwards. The interleaved channel `id` is fixed
/// at SETUP time; the companion control stream uses `id + 1`
/// (RFC 2326 §10.12).
pub struct Track {
    media: Arc<Media>,
    codec: Codec,
    id: u8,
    closed: AtomicBool,
    on_close: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl Track {
    /// Track on interleaved channel `id`.
    pub fn new(media: Arc<Media>, codec: Codec, id: u8) -> Self {
        tracing::debug!(channel = id, media = %media, codec = %codec.name, "track created");
        Self {
            media,
            codec,
            id,
            closed: AtomicBool::new(false),
            on_close: Mutex::new(Vec::new()),
        }
    }

    /// Run `hook` when the track is closed, e.g. to release a consumer
    /// reading from it. Hooks run in registration order, once.
    pub fn on_close<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_close.lock().push(Box::new(hook));
    }

    pub fn media(&self) -> &Arc<Media> {
        &self.media
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Interleaved channel assigned at SETUP.
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Close the track. Only the first call succeeds.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(RtspError::TrackClosed(self.id));
        }
        tracing::debug!(channel = self.id, "track closed");

        let hooks = std::mem::take(&mut *self.on_close.lock());
        for hook in hooks {
            hook();
        }
        Ok(())
    }

    /// Cache key: same media instance and a compatible codec.
    pub(crate) fn serves(&self, media: &Arc<Media>, codec: &Codec) -> bool {
        Arc::ptr_eq(&self.media, media) && self.codec.matches(codec)
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("media", &self.media)
            .field("codec", &self.codec)
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{Direction, codec};

    fn audio() -> Arc<Media> {
        Arc::new(Media::new(
            "audio",
            Direction::RecvOnly,
            vec![Codec::new(codec::PCMA, 8000)],
        ))
    }

    #[test]
    fn close_only_once() {
        let track = Track::new(audio(), Codec::new(codec::PCMA, 8000), 2);
        assert!(!track.is_closed());
        track.close().unwrap();
        assert!(track.is_closed());
        assert!(matches!(track.close(), Err(RtspError::TrackClosed(2))));
    }

    #[test]
    fn close_hooks_run_once_in_order() {
        let track = Track::new(audio(), Codec::new(codec::PCMA, 8000), 0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        for n in 0..2 {
            let seen = seen.clone();
            track.on_close(move || seen.lock().push(n));
        }

        track.close().unwrap();
        assert!(track.close().is_err());

        assert_eq!(*seen.lock(), vec![0, 1]);
    }

    #[test]
    fn serves_by_media_identity() {
        let media = audio();
        let track = Track::new(media.clone(), Codec::new(codec::PCMA, 8000), 0);

        assert!(track.serves(&media, &Codec::new(codec::PCMA, 0)));
        assert!(!track.serves(&media, &Codec::new(codec::PCMU, 8000)));

        // Equal content, different instance.
        let twin = Arc::new((*media).clone());
        assert!(!track.serves(&twin, &Codec::new(codec::PCMA, 8000)));
    }
}
