pub mod config;
pub mod conn;
pub mod error;
pub mod info;
pub mod media;
pub mod track;
pub mod transport;

pub use config::StreamsConfig;
pub use conn::{Conn, Control, Mode, State};
pub use error::{Result, RtspError};
pub use info::ConnectionInfo;
pub use media::{Codec, Direction, Media};
pub use track::Track;
pub use transport::Transport;
