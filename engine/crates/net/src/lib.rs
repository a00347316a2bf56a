pub mod channels;
pub mod host;
pub mod output_router;
pub mod protocol;
pub mod side_channel;

pub use channels::ChannelHost;
pub use host::{Host, LivePlayer};
pub use protocol::{AdminCommand, HostCommand, HostEvent, Tone};
pub use side_channel::{decode_override, encode_override, OverridePacket, ProtocolError};
