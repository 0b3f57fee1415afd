//! Frame provider implementations

pub mod channel;
pub mod replay;

pub use channel::{ChannelProvider, DEFAULT_CHANNEL_CAPACITY, FrameSender};
pub use replay::ReplayProvider;
