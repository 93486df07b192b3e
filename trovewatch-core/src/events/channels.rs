//! Channel factories and handles.

use tokio::sync::{mpsc, watch};
use trovewatch_sdk::objects::BlockNumber;

/// Sender half of a watch's block signal channel.
///
/// Unbounded because listeners are invoked synchronously by the chain
/// client and cannot wait for capacity; the coalescer drains it promptly.
pub type BlockSignalSender = mpsc::UnboundedSender<Option<BlockNumber>>;
/// Receiver half of a watch's block signal channel.
pub type BlockSignalReceiver = mpsc::UnboundedReceiver<Option<BlockNumber>>;

/// Sender for a watch's disposal flag.
pub type ShutdownSender = watch::Sender<bool>;
/// Receiver for a watch's disposal flag.
pub type ShutdownReceiver = watch::Receiver<bool>;

/// Create a new block signal channel.
///
/// One channel per watch; every listener of the watch holds a clone of the
/// sender.
pub fn block_signal_channel() -> (BlockSignalSender, BlockSignalReceiver) {
    mpsc::unbounded_channel()
}

/// Create a disposal flag, initially `false`.
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}
