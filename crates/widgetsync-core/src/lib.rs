//! Two-way widget state synchronization.
//!
//! A local model is mirrored by a peer over a comm channel. Changes on
//! either side travel as partial-state patches; changes received from the
//! peer are not echoed back. This crate provides the transport and the
//! protocol framing. Carrying frames between processes is up to the host,
//! which plugs in through the [`Kernel`] trait.

pub mod comm;
mod error;
mod guid;
mod message;
mod property;
mod transport;

pub use comm::{Comm, CommManager, Kernel, Target, WIDGET_TARGET};
pub use error::{CallbackError, CommError, TransportError};
pub use guid::{Guid, GuidParseError, ModelRef, MODEL_REF_PREFIX};
pub use message::{
    CommMessage, Frame, Inbound, Metadata, OpenData, Outbound, State, PROTOCOL_VERSION,
};
pub use property::{Observed, Property};
pub use transport::{MessageCallback, Model, Notifier, Transport, VIEW_MIME_TYPE};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{CommError, Frame, Kernel};
    use parking_lot::Mutex;
    use serde_json::Value;

    /// Kernel that keeps every published frame.
    #[derive(Default)]
    pub struct RecordingKernel {
        frames: Mutex<Vec<Frame>>,
    }

    impl RecordingKernel {
        pub fn frames(&self) -> Vec<Frame> {
            self.frames.lock().clone()
        }

        /// `data` of every `comm_msg` frame.
        pub fn sent(&self) -> Vec<Value> {
            self.comm_msgs().map(|(_, data)| data).collect()
        }

        /// `metadata` of every `comm_msg` frame.
        pub fn metadata(&self) -> Vec<Value> {
            self.comm_msgs().map(|(metadata, _)| metadata).collect()
        }

        fn comm_msgs(&self) -> impl Iterator<Item = (Value, Value)> {
            self.frames().into_iter().filter_map(|f| match f {
                Frame::CommMsg { metadata, data, .. } => Some((metadata, data)),
                _ => None,
            })
        }
    }

    impl Kernel for RecordingKernel {
        fn publish(&self, frame: Frame) -> Result<(), CommError> {
            self.frames.lock().push(frame);
            Ok(())
        }
    }
}
