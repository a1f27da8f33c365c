//! Kernel backed by an in-process queue.

use tokio::sync::mpsc;
use widgetsync_core::{CommError, Frame, Kernel};

/// Queues published frames for the socket writer.
#[derive(Debug, Clone)]
pub struct ChannelKernel {
    tx: mpsc::UnboundedSender<Frame>,
}

impl ChannelKernel {
    /// A kernel and the receiver its frames arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Kernel for ChannelKernel {
    fn publish(&self, frame: Frame) -> Result<(), CommError> {
        self.tx.send(frame).map_err(|_| CommError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frames_arrive_in_order() {
        let (kernel, mut rx) = ChannelKernel::new();
        for i in 0..3 {
            kernel
                .publish(Frame::DisplayData {
                    data: json!(i),
                    metadata: json!({}),
                    transient: json!({}),
                })
                .unwrap();
        }

        for i in 0..3 {
            let Ok(Frame::DisplayData { data, .. }) = rx.try_recv() else {
                panic!("expected frame {i}");
            };
            assert_eq!(data, json!(i));
        }
    }

    #[test]
    fn dropped_receiver_reports_closed() {
        let (kernel, rx) = ChannelKernel::new();
        drop(rx);
        let err = kernel
            .publish(Frame::DisplayData {
                data: json!(null),
                metadata: json!({}),
                transient: json!({}),
            })
            .unwrap_err();
        assert_eq!(err, CommError::Closed);
    }
}
