//! The local endpoint of the widget state-sync protocol.
//!
//! A [`Transport`] owns one model and the comm channel that mirrors it on
//! the peer. Local changes flow out as single-property patches through a
//! [`Notifier`]; inbound messages are dispatched by
//! [`Transport::handle_message`].
//!
//! Echo suppression: while an inbound `update` is being applied, the model
//! receives a notifier holding that patch. Notifications whose value equals
//! the held value are dropped, so a change is never sent back to the peer
//! it came from. The held patch only exists for the duration of
//! `apply_patch`.

use crate::comm::{self, Comm, Target};
use crate::error::{CallbackError, TransportError};
use crate::message::{CommMessage, Inbound, Metadata, OpenData, Outbound, State};
use crate::property::Observed;
use crate::{Frame, Guid, ModelRef};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::sync::Arc;

/// MIME type of the widget view descriptor in a display bundle.
pub const VIEW_MIME_TYPE: &str = "application/vnd.jupyter.widget-view+json";

/// The model side of a transport.
pub trait Model {
    /// Full snapshot of every property.
    fn get_state(&self) -> Result<State, TransportError>;

    /// Merge `patch` into the live state, reporting each change to
    /// `notifier`.
    ///
    /// Patches are not atomic. If an entry fails to apply, the entries
    /// handled before it stay applied and their notifications may already
    /// have been sent.
    fn apply_patch(
        &mut self,
        patch: &State,
        notifier: &Notifier<'_>,
    ) -> Result<(), TransportError>;
}

/// Listener for custom messages.
pub type MessageCallback = Arc<dyn Fn(&Value) -> Result<(), CallbackError> + Send + Sync>;

/// Sends patches on behalf of a model.
pub struct Notifier<'a> {
    comm: &'a Comm,
    hold: Option<&'a State>,
}

impl<'a> Notifier<'a> {
    /// A notifier outside of inbound patch handling.
    pub fn idle(comm: &'a Comm) -> Self {
        Self { comm, hold: None }
    }

    fn holding(comm: &'a Comm, patch: &'a State) -> Self {
        Self {
            comm,
            hold: Some(patch),
        }
    }

    /// Whether an inbound patch is currently being applied.
    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    /// Report a changed property, unless it echoes the held patch.
    pub fn notify<P: Observed + ?Sized>(&self, property: &P) -> Result<(), TransportError> {
        let value = property.value()?;
        if let Some(held) = self.hold
            && held.get(property.name()).is_some_and(|h| json_eq(h, &value))
        {
            tracing::trace!(property = property.name(), "suppressed echo");
            return Ok(());
        }

        let mut patch = State::new();
        patch.insert(property.name().to_string(), value);
        self.send_patch(patch)
    }

    /// Send `patch` as an `update`, bypassing echo suppression.
    pub fn send_patch(&self, patch: State) -> Result<(), TransportError> {
        send_patch(self.comm, patch)
    }
}

/// JSON equality where numbers compare by value, so `1` equals `1.0`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

fn send_patch(comm: &Comm, patch: State) -> Result<(), TransportError> {
    let metadata = serde_json::to_value(Metadata::default())?;
    let data = serde_json::to_value(Outbound::Update { state: patch })?;
    comm.send(metadata, data)?;
    Ok(())
}

/// The local endpoint for one model instance.
///
/// `Clone` is a copy: the model and listeners are duplicated and the copy
/// publishes on the same channel id. [`Transport::take`] is a move: the
/// channel and listeners go to the returned value and the source is left
/// moved-from.
#[derive(Clone)]
pub struct Transport<M> {
    model: M,
    comm: Option<Comm>,
    callbacks: Vec<MessageCallback>,
}

impl<M: Model> Transport<M> {
    /// Bind `model` to a fresh channel on the process widget target.
    pub fn new(model: M) -> Result<Self, TransportError> {
        Ok(Self::with_target(model, comm::widget_target()?))
    }

    /// Bind `model` to a fresh channel on `target`.
    pub fn with_target(model: M, target: Arc<Target>) -> Self {
        Self {
            model,
            comm: Some(Comm::new(target)),
            callbacks: Vec::new(),
        }
    }

    /// Announce the model to the peer with its full state.
    pub fn open(&self) -> Result<(), TransportError> {
        let comm = self.comm()?;
        let metadata = serde_json::to_value(Metadata::default())?;
        let data = serde_json::to_value(OpenData {
            state: self.model.get_state()?,
        })?;
        comm.open(metadata, data)?;
        Ok(())
    }

    /// Tell the peer to drop its mirror. No open/closed state is kept, so
    /// every call publishes a close frame.
    pub fn close(&self) -> Result<(), TransportError> {
        self.comm()?.close(json!({}), json!({}))?;
        Ok(())
    }

    /// Run a local mutation. Every notification goes out.
    pub fn update<R, F>(&mut self, f: F) -> Result<R, TransportError>
    where
        F: FnOnce(&mut M, &Notifier<'_>) -> Result<R, TransportError>,
    {
        let comm = self.comm.as_ref().ok_or(TransportError::MovedFrom)?;
        f(&mut self.model, &Notifier::idle(comm))
    }

    /// Send the current value of `property` to the peer.
    pub fn notify<P: Observed + ?Sized>(&self, property: &P) -> Result<(), TransportError> {
        Notifier::idle(self.comm()?).notify(property)
    }

    /// Send an arbitrary partial state as an `update`.
    pub fn send_patch(&self, patch: State) -> Result<(), TransportError> {
        send_patch(self.comm()?, patch)
    }

    /// Send an application-defined payload.
    pub fn send(&self, content: Value) -> Result<(), TransportError> {
        let comm = self.comm()?;
        let metadata = serde_json::to_value(Metadata::default())?;
        let data = serde_json::to_value(Outbound::Custom { content })?;
        comm.send(metadata, data)?;
        Ok(())
    }

    /// Dispatch one inbound message. Missing keys and unknown methods are
    /// skipped without error.
    pub fn handle_message(&mut self, message: &CommMessage) -> Result<(), TransportError> {
        let comm = self.comm.as_ref().ok_or(TransportError::MovedFrom)?;

        let inbound = match Inbound::parse(message.data()) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::debug!(comm_id = %comm.id(), "skipping malformed message: {}", e);
                return Ok(());
            }
        };

        match inbound {
            Inbound::Update { state: Some(state) } => {
                tracing::debug!(comm_id = %comm.id(), keys = state.len(), "applying patch");
                self.model.apply_patch(&state, &Notifier::holding(comm, &state))
            }
            Inbound::Update { state: None } => Ok(()),
            Inbound::RequestState => send_patch(comm, self.model.get_state()?),
            Inbound::Custom {
                content: Some(content),
            } => {
                self.handle_custom_message(&content);
                Ok(())
            }
            Inbound::Custom { content: None } => Ok(()),
            Inbound::Unknown => {
                tracing::debug!(comm_id = %comm.id(), "ignoring unknown method");
                Ok(())
            }
        }
    }
}

impl<M> Transport<M> {
    /// The model, read-only. Mutate through [`Transport::update`].
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn id(&self) -> Result<Guid, TransportError> {
        Ok(self.comm()?.id())
    }

    /// The `IPY_MODEL_<hex>` reference to this widget.
    pub fn model_ref(&self) -> Result<ModelRef, TransportError> {
        Ok(ModelRef::new(self.id()?))
    }

    /// Whether the channel has been moved to another transport.
    pub fn moved_from(&self) -> bool {
        self.comm.is_none()
    }

    /// Append a custom-message listener. Listeners run in registration
    /// order and cannot be removed.
    pub fn on_message<F>(&mut self, callback: F)
    where
        F: Fn(&Value) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
    }

    /// Ask the presentation layer to render this widget.
    pub fn display(&self) -> Result<(), TransportError> {
        let comm = self.comm()?;
        let data = json!({
            VIEW_MIME_TYPE: {
                "version_major": "2",
                "version_minor": "0",
                "model_id": comm.id().to_hex(),
            },
            "text/plain": "A Jupyter widget",
        });
        comm.target().publish(Frame::DisplayData {
            data,
            metadata: json!({}),
            transient: json!({}),
        })?;
        Ok(())
    }

    fn comm(&self) -> Result<&Comm, TransportError> {
        self.comm.as_ref().ok_or(TransportError::MovedFrom)
    }

    // A failing listener is logged and the rest still run.
    fn handle_custom_message(&self, content: &Value) {
        for (index, callback) in self.callbacks.iter().enumerate() {
            if let Err(e) = callback(content) {
                tracing::warn!(listener = index, "custom message listener failed: {}", e);
            }
        }
    }
}

impl<M: Default> Transport<M> {
    /// Move the model, channel and listeners out, leaving `self`
    /// moved-from.
    pub fn take(&mut self) -> Self {
        Self {
            model: std::mem::take(&mut self.model),
            comm: self.comm.take(),
            callbacks: std::mem::take(&mut self.callbacks),
        }
    }

    /// Move-assign from `other`, which is left moved-from.
    pub fn assign_from(&mut self, other: &mut Self) {
        *self = other.take();
    }
}

impl<M> Serialize for Transport<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let model_ref = self.model_ref().map_err(serde::ser::Error::custom)?;
        model_ref.serialize(serializer)
    }
}
