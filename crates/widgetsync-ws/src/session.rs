//! Per-connection routing of frames to transports.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use widgetsync_core::{
    CommError, CommManager, CommMessage, Frame, Guid, Kernel, Model, Target, Transport,
    TransportError, WIDGET_TARGET,
};

/// Something that owns a channel id and handles its inbound messages.
pub trait Endpoint: Send {
    fn id(&self) -> Result<Guid, TransportError>;
    fn handle_message(&mut self, message: &CommMessage) -> Result<(), TransportError>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M> Endpoint for Transport<M>
where
    M: Model + Send + 'static,
{
    fn id(&self) -> Result<Guid, TransportError> {
        Transport::id(self)
    }

    fn handle_message(&mut self, message: &CommMessage) -> Result<(), TransportError> {
        Transport::handle_message(self, message)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no endpoint for comm {0}")]
    UnknownComm(Guid),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Comm(#[from] CommError),
}

/// The comm manager and live endpoints of one connection.
///
/// Endpoints are owned by the session, so a message for a channel id
/// always reaches the transport that currently holds that channel.
pub struct Session {
    manager: CommManager,
    widget_target: Arc<Target>,
    endpoints: HashMap<Guid, Box<dyn Endpoint>>,
}

impl Session {
    pub fn new(kernel: Arc<dyn Kernel>) -> Self {
        let manager = CommManager::new(kernel);
        let widget_target = manager.register_comm_target(WIDGET_TARGET, |comm, _| {
            tracing::debug!(comm_id = %comm.id(), "frontend opened widget comm");
        });
        Self {
            manager,
            widget_target,
            endpoints: HashMap::new(),
        }
    }

    pub fn manager(&self) -> &CommManager {
        &self.manager
    }

    /// Target new transports on this connection should bind to.
    pub fn widget_target(&self) -> Arc<Target> {
        self.widget_target.clone()
    }

    /// Take ownership of an endpoint and route its channel to it.
    pub fn insert<E: Endpoint + 'static>(&mut self, endpoint: E) -> Result<Guid, SessionError> {
        let id = endpoint.id()?;
        self.endpoints.insert(id, Box::new(endpoint));
        Ok(id)
    }

    pub fn remove(&mut self, id: &Guid) -> Option<Box<dyn Endpoint>> {
        self.endpoints.remove(id)
    }

    pub fn contains(&self, id: &Guid) -> bool {
        self.endpoints.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Borrow a transport by channel id, if it holds a model of type `M`.
    pub fn transport_mut<M>(&mut self, id: &Guid) -> Option<&mut Transport<M>>
    where
        M: Model + Send + 'static,
    {
        self.endpoints
            .get_mut(id)?
            .as_any_mut()
            .downcast_mut::<Transport<M>>()
    }

    /// Route one inbound frame.
    pub fn dispatch(&mut self, frame: Frame) -> Result<(), SessionError> {
        match frame {
            Frame::CommMsg {
                comm_id,
                metadata,
                data,
            } => {
                let endpoint = self
                    .endpoints
                    .get_mut(&comm_id)
                    .ok_or(SessionError::UnknownComm(comm_id))?;
                endpoint.handle_message(&CommMessage::new(comm_id, metadata, data))?;
                Ok(())
            }
            Frame::CommClose { comm_id, .. } => {
                if self.endpoints.remove(&comm_id).is_none() {
                    return Err(SessionError::UnknownComm(comm_id));
                }
                tracing::debug!(%comm_id, "peer closed comm");
                Ok(())
            }
            open @ Frame::CommOpen { .. } => {
                self.manager.handle_open(&open)?;
                Ok(())
            }
            Frame::DisplayData { .. } => {
                tracing::debug!("ignoring inbound display_data");
                Ok(())
            }
        }
    }
}
