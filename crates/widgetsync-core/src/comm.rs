//! Comm channels and the comm target registry.
//!
//! A `Kernel` is whatever carries frames to the frontend. Targets are
//! registered by name on a `CommManager`; each `Comm` is bound to one
//! target and publishes its frames through that target's kernel.
//!
//! The process holds a single manager, installed once with
//! [`install_kernel`]. The widget target on it is registered lazily the
//! first time [`widget_target`] is called and lives until process exit.

use crate::error::CommError;
use crate::message::{CommMessage, Frame};
use crate::Guid;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the comm target widgets bind to.
pub const WIDGET_TARGET: &str = "jupyter.widget";

/// Carries frames from this process to the frontend.
pub trait Kernel: Send + Sync {
    fn publish(&self, frame: Frame) -> Result<(), CommError>;
}

/// Invoked when the frontend opens a comm on a registered target.
pub type OpenHandler = Arc<dyn Fn(&Comm, &CommMessage) + Send + Sync>;

/// A named comm target bound to a kernel.
pub struct Target {
    name: String,
    kernel: Arc<dyn Kernel>,
}

impl Target {
    pub fn new(name: impl Into<String>, kernel: Arc<dyn Kernel>) -> Self {
        Self {
            name: name.into(),
            kernel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish a frame through the target's kernel.
    pub fn publish(&self, frame: Frame) -> Result<(), CommError> {
        self.kernel.publish(frame)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("name", &self.name).finish()
    }
}

/// One end of a comm channel.
///
/// Cloning keeps the id: both clones publish on the same channel.
#[derive(Clone)]
pub struct Comm {
    id: Guid,
    target: Arc<Target>,
}

impl Comm {
    /// A comm with a fresh id.
    pub fn new(target: Arc<Target>) -> Self {
        Self::with_id(target, Guid::new())
    }

    pub fn with_id(target: Arc<Target>, id: Guid) -> Self {
        Self { id, target }
    }

    pub fn id(&self) -> Guid {
        self.id
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn open(&self, metadata: Value, data: Value) -> Result<(), CommError> {
        self.target.publish(Frame::CommOpen {
            comm_id: self.id,
            target_name: self.target.name.clone(),
            metadata,
            data,
        })
    }

    pub fn close(&self, metadata: Value, data: Value) -> Result<(), CommError> {
        self.target.publish(Frame::CommClose {
            comm_id: self.id,
            metadata,
            data,
        })
    }

    pub fn send(&self, metadata: Value, data: Value) -> Result<(), CommError> {
        self.target.publish(Frame::CommMsg {
            comm_id: self.id,
            metadata,
            data,
        })
    }
}

impl fmt::Debug for Comm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comm")
            .field("id", &self.id)
            .field("target", &self.target.name)
            .finish()
    }
}

/// Registry of comm targets for one kernel.
pub struct CommManager {
    kernel: Arc<dyn Kernel>,
    targets: RwLock<HashMap<String, (Arc<Target>, OpenHandler)>>,
}

impl CommManager {
    pub fn new(kernel: Arc<dyn Kernel>) -> Self {
        Self {
            kernel,
            targets: RwLock::new(HashMap::new()),
        }
    }

    pub fn kernel(&self) -> &Arc<dyn Kernel> {
        &self.kernel
    }

    /// Register (or replace) a target and return it.
    pub fn register_comm_target<F>(&self, name: &str, on_open: F) -> Arc<Target>
    where
        F: Fn(&Comm, &CommMessage) + Send + Sync + 'static,
    {
        let target = Arc::new(Target::new(name, self.kernel.clone()));
        let on_open: OpenHandler = Arc::new(on_open);
        self.targets
            .write()
            .insert(name.to_string(), (target.clone(), on_open));
        tracing::debug!(target_name = name, "registered comm target");
        target
    }

    pub fn target(&self, name: &str) -> Option<Arc<Target>> {
        self.targets.read().get(name).map(|(t, _)| t.clone())
    }

    /// Handle a frontend-initiated `comm_open` frame.
    pub fn handle_open(&self, frame: &Frame) -> Result<Comm, CommError> {
        let Frame::CommOpen {
            comm_id,
            target_name,
            metadata,
            data,
        } = frame
        else {
            return Err(CommError::UnexpectedFrame);
        };

        let (target, on_open) = self
            .targets
            .read()
            .get(target_name)
            .cloned()
            .ok_or_else(|| CommError::UnknownTarget(target_name.clone()))?;

        let comm = Comm::with_id(target, *comm_id);
        let message = CommMessage::new(*comm_id, metadata.clone(), data.clone());
        on_open(&comm, &message);
        Ok(comm)
    }
}

impl fmt::Debug for CommManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.targets.read().keys().cloned().collect();
        f.debug_struct("CommManager").field("targets", &names).finish()
    }
}

static MANAGER: OnceCell<CommManager> = OnceCell::new();
static WIDGET: OnceCell<Arc<Target>> = OnceCell::new();

/// Install the process-wide kernel. Succeeds exactly once.
pub fn install_kernel(kernel: Arc<dyn Kernel>) -> Result<&'static CommManager, CommError> {
    MANAGER
        .set(CommManager::new(kernel))
        .map_err(|_| CommError::KernelAlreadyInstalled)?;
    manager()
}

/// The process-wide comm manager.
pub fn manager() -> Result<&'static CommManager, CommError> {
    MANAGER.get().ok_or(CommError::NoKernel)
}

/// The widget comm target, registered on first use.
pub fn widget_target() -> Result<Arc<Target>, CommError> {
    WIDGET
        .get_or_try_init(|| {
            manager().map(|m| m.register_comm_target(WIDGET_TARGET, widget_comm_opened))
        })
        .cloned()
}

// Frontend-created widget comms carry no behavior on this side.
fn widget_comm_opened(comm: &Comm, _message: &CommMessage) {
    tracing::debug!(comm_id = %comm.id(), "frontend opened widget comm");
}
