//! Observable model properties.

use crate::error::TransportError;
use crate::message::State;
use crate::transport::Notifier;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anything a transport can be notified about: a named value.
pub trait Observed {
    fn name(&self) -> &str;
    fn value(&self) -> Result<Value, serde_json::Error>;
}

/// A named, typed property that reports its changes to a [`Notifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T> {
    name: &'static str,
    value: T,
}

impl<T> Property<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(name: &'static str, value: T) -> Self {
        Self { name, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Store `value` and notify. The notifier drops the update if it
    /// echoes the patch currently being applied.
    pub fn set(&mut self, value: T, notifier: &Notifier<'_>) -> Result<(), TransportError> {
        self.value = value;
        notifier.notify(self)
    }

    /// Take this property's entry from `patch`, if present.
    pub fn apply(&mut self, patch: &State, notifier: &Notifier<'_>) -> Result<(), TransportError> {
        if let Some(raw) = patch.get(self.name) {
            let value = T::deserialize(raw)?;
            self.set(value, notifier)?;
        }
        Ok(())
    }

    /// Insert this property's entry into a snapshot.
    pub fn write_to(&self, state: &mut State) -> Result<(), serde_json::Error> {
        state.insert(self.name.to_string(), self.value()?);
        Ok(())
    }
}

impl<T: Serialize> Observed for Property<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{Comm, Target};
    use crate::test_support::RecordingKernel;
    use serde_json::json;
    use std::sync::Arc;

    fn comm() -> (Arc<RecordingKernel>, Comm) {
        let kernel = Arc::new(RecordingKernel::default());
        let comm = Comm::new(Arc::new(Target::new("t", kernel.clone())));
        (kernel, comm)
    }

    #[test]
    fn set_notifies() {
        let (kernel, comm) = comm();
        let notifier = Notifier::idle(&comm);
        let mut p = Property::new("count", 0u32);

        p.set(3, &notifier).unwrap();

        assert_eq!(*p.get(), 3);
        assert_eq!(
            kernel.sent(),
            vec![json!({"method": "update", "state": {"count": 3}})]
        );
    }

    #[test]
    fn apply_ignores_absent_key() {
        let (kernel, comm) = comm();
        let notifier = Notifier::idle(&comm);
        let mut p = Property::new("count", 7u32);

        p.apply(&State::new(), &notifier).unwrap();

        assert_eq!(*p.get(), 7);
        assert!(kernel.sent().is_empty());
    }

    #[test]
    fn apply_rejects_wrong_type() {
        let (_kernel, comm) = comm();
        let notifier = Notifier::idle(&comm);
        let mut p = Property::new("count", 7u32);
        let mut patch = State::new();
        patch.insert("count".into(), json!("seven"));

        assert!(matches!(
            p.apply(&patch, &notifier),
            Err(TransportError::Serde(_))
        ));
        assert_eq!(*p.get(), 7);
    }

    #[test]
    fn write_to_snapshot() {
        let p = Property::new("label", "hi".to_string());
        let mut state = State::new();
        p.write_to(&mut state).unwrap();
        assert_eq!(state["label"], json!("hi"));
    }
}
