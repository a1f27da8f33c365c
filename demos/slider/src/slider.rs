//! Integer slider model.

use crate::config::SliderConfig;
use serde::Deserialize;
use serde_json::Value;
use widgetsync_core::{Model, Notifier, Property, State, TransportError};

/// Frontend view/model identity. Sent with the state, never patched.
const IDENTITY: [(&str, &str); 6] = [
    ("_model_name", "IntSliderModel"),
    ("_model_module", "@jupyter-widgets/controls"),
    ("_model_module_version", "1.5.0"),
    ("_view_name", "IntSliderView"),
    ("_view_module", "@jupyter-widgets/controls"),
    ("_view_module_version", "1.5.0"),
];

#[derive(Debug, Clone)]
pub struct IntSlider {
    pub description: Property<String>,
    pub value: Property<i64>,
    pub min: Property<i64>,
    pub max: Property<i64>,
    pub step: Property<i64>,
}

impl IntSlider {
    pub fn new(config: &SliderConfig) -> Self {
        Self {
            description: Property::new("description", config.description.clone()),
            value: Property::new("value", config.value.max(config.min).min(config.max)),
            min: Property::new("min", config.min),
            max: Property::new("max", config.max),
            step: Property::new("step", config.step),
        }
    }
}

impl Model for IntSlider {
    fn get_state(&self) -> Result<State, TransportError> {
        let mut state = State::new();
        for (key, value) in IDENTITY {
            state.insert(key.to_string(), Value::from(value));
        }
        self.description.write_to(&mut state)?;
        self.value.write_to(&mut state)?;
        self.min.write_to(&mut state)?;
        self.max.write_to(&mut state)?;
        self.step.write_to(&mut state)?;
        Ok(state)
    }

    fn apply_patch(
        &mut self,
        patch: &State,
        notifier: &Notifier<'_>,
    ) -> Result<(), TransportError> {
        self.description.apply(patch, notifier)?;
        self.step.apply(patch, notifier)?;
        self.min.apply(patch, notifier)?;
        self.max.apply(patch, notifier)?;

        // Value stays inside [min, max]; a range change may move it.
        let requested = patch.get("value").map(i64::deserialize).transpose()?;
        let current = *self.value.get();
        let clamped = requested
            .unwrap_or(current)
            .max(*self.min.get())
            .min(*self.max.get());
        if requested.is_some() || clamped != current {
            self.value.set(clamped, notifier)?;
        }
        Ok(())
    }
}
