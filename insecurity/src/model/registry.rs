use super::stage::Stage;
use crate::{attribution::AttributionError, common::*};

/// Ordered `(name, stage)` pairs forming a sequential network.
///
/// Names are unique and assigned at construction, so an attribution layer can
/// be validated before any tensor is computed.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    stages: IndexMap<String, Stage>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S>(&mut self, name: impl Into<String>, stage: S) -> Result<()>
    where
        S: Into<Stage>,
    {
        let name = name.into();
        ensure!(
            !self.stages.contains_key(&name),
            "the layer name '{}' is registered twice",
            name
        );
        self.stages.insert(name, stage.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Stage> {
        self.stages.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(|name| name.as_str())
    }

    pub fn check_layer(&self, name: &str) -> Result<(), AttributionError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(AttributionError::LayerNotFound {
                layer: name.to_string(),
                available: self.names().join(", "),
            })
        }
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        self.stages
            .values()
            .fold(xs.shallow_clone(), |xs, stage| stage.forward_t(&xs, train))
    }

    /// Runs all stages and returns the output of `layer` along with the final
    /// output.
    pub fn forward_capture_t(
        &self,
        xs: &Tensor,
        layer: &str,
        train: bool,
    ) -> Result<(Tensor, Tensor), AttributionError> {
        self.check_layer(layer)?;

        let mut captured = None;
        let output = self
            .stages
            .iter()
            .fold(xs.shallow_clone(), |xs, (name, stage)| {
                let ys = stage.forward_t(&xs, train);
                if name == layer {
                    captured = Some(ys.shallow_clone());
                }
                ys
            });
        let activation = captured.ok_or_else(|| AttributionError::LayerNotFound {
            layer: layer.to_string(),
            available: self.names().join(", "),
        })?;

        Ok((activation, output))
    }
}
