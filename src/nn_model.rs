use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;
use crate::predict::Classifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Relu6,
    Sigmoid,
    Tanh,
    Softmax,
}

/// One dense layer; `weights` is `[inputs][outputs]` like a Keras kernel.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn inputs(&self) -> usize {
        self.weights.len()
    }

    fn outputs(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, x: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (xi, row) in x.iter().zip(&self.weights) {
            for (o, w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        activate(self.activation, &mut out);
        out
    }
}

/// Feed-forward network exported from the training notebook as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let net: DenseNetwork = serde_json::from_str(raw)?;
        net.validate()?;
        Ok(net)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::Invalid("network has no layers".to_string()));
        }
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.inputs() == 0 || layer.outputs() == 0 {
                return Err(ModelError::Invalid(format!("layer {idx} is empty")));
            }
            if let Some(bad) = layer.weights.iter().position(|r| r.len() != layer.outputs()) {
                return Err(ModelError::Invalid(format!(
                    "layer {idx} kernel row {bad} does not match {} outputs",
                    layer.outputs()
                )));
            }
            if idx > 0 && self.layers[idx - 1].outputs() != layer.inputs() {
                return Err(ModelError::Invalid(format!(
                    "layer {idx} expects {} inputs, previous layer gives {}",
                    layer.inputs(),
                    self.layers[idx - 1].outputs()
                )));
            }
        }
        Ok(())
    }
}

impl Classifier for DenseNetwork {
    fn input_width(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::inputs)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        let expected = self.input_width();
        if row.len() != expected {
            return Err(ModelError::FeatureWidth {
                expected,
                got: row.len(),
            });
        }
        let mut x = row.to_vec();
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        Ok(x)
    }
}

fn activate(kind: Activation, xs: &mut [f64]) {
    match kind {
        Activation::Linear => {}
        Activation::Relu => xs.iter_mut().for_each(|v| *v = v.max(0.0)),
        Activation::Relu6 => xs.iter_mut().for_each(|v| *v = v.clamp(0.0, 6.0)),
        Activation::Sigmoid => xs.iter_mut().for_each(|v| *v = sigmoid(*v)),
        Activation::Tanh => xs.iter_mut().for_each(|v| *v = v.tanh()),
        Activation::Softmax => softmax_in_place(xs),
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn softmax_in_place(xs: &mut [f64]) {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in xs.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        xs.iter_mut().for_each(|v| *v /= sum);
    }
}
