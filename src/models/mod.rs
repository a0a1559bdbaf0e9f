//! Registry of the neural network benchmark models.
//!
//! Every benchmark case is identified by a model name that resolves to a
//! [`ModelEntry`]. An entry carries enough information to rebuild its network
//! deterministically: the family fixes the topology, the width multiplier and
//! resolution scale it, and the seed fixes the weights. Quantized entries share
//! the seed of their float counterpart so both can be scored against the same
//! golden outputs.

mod catalog;

use crate::activation::Activation;
use crate::errors::{ModelError, ModelResult};
use crate::network::{MAX_COMPUTATION_BUFFER_SIZE, MAX_WEIGHT_SIZE};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

pub use catalog::builtin_entries;

/// Number of classes produced by the image classifiers (ImageNet plus background).
pub const IMAGENET_CLASSES: usize = 1001;

/// Network topology family of a benchmark model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Text-to-speech acoustic model producing mel spectrogram frames.
    Tts,
    /// Speech recognition model producing per-frame character probabilities.
    Asr,
    MobilenetV1,
    MobilenetV2,
}

impl ModelFamily {
    pub fn is_image_classifier(self) -> bool {
        matches!(self, ModelFamily::MobilenetV1 | ModelFamily::MobilenetV2)
    }
}

/// Numeric precision of the network weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Float32,
    /// Symmetric 8-bit weights with one scale per output row.
    Quant8,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Float32 => write!(f, "float32"),
            Precision::Quant8 => write!(f, "quant8"),
        }
    }
}

/// How the outputs of a model are scored against the golden outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluator {
    /// Classification: golden argmax must appear in the top-1 / top-5 outputs.
    TopK,
    /// Regression: mean squared error over every output value.
    MeanSquaredError,
}

/// Shape of one dense layer derived from a model entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerShape {
    pub units: usize,
    pub activation: Option<Activation>,
}

/// A named, registry-resolved benchmark case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub family: ModelFamily,
    #[serde(default = "default_width_multiplier")]
    pub width_multiplier: f32,
    /// Input image side in pixels. Only used by the image families.
    #[serde(default)]
    pub resolution: Option<usize>,
    pub precision: Precision,
    pub seed: u64,
    pub dataset_size: usize,
}

fn default_width_multiplier() -> f32 {
    1.0
}

impl ModelEntry {
    /// Name reported in benchmark results.
    pub fn test_name(&self) -> &str {
        &self.name
    }

    /// Name of the float variant this entry is scored against.
    pub fn reference_name(&self) -> String {
        match self.precision {
            Precision::Float32 => self.name.clone(),
            Precision::Quant8 => self.name.replacen("_quant", "", 1),
        }
    }

    pub fn evaluator(&self) -> Evaluator {
        match self.family {
            ModelFamily::Tts => Evaluator::MeanSquaredError,
            ModelFamily::Asr | ModelFamily::MobilenetV1 | ModelFamily::MobilenetV2 => {
                Evaluator::TopK
            }
        }
    }

    /// Number of input values of one sample.
    pub fn feature_size(&self) -> ModelResult<usize> {
        self.validate()?;
        self.checked_feature_size()
    }

    /// Dense layer shapes from the first hidden layer to the output layer.
    pub fn layer_shapes(&self) -> ModelResult<Vec<LayerShape>> {
        self.validate()?;
        self.checked_layer_shapes()
    }

    /// Checks that the entry describes a buildable network.
    ///
    /// The weight count and computation buffer size are derived with checked
    /// arithmetic and held to the network limits, so a valid entry never
    /// allocates past them when built.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("Model name must not be empty"));
        }
        if !self.width_multiplier.is_finite() || self.width_multiplier <= 0.0 {
            return Err(self.invalid("Width multiplier must be a positive number"));
        }
        if self.dataset_size == 0 {
            return Err(self.invalid("Dataset size must be greater than 0"));
        }
        if self.family.is_image_classifier() {
            match self.resolution {
                None => return Err(self.invalid("Image models require a resolution")),
                Some(resolution) if resolution < 16 => {
                    return Err(self.invalid("Resolution must be at least 16 pixels"));
                }
                Some(_) => {}
            }
        }

        let feature_size = self.checked_feature_size()?;
        let mut fan_in = feature_size;
        let mut weight_count: usize = 0;
        let mut buffer_size = feature_size;
        for shape in self.checked_layer_shapes()? {
            weight_count = fan_in
                .checked_mul(shape.units)
                .and_then(|weights| weight_count.checked_add(weights))
                .ok_or_else(|| self.invalid("Weight count overflows"))?;
            buffer_size = buffer_size
                .checked_add(shape.units)
                .ok_or_else(|| self.invalid("Computation buffer size overflows"))?;
            fan_in = shape.units;
        }

        if weight_count > MAX_WEIGHT_SIZE {
            return Err(self.invalid(format!(
                "Weight size {} exceeds limit {}",
                weight_count, MAX_WEIGHT_SIZE
            )));
        }
        if buffer_size > MAX_COMPUTATION_BUFFER_SIZE {
            return Err(self.invalid(format!(
                "Computation buffer size {} exceeds limit {}",
                buffer_size, MAX_COMPUTATION_BUFFER_SIZE
            )));
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> ModelError {
        ModelError::InvalidModelSpec {
            name: self.name.clone(),
            message: message.into(),
        }
    }

    fn checked_feature_size(&self) -> ModelResult<usize> {
        Ok(match self.family {
            ModelFamily::Tts => 128,
            // 40 MFCC coefficients over an 8 frame context window.
            ModelFamily::Asr => 40 * 8,
            ModelFamily::MobilenetV1 | ModelFamily::MobilenetV2 => {
                // Images are pooled to a 16x16 patch grid with three channels.
                let side = self.resolution.unwrap_or_default() / 16;
                side.checked_mul(side)
                    .and_then(|patches| patches.checked_mul(3))
                    .ok_or_else(|| self.invalid("Input size overflows"))?
            }
        })
    }

    fn checked_layer_shapes(&self) -> ModelResult<Vec<LayerShape>> {
        let scaled = |base: usize| -> ModelResult<usize> {
            let units = (base as f32 * self.width_multiplier).round();
            if units > MAX_COMPUTATION_BUFFER_SIZE as f32 {
                return Err(self.invalid(format!(
                    "Width multiplier {} gives a layer wider than {} units",
                    self.width_multiplier, MAX_COMPUTATION_BUFFER_SIZE
                )));
            }
            Ok((units as usize).max(1))
        };
        let shapes = match self.family {
            ModelFamily::Tts => vec![
                LayerShape {
                    units: 256,
                    activation: Some(Activation::Tanh),
                },
                LayerShape {
                    units: 256,
                    activation: Some(Activation::Tanh),
                },
                LayerShape {
                    units: 80,
                    activation: None,
                },
            ],
            ModelFamily::Asr => vec![
                LayerShape {
                    units: 512,
                    activation: Some(Activation::Relu),
                },
                LayerShape {
                    units: 512,
                    activation: Some(Activation::Relu),
                },
                LayerShape {
                    units: 29,
                    activation: Some(Activation::Softmax),
                },
            ],
            ModelFamily::MobilenetV1 => vec![
                LayerShape {
                    units: scaled(512)?,
                    activation: Some(Activation::Relu),
                },
                LayerShape {
                    units: IMAGENET_CLASSES,
                    activation: Some(Activation::Softmax),
                },
            ],
            ModelFamily::MobilenetV2 => vec![
                LayerShape {
                    units: scaled(384)?,
                    activation: Some(Activation::Relu),
                },
                LayerShape {
                    units: scaled(640)?,
                    activation: Some(Activation::Relu),
                },
                LayerShape {
                    units: IMAGENET_CLASSES,
                    activation: Some(Activation::Softmax),
                },
            ],
        };
        Ok(shapes)
    }
}

/// Registry of model entries addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Registry holding the built-in benchmark catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for entry in builtin_entries() {
            let position = registry.entries.len();
            registry.index.insert(entry.name.clone(), position);
            registry.entries.push(entry);
        }
        registry
    }

    /// Builds a registry from arbitrary entries, rejecting duplicates and invalid entries.
    pub fn from_entries(entries: Vec<ModelEntry>) -> ModelResult<Self> {
        let mut registry = Self::default();
        for entry in entries {
            registry.insert(entry)?;
        }
        Ok(registry)
    }

    /// Adds one entry to the registry.
    pub fn insert(&mut self, entry: ModelEntry) -> ModelResult<()> {
        entry.validate()?;
        if self.index.contains_key(&entry.name) {
            return Err(ModelError::DuplicateModel { name: entry.name });
        }
        debug!("Registering model '{}'", entry.name);
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Loads additional entries from a JSON array of model entries.
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> ModelResult<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::CatalogRead {
            path: path.display().to_string(),
            source,
        })?;
        let entries: Vec<ModelEntry> =
            serde_json::from_str(&content).map_err(|source| ModelError::CatalogParse {
                path: path.display().to_string(),
                source,
            })?;

        let count = entries.len();
        for entry in entries {
            self.insert(entry)?;
        }
        info!("Loaded {} model entries from '{}'", count, path.display());
        Ok(count)
    }

    pub fn model_by_name(&self, name: &str) -> ModelResult<&ModelEntry> {
        self.index
            .get(name)
            .map(|&position| &self.entries[position])
            .ok_or_else(|| ModelError::UnknownModel {
                name: name.to_string(),
            })
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
