use super::{ClassIndex, preprocess};
use crate::{
    Error, Result,
    config::{ModelConfig, TensorLayout},
};
use serde::Serialize;
use tracing::{debug, info};
use tract_onnx::prelude::{tract_ndarray::Array4, *};

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A frozen network that maps one preprocessed image to a score per class.
pub trait FrozenModel: Send + Sync {
    fn scores(&self, input: Array4<f32>) -> Result<Vec<f32>>;

    /// Width of the score vector, when the model declares it.
    fn num_classes(&self) -> Option<usize> {
        None
    }
}

/// ONNX model executed with tract.
pub struct OnnxModel {
    plan: Plan,
}

impl OnnxModel {
    pub fn load(path: &str, input_size: u32, layout: TensorLayout) -> Result<Self> {
        let size = input_size as usize;
        let shape = match layout {
            TensorLayout::Nhwc => tvec!(1, size, size, 3),
            TensorLayout::Nchw => tvec!(1, 3, size, size),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape))
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| Error::model(format!("Failed to load model {path}: {e}")))?;

        Ok(Self { plan })
    }
}

impl FrozenModel for OnnxModel {
    fn scores(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let outputs = self
            .plan
            .run(tvec!(Tensor::from(input).into()))
            .map_err(|e| Error::model(format!("Inference failed: {e}")))?;

        let output = outputs
            .first()
            .ok_or_else(|| Error::model("Model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| Error::model(format!("Unexpected output type: {e}")))?;

        Ok(view.iter().copied().collect())
    }

    fn num_classes(&self) -> Option<usize> {
        let fact = self.plan.model().output_fact(0).ok()?;
        fact.shape.as_concrete()?.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub index: usize,
    pub label: String,
    pub confidence: f32,
}

/// Image bytes in, disease label out.
pub struct DiseaseClassifier {
    model: Box<dyn FrozenModel>,
    classes: ClassIndex,
    input_size: u32,
    layout: TensorLayout,
}

impl DiseaseClassifier {
    /// Loads the ONNX model and class index named in `config`.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let classes = ClassIndex::load(&config.class_indices_path)?;
        info!(
            "Loaded {} classes from {}",
            classes.len(),
            config.class_indices_path
        );

        let model = OnnxModel::load(&config.model_path, config.input_size, config.layout)?;
        info!("Loaded model from {}", config.model_path);

        Self::new(Box::new(model), classes, config)
    }

    pub fn new(
        model: Box<dyn FrozenModel>,
        classes: ClassIndex,
        config: &ModelConfig,
    ) -> Result<Self> {
        if let Some(width) = model.num_classes() {
            if width != classes.len() {
                return Err(Error::config(format!(
                    "Model emits {width} classes but the class index has {}",
                    classes.len()
                )));
            }
        }

        Ok(Self {
            model,
            classes,
            input_size: config.input_size,
            layout: config.layout,
        })
    }

    pub fn classes(&self) -> &ClassIndex {
        &self.classes
    }

    /// Runs one synchronous forward pass. Call from a blocking context.
    pub fn classify(&self, image_bytes: &[u8]) -> Result<Prediction> {
        let input = preprocess(image_bytes, self.input_size, self.layout)?;
        let scores = self.model.scores(input)?;

        let (index, confidence) =
            argmax(&scores).ok_or_else(|| Error::model("Model returned no scores"))?;
        let label = self
            .classes
            .label(index)
            .ok_or_else(|| Error::model(format!("No label for class {index}")))?
            .to_string();

        debug!("Predicted class {} ({}) with score {}", index, label, confidence);

        Ok(Prediction {
            index,
            label,
            confidence,
        })
    }
}

/// First position of the largest score, skipping NaNs.
fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best
}
