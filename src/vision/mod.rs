mod class_index;
mod classifier;
mod preprocess;

pub use class_index::ClassIndex;
pub use classifier::{DiseaseClassifier, FrozenModel, OnnxModel, Prediction};
pub use preprocess::preprocess;
