pub mod diagnosis;
pub mod extraction;
pub mod features;
pub mod prediction;

pub use diagnosis::DisplayDiagnosis;
pub use extraction::ExtractionResult;
pub use features::{FeatureDraft, FeatureField, FeatureSnapshot, ValidationError};
pub use prediction::{PredictionRecord, RiskCategory, RiskResult};
