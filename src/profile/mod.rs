//! Aggregation propensity profile: ensemble scoring, smoothing and region detection
pub mod ensemble;
pub mod export;
pub mod model;
pub mod regions;
pub mod result;
pub mod smoothing;

pub use ensemble::{score, score_batched, score_per_model};
pub use export::{export_csv, write_profile_csv, write_regions_csv};
pub use model::{Classifier, Ensemble, LogisticModel, MlpModel, ScoringModel};
pub use regions::{detect_regions, AprRegion};
pub use result::{profile_all, AggregationProfile, RegionSummary, ResultRow};
pub use smoothing::smooth;
