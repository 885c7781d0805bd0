// Detection session pipeline: sampling, aggregation, finalization

pub mod call_slot;
pub mod label_aggregator;
pub mod label_merge;
pub mod sampling_loop;
pub mod classification_coordinator;
pub mod score_side_effect;
pub mod session_controller;

#[cfg(test)]
pub(crate) mod testing;

pub use call_slot::CallSlot;
pub use label_aggregator::{AggregationPolicy, LabelAggregator};
pub use label_merge::{LabelMergePolicy, MergeMode, MergedLabels};
pub use sampling_loop::{DetectionSink, SamplingLoop};
pub use classification_coordinator::{
    ClassificationCoordinator, ClassificationRequest, ClassificationResult, SecondarySource,
};
pub use score_side_effect::ScoreSideEffect;
pub use session_controller::{ControllerSettings, ResultDisposition, SessionController, SessionView};
