pub mod labels;
pub mod refresher;

pub use labels::{parse_custom_labels, BuiltLabels, LabelBuilder};
pub use refresher::{CycleReport, CycleState, Refresher};
