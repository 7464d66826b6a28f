pub mod group;
pub mod labels;
pub mod record;

pub use group::{FileSdEntry, TargetGroup, DEFAULT_SOURCE};
pub use labels::{is_valid_label_name, LabelSet, ADDRESS_LABEL, HOSTNAME_LABEL, METRICS_PATH_LABEL};
pub use record::{ConsulServiceRecord, EndpointRecord};
