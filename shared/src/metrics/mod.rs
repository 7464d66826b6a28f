pub mod labels;

pub use labels::{LABEL_ERROR, LABEL_SOURCE};
