pub mod lifecycle;
pub mod runtime;
pub mod scheduler;

pub use lifecycle::{Lifecycle, LifecycleState};
pub use runtime::RuntimeConfig;
pub use scheduler::{CycleObserver, RefreshLoop};
