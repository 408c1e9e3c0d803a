pub mod dispersion;
pub mod pool;

pub use dispersion::{analyze_dispersion, DispersionReport, DispersionSample};
pub use pool::WorkerPool;
