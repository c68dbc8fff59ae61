mod backend;
mod backends;
mod registry;
mod result;

pub use backend::DetectorBackend;
pub use backends::{DiffBackend, StubBackend};
pub use registry::BackendRegistry;
pub use result::{DetectorOutput, RawDetection};
