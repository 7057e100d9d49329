pub mod compression;
pub mod patch;
pub mod status;

pub use compression::{CompressionJob, NewJob};
pub use patch::JobPatch;
pub use status::{JobStatus, TransitionPolicy};
