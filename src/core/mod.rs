pub mod error;
pub mod report;

pub use error::{OpsError, RemoteCause};
pub use report::{ItemStatus, RunReport};
