pub mod cs;

pub use cs::{error, hashing};
pub use error::{Error, Result};
