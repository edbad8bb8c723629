pub mod archive;
pub mod classify;
mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod rows;

pub use error::{ArchiverError, Result};
