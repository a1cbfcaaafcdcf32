//! Provider-neutral request and response types.

pub mod config;
pub mod content;
pub mod request;
pub mod response;

pub use config::*;
pub use content::*;
pub use request::*;
pub use response::*;
