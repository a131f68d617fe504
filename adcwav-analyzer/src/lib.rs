pub mod analyze;
pub mod config;
pub mod error;
pub mod plot;
pub mod spectrum;

pub use analyze::*;
pub use config::*;
pub use error::*;
pub use plot::*;
pub use spectrum::*;
