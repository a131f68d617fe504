pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod pipeline;

pub use batch::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use metrics::*;
pub use pipeline::*;
