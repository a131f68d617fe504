pub mod block_read;
pub mod data_block;
pub mod error;
pub mod header;
pub mod sample_width;

pub use block_read::*;
pub use data_block::*;
pub use error::*;
pub use header::*;
pub use sample_width::*;
