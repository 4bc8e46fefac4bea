pub mod error;
pub mod stats;
pub mod statements;
pub mod traits;
pub mod types;

pub use error::*;
pub use statements::*;
pub use traits::*;
pub use types::*;
