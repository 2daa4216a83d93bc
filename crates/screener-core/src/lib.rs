pub mod criteria;
pub mod error;
pub mod traits;
pub mod types;

pub use criteria::*;
pub use error::*;
pub use traits::*;
pub use types::*;
