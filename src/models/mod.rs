pub mod generation;
pub mod response;

pub use generation::*;
pub use response::*;
