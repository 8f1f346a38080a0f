pub mod error;
pub mod sink;
pub mod slug;

pub use error::*;
pub use sink::*;
pub use slug::*;
