pub mod derived;
pub mod record;

pub use derived::*;
pub use record::*;
