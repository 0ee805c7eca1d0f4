pub mod capture;
pub mod machine;

pub use capture::*;
pub use machine::*;
