pub mod candidate;
pub mod member;
pub mod role;
pub mod suggestion;

pub use candidate::*;
pub use member::*;
pub use role::*;
pub use suggestion::*;
