pub mod stage0_tokenize;
pub mod stage1_match;
pub mod stage2_resolve;

pub use stage0_tokenize::*;
pub use stage1_match::*;
pub use stage2_resolve::*;
