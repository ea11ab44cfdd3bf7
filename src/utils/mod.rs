pub mod filename;
pub mod format;
pub mod number;

pub use number::round_to;
