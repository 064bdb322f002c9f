mod providers;

pub use providers::*;
