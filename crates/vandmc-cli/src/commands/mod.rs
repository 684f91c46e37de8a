pub mod coverage;
pub mod range;
pub mod simulate;
