pub mod applications;
pub mod simulate;
