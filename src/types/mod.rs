pub mod artifact;
pub mod title;
