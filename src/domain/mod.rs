pub mod engagement;
pub mod wish;
