pub mod engagement;
pub mod humanize;
pub mod uploads;
pub mod wishes;
