pub mod entity;
pub mod operations;
