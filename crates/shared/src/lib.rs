pub mod grid;
pub mod models;
pub mod sample;
