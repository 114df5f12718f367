//! Grid engine for the indoor-positioning client.
//!
//! Everything that touches the grid runs inside one [`session::Session`]
//! task. Network calls run in their own tasks and hand results back as
//! [`session::Update`] messages, so the render model is only ever mutated
//! from one place.
pub mod api;
pub mod collect;
pub mod config;
pub mod error;
pub mod gesture;
pub mod model;
pub mod notice;
pub mod path;
pub mod polling;
pub mod scheduler;
pub mod sensors;
pub mod session;
pub mod svg;
pub mod sync;
pub mod view;

#[cfg(test)]
pub(crate) mod fakes;

pub use gridloc_shared::grid::{Cell, GridSpec};
