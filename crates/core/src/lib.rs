//! Domain logic for the portal's ranking service.
//!
//! Zero I/O: query composition, parameter binding, filter validation,
//! result shaping and the memoizing cache live here so the db and api crates
//! (and their tests) share one implementation.

pub mod binder;
pub mod cache;
pub mod error;
pub mod filters;
pub mod game;
pub mod pagination;
pub mod ranking;
pub mod shaper;
