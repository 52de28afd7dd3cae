//! Application services layer.

pub mod error;
pub mod menu;
pub mod navbar;
pub(crate) mod normalize;
pub mod repos;
