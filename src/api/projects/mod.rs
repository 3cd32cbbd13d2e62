//! Project module

mod api;
mod models;

pub use models::{NewProject, Project, STATE_ACTIVE};
