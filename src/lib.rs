//! seltree: hierarchical selection and inclusion over checkbox trees.
//!
//! Layers:
//! - `domain`: tree arena, selection reduction, inclusion set, status aggregation
//! - `application`: snapshot model and services
//! - `infrastructure`: filesystem seam, DI container
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
