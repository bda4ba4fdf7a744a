//! Shared test utilities for git-workbench
//!
//! Integration tests run against real temporary repositories.

pub mod assertions;
pub mod fixtures;
pub mod repository;
