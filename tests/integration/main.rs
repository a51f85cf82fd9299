//! Integration tests against an in-memory SQLite database.
//!
//! Every test opens its own database, creates the fixture schema and talks
//! to it only through the `Rowbind` facade.

mod common;
mod crud;
mod filtering;
mod schema_mapping;
