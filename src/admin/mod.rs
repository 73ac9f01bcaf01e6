//! Admin audit trail. Kept in the schema and store; no route writes it yet.

pub mod repo;
pub mod repo_types;
