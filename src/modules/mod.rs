//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for resources outside the database, such as the
//! filesystem area attachments are staged in.

pub mod storage;
