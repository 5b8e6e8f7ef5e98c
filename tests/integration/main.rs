//! Workspace integration tests: services and the HTTP router against an
//! in-memory database and a temporary blob directory.

mod helpers;

mod trash_test;
mod version_test;
