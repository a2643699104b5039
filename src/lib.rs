//! filevault - multi-tenant hierarchical file store.
//!
//! Users upload folders, files and images, organize them in a tree,
//! and publish individual nodes for anonymous read access.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod notify;
pub mod web;

pub use auth::{hash_password, verify_password, SessionAuthority};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{Result, VaultError};
pub use file::{FileManager, FileStorage, NodeRepository};
pub use web::WebServer;
