pub mod address;
pub mod admin_client;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod events;
pub mod format;
pub mod navigation;
pub mod notices;
pub mod query_state;
pub mod query_string;
pub mod validation;
