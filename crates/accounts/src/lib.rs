//! Profile loading and provider credential resolution.

pub mod error;
pub mod keys;
pub mod profile;

pub use {
    error::{Error, Result},
    keys::{KeyFallbacks, ProviderKey, check_api_key, resolve_profile_keys},
    profile::load_server_profile,
};
