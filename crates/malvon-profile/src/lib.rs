//! Malvon Profiles
//!
//! A [`Profile`] ties together a storage partition, the shared web
//! configuration its tabs render with, its tab groups and its history.
//! [`ProfileRegistry`] remembers which partition belongs to which name.

mod error;
mod profile;
mod registry;

pub use error::ProfileError;
pub use profile::{
    Profile, ProfileOptions, DEFAULT_TAB_GROUP_NAME, PRIVATE_PROFILE_NAME, PRIVATE_TAB_GROUP_NAME,
};
pub use registry::{ProfileData, ProfileRegistry};

pub type Result<T> = std::result::Result<T, ProfileError>;
