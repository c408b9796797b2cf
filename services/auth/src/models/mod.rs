//! Authentication service models

pub mod user;

pub use user::{Credentials, NewUser, ProfileImage, PublicUser, User};
