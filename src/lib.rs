// Library crate for the live chat moderator binaries and integration tests.

pub mod config;
pub mod moderator;
pub mod profanity;
pub mod retry;
pub mod youtube;
