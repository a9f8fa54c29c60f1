#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod bot;
pub mod command;
pub mod hook;

pub use bot::{Bot, Context, DEFAULT_TIMEOUT};
pub use hook::Hook;
