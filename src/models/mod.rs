pub mod account;
pub mod client;
pub mod lenient;

pub use account::*;
pub use client::*;
