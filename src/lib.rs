#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod drivers;
pub mod error;
pub mod hal;
pub mod kernel;
pub mod system;
