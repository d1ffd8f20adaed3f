//! Types shared by the joyradio daemon and the gamepad client.

pub mod config;
pub mod platform;
pub mod protocol;
