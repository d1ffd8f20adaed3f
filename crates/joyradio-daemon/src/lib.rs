//! joyradio daemon: station catalog, mpv process manager and HTTP action gateway.

pub mod catalog;
pub mod gateway;
pub mod ipc;
pub mod player;

#[cfg(test)]
mod test_support;
