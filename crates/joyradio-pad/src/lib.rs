//! Gamepad front-end for joyradio: decodes joystick events and turns button
//! presses into gateway actions.

pub mod buttons;
pub mod client;
pub mod dispatch;
pub mod event;
