pub mod arkanoid;
pub mod controller;
pub mod device;
pub mod hub;
pub mod hypershot;
pub mod keyboard;
pub mod mat;
pub mod microphone;
pub mod mouse;
pub mod vs_switches;
pub mod zapper;
