pub mod app;
pub mod audio;
pub mod config;
pub mod core;
pub mod logging;
pub mod model;
pub mod queue;
pub mod remote;
pub mod session;
pub mod subsonic;
pub mod surface;
