pub mod app;
pub mod boards;
pub mod event;
pub mod session;
pub mod submit;
pub mod ticker;
