pub mod app;
pub mod authorize;
pub mod commands;
pub mod dispatch;
pub mod env;
pub mod keys;
pub mod runtime;
pub mod serve;
