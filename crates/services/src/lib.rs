pub mod hooks;
pub mod managers;
pub mod services;
