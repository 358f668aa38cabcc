pub mod annotations;
pub mod config;
pub mod controls;
pub mod mode;
pub mod params;
pub mod presentation;
pub mod session;
