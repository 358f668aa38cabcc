pub mod analysis;
pub mod annotation;
pub mod chart;
pub mod health;
pub mod session;
