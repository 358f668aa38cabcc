pub mod dashboard;
pub mod health;
pub mod session;
pub mod stream;
