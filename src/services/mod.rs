pub mod backend;
pub mod dashboard;
pub mod renderer;
pub mod session;
pub mod snapshot;
