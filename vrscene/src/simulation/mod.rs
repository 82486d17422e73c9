pub mod states;
pub mod params;
pub mod sampling;
pub mod forces;
pub mod integrator;
pub mod engine;
pub mod scenario;
