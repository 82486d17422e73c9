pub mod simulation;
pub mod rotation;
pub mod layers;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Galaxy, StarField, NVec3, NMat3, NMat4};
pub use simulation::params::GalaxyParameters;
pub use simulation::forces::{ForceField, Source};
pub use simulation::integrator::predictor_corrector_step;
pub use simulation::engine::GalaxySimulator;
pub use simulation::scenario::{Scene, RunSummary, OrbitingTip};

pub use rotation::so3::{
    cross_product_matrix, angle_axis_rotation_matrix, rotation_vector_to_matrix, rotation_matrix_to_vector,
    rotation_matrix_vector_to_vector, rotation_matrix_linear_interpolation, rotation_matrix_suppress,
};

pub use layers::interaction::{InteractionLayer, FrameInput, KeyEvent, KeyEventKind, Key, Modifiers, EventHandlerAction};
pub use layers::space::SpaceLayer;
pub use layers::flying::{FlyingLayer, FlyingParameters, GridTransform, GridVertex};

pub use configuration::config::{SceneConfig, SpaceConfig, FlyingConfig, EyeConfig, RunConfig, InputConfig, TipConfig, KeyPressConfig};

pub use benchmark::benchmark::{bench_galaxy_step, bench_rotation};
