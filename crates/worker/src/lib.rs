pub mod executors;


pub use executors::{DockerComposeLauncher, DockerStatusOracle};
