mod home;
pub use home::Home;

mod visualizer;
pub use visualizer::Visualizer;
