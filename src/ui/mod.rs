pub mod slot_loader;
pub mod wall_widget;
pub mod window;

pub use window::MainWindow;
