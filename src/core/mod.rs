mod clock;
mod controller;
mod frame;
mod gpu_context;
mod input_adapter;
mod stats;
mod window;

pub use clock::Clock;
pub use controller::{Button, Controller};
pub use frame::FrameInfo;
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use stats::FrameStats;
pub use window::{WindowContext, WindowDimensions};

#[cfg(test)]
pub(crate) use window::mock::MockWindow;
