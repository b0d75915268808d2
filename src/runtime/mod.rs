//! Provides the graphics device that owns a blend backend, its preset registry and the device
//! generation.

mod device;
pub use self::device::{DeviceGeneration, GraphicsDevice};

mod device_options;
pub use self::device_options::{DeviceOptions, DeviceOptionsBuilder};
