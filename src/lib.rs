//! Portable GPU blend state and its translation onto native graphics APIs.
//!
//! A [BlendState] describes how a fragment's color output is combined with the color already in
//! the render target. The [backend] module translates blend states for an OpenGL-family context,
//! for descriptor-based APIs that create immutable native blend objects, and for a console
//! graphics API. A [runtime::GraphicsDevice] owns one backend together with the lazily
//! constructed [BlendStatePresets] and handles device loss.
//!
//! # Example
//!
//! ```
//! use glitz_blend::backend::console::{
//!     BlendFuncFactor, BlendFuncMode, ConsoleBackend, ConsoleGraphics,
//! };
//! use glitz_blend::runtime::GraphicsDevice;
//!
//! struct NullGraphics;
//!
//! impl ConsoleGraphics for NullGraphics {
//!     fn set_blend_enabled(&mut self, _enabled: bool) {}
//!
//!     fn set_blend_func_rgb(&mut self, _: BlendFuncMode, _: BlendFuncFactor, _: BlendFuncFactor) {}
//!
//!     fn set_blend_func_alpha(&mut self, _: BlendFuncMode, _: BlendFuncFactor, _: BlendFuncFactor) {}
//! }
//!
//! let mut device = GraphicsDevice::new(ConsoleBackend::new(NullGraphics));
//! let alpha_blend = device.presets().alpha_blend();
//!
//! device.set_blend_state(alpha_blend);
//! device.apply_state().unwrap();
//! ```

pub mod backend;
pub mod runtime;

mod blending;
pub use self::blending::{
    BlendFactor, BlendFunction, BlendState, BlendStateBuilder, Color, ColorWriteChannels,
    RENDER_TARGET_SLOTS,
};

mod error;
pub use self::error::{
    ApplyError, InvalidBlendFactor, InvalidBlendFunction, InvalidRenderTargetSlot, NativeError,
};

mod presets;
pub use self::presets::{BlendStatePresets, PresetKind};
