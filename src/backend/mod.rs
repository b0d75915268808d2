//! Backends that translate a [BlendState] into calls against a native graphics API.
//!
//! Three backends are provided:
//!
//! - [gl::GlBackend] drives an OpenGL-family context (WebGL 2.0 through `web-sys`, or anything
//!   else implementing [gl::GlContext]).
//! - [descriptor::DescriptorBackend] targets APIs that bake blend configuration into immutable
//!   state objects created from a descriptor, in the style of Direct3D 11.
//! - [console::ConsoleBackend] targets a console graphics API that sets blending through one
//!   combined mode and factor call per channel group.

use crate::blending::BlendState;
use crate::error::ApplyError;
use crate::runtime::DeviceGeneration;

pub mod console;
pub mod descriptor;
pub mod gl;

/// Applies [BlendState]s to a native graphics context.
pub trait BlendBackend {
    /// Applies the `state` to the context.
    ///
    /// The `generation` identifies the device incarnation the context belongs to: native objects
    /// created for an earlier generation must not be reused.
    fn apply_blend_state(
        &mut self,
        state: &BlendState,
        generation: DeviceGeneration,
    ) -> Result<(), ApplyError>;

    /// Discards any native objects or shadowed context state.
    ///
    /// Called when the device is lost or recreated.
    fn reset_states(&mut self);
}
