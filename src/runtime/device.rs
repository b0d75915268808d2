use std::fmt;
use std::rc::Rc;

use crate::backend::BlendBackend;
use crate::blending::BlendState;
use crate::error::ApplyError;
use crate::presets::BlendStatePresets;

/// Identifies one incarnation of a graphics device.
///
/// The generation advances every time the device is lost; native objects created for one
/// generation are invalid in any other.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DeviceGeneration(u64);

impl DeviceGeneration {
    pub const FIRST: DeviceGeneration = DeviceGeneration(0);

    pub fn next(&self) -> Self {
        DeviceGeneration(self.0 + 1)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceGeneration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A graphics device that applies [BlendState]s through a [BlendBackend].
///
/// The device owns the [BlendStatePresets] registry and the current [DeviceGeneration]. When
/// the native device is lost, [device_lost](GraphicsDevice::device_lost) advances the
/// generation, resets the presets and releases the backend's native objects.
///
/// The device tracks the currently bound blend state: [set_blend_state] only marks it for
/// application, [apply_state] applies it if it changed since the last successful apply.
///
/// [set_blend_state]: GraphicsDevice::set_blend_state
/// [apply_state]: GraphicsDevice::apply_state
pub struct GraphicsDevice<B> {
    backend: B,
    presets: BlendStatePresets,
    generation: DeviceGeneration,
    blend_state: Rc<BlendState>,
    blend_state_dirty: bool,
}

impl<B> GraphicsDevice<B>
where
    B: BlendBackend,
{
    /// Creates a device with the [Opaque](crate::PresetKind::Opaque) preset bound.
    pub fn new(backend: B) -> Self {
        let presets = BlendStatePresets::new();
        let blend_state = presets.opaque();

        GraphicsDevice {
            backend,
            presets,
            generation: DeviceGeneration::FIRST,
            blend_state,
            blend_state_dirty: true,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn presets(&self) -> &BlendStatePresets {
        &self.presets
    }

    pub fn generation(&self) -> DeviceGeneration {
        self.generation
    }

    pub fn blend_state(&self) -> &Rc<BlendState> {
        &self.blend_state
    }

    /// Binds `state` as the current blend state.
    ///
    /// The state is applied on the next call to [apply_state](GraphicsDevice::apply_state),
    /// unless it equals the state that is already bound.
    pub fn set_blend_state(&mut self, state: Rc<BlendState>) {
        if !Rc::ptr_eq(&self.blend_state, &state) && *self.blend_state != *state {
            self.blend_state_dirty = true;
        }

        self.blend_state = state;
    }

    /// Applies the bound blend state if it changed since it was last applied.
    pub fn apply_state(&mut self) -> Result<(), ApplyError> {
        if self.blend_state_dirty {
            self.backend
                .apply_blend_state(&self.blend_state, self.generation)?;
            self.blend_state_dirty = false;
        }

        Ok(())
    }

    /// Applies `state` immediately, regardless of the bound blend state.
    ///
    /// A failed apply may leave the context partially updated, so the bound state is re-applied
    /// by the next [apply_state](GraphicsDevice::apply_state) even if it equals `state`.
    pub fn apply_blend_state(&mut self, state: &BlendState) -> Result<(), ApplyError> {
        let result = self.backend.apply_blend_state(state, self.generation);

        if result.is_err() || *state != *self.blend_state {
            self.blend_state_dirty = true;
        }

        result
    }

    /// Handles the loss of the native device.
    ///
    /// Advances the generation, resets the preset registry and releases all native blend
    /// objects. The bound blend state is kept and re-applied by the next
    /// [apply_state](GraphicsDevice::apply_state).
    pub fn device_lost(&mut self) {
        self.generation = self.generation.next();

        log::debug!("device lost, advancing to generation {}", self.generation);

        self.presets.reset();
        self.backend.reset_states();
        self.blend_state_dirty = true;
    }
}
