use std::collections::hash_map::Entry;

use bitflags::bitflags;
use fnv::FnvHashMap;

use crate::backend::BlendBackend;
use crate::blending::{
    BlendFactor, BlendFunction, BlendState, ColorWriteChannels, RENDER_TARGET_SLOTS,
};
use crate::error::{ApplyError, NativeError};
use crate::runtime::DeviceGeneration;

/// Blend options of a descriptor-based API, with Direct3D 11 discriminants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum BlendOption {
    Zero = 1,
    One = 2,
    SourceColor = 3,
    InverseSourceColor = 4,
    SourceAlpha = 5,
    InverseSourceAlpha = 6,
    DestinationAlpha = 7,
    InverseDestinationAlpha = 8,
    DestinationColor = 9,
    InverseDestinationColor = 10,
    SourceAlphaSaturate = 11,
    BlendFactor = 14,
    InverseBlendFactor = 15,
}

/// Blend operations of a descriptor-based API, with Direct3D 11 discriminants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum BlendOperation {
    Add = 1,
    Subtract = 2,
    ReverseSubtract = 3,
    Minimum = 4,
    Maximum = 5,
}

bitflags! {
    /// Render target write mask of a descriptor-based API.
    pub struct ColorWriteMask: u8 {
        const RED = 1;
        const GREEN = 2;
        const BLUE = 4;
        const ALPHA = 8;
        const ALL = Self::RED.bits | Self::GREEN.bits | Self::BLUE.bits | Self::ALPHA.bits;
    }
}

/// Maps a portable blend function onto a native blend operation.
pub fn blend_operation(function: BlendFunction) -> BlendOperation {
    match function {
        BlendFunction::Add => BlendOperation::Add,
        BlendFunction::Subtract => BlendOperation::Subtract,
        BlendFunction::ReverseSubtract => BlendOperation::ReverseSubtract,
        BlendFunction::Min => BlendOperation::Minimum,
        BlendFunction::Max => BlendOperation::Maximum,
    }
}

/// Maps a portable blend factor onto a native blend option.
///
/// The alpha slot of a native descriptor only accepts alpha options, so when `alpha` is `true`
/// the color factors are replaced by their alpha counterparts.
pub fn blend_option(factor: BlendFactor, alpha: bool) -> BlendOption {
    match factor {
        BlendFactor::One => BlendOption::One,
        BlendFactor::Zero => BlendOption::Zero,
        BlendFactor::SourceColor if alpha => BlendOption::SourceAlpha,
        BlendFactor::SourceColor => BlendOption::SourceColor,
        BlendFactor::InverseSourceColor if alpha => BlendOption::InverseSourceAlpha,
        BlendFactor::InverseSourceColor => BlendOption::InverseSourceColor,
        BlendFactor::SourceAlpha => BlendOption::SourceAlpha,
        BlendFactor::InverseSourceAlpha => BlendOption::InverseSourceAlpha,
        BlendFactor::DestinationColor if alpha => BlendOption::DestinationAlpha,
        BlendFactor::DestinationColor => BlendOption::DestinationColor,
        BlendFactor::InverseDestinationColor if alpha => BlendOption::InverseDestinationAlpha,
        BlendFactor::InverseDestinationColor => BlendOption::InverseDestinationColor,
        BlendFactor::DestinationAlpha => BlendOption::DestinationAlpha,
        BlendFactor::InverseDestinationAlpha => BlendOption::InverseDestinationAlpha,
        BlendFactor::BlendFactor => BlendOption::BlendFactor,
        BlendFactor::InverseBlendFactor => BlendOption::InverseBlendFactor,
        BlendFactor::SourceAlphaSaturation => BlendOption::SourceAlphaSaturate,
    }
}

/// Maps portable write channels onto a native write mask.
pub fn color_write_mask(channels: ColorWriteChannels) -> ColorWriteMask {
    let mut mask = ColorWriteMask::empty();

    if channels.contains(ColorWriteChannels::RED) {
        mask |= ColorWriteMask::RED;
    }

    if channels.contains(ColorWriteChannels::GREEN) {
        mask |= ColorWriteMask::GREEN;
    }

    if channels.contains(ColorWriteChannels::BLUE) {
        mask |= ColorWriteMask::BLUE;
    }

    if channels.contains(ColorWriteChannels::ALPHA) {
        mask |= ColorWriteMask::ALPHA;
    }

    mask
}

/// Blend configuration for a single render target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderTargetBlendDescriptor {
    pub blend_enable: bool,
    pub source_blend: BlendOption,
    pub destination_blend: BlendOption,
    pub blend_operation: BlendOperation,
    pub source_alpha_blend: BlendOption,
    pub destination_alpha_blend: BlendOption,
    pub alpha_blend_operation: BlendOperation,
    pub write_mask: ColorWriteMask,
}

/// Describes an immutable native blend state object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlendStateDescriptor {
    pub alpha_to_coverage_enable: bool,
    pub independent_blend_enable: bool,
    pub render_targets: [RenderTargetBlendDescriptor; RENDER_TARGET_SLOTS],
}

impl BlendStateDescriptor {
    /// Translates a [BlendState] into a descriptor.
    ///
    /// All render targets share the same blend configuration; only the write masks differ per
    /// target.
    pub fn from_state(state: &BlendState) -> Self {
        let target = RenderTargetBlendDescriptor {
            blend_enable: state.is_blend_enabled(),
            source_blend: blend_option(state.color_source_blend(), false),
            destination_blend: blend_option(state.color_destination_blend(), false),
            blend_operation: blend_operation(state.color_blend_function()),
            source_alpha_blend: blend_option(state.alpha_source_blend(), true),
            destination_alpha_blend: blend_option(state.alpha_destination_blend(), true),
            alpha_blend_operation: blend_operation(state.alpha_blend_function()),
            write_mask: ColorWriteMask::ALL,
        };

        let mut render_targets = [target; RENDER_TARGET_SLOTS];

        for (target, channels) in render_targets.iter_mut().zip(state.all_write_channels()) {
            target.write_mask = color_write_mask(*channels);
        }

        BlendStateDescriptor {
            alpha_to_coverage_enable: false,
            independent_blend_enable: false,
            render_targets,
        }
    }
}

/// A device that bakes blend configuration into immutable state objects.
///
/// The caller holds whatever lock the device's immediate context requires while the backend
/// calls [set_blend_state](NativeDevice::set_blend_state).
pub trait NativeDevice {
    type BlendStateObject;

    fn create_blend_state(
        &mut self,
        descriptor: &BlendStateDescriptor,
    ) -> Result<Self::BlendStateObject, NativeError>;

    fn set_blend_state(
        &mut self,
        object: &Self::BlendStateObject,
        blend_factor: [f32; 4],
        sample_mask: u32,
    );
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct BlendStateKey {
    descriptor: BlendStateDescriptor,
    generation: DeviceGeneration,
}

/// Applies blend state through a [NativeDevice].
///
/// Native objects are cached by their [BlendStateDescriptor] per device generation, so states
/// that differ only in their blend factor or sample mask share one object; those two values are
/// passed on every bind. When a state is applied for a new generation, objects created for earlier
/// generations are released.
pub struct DescriptorBackend<D>
where
    D: NativeDevice,
{
    device: D,
    cache: FnvHashMap<BlendStateKey, D::BlendStateObject>,
    generation: Option<DeviceGeneration>,
}

impl<D> DescriptorBackend<D>
where
    D: NativeDevice,
{
    pub fn new(device: D) -> Self {
        DescriptorBackend {
            device,
            cache: FnvHashMap::default(),
            generation: None,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The number of native blend state objects currently alive.
    pub fn cached_objects(&self) -> usize {
        self.cache.len()
    }

    /// Returns the descriptor the native object for `state` was created from, if that object
    /// exists for the `generation`.
    pub fn descriptor(
        &self,
        state: &BlendState,
        generation: DeviceGeneration,
    ) -> Option<&BlendStateDescriptor> {
        let key = BlendStateKey {
            descriptor: BlendStateDescriptor::from_state(state),
            generation,
        };

        self.cache
            .get_key_value(&key)
            .map(|(key, _)| &key.descriptor)
    }
}

impl<D> BlendBackend for DescriptorBackend<D>
where
    D: NativeDevice,
{
    fn apply_blend_state(
        &mut self,
        state: &BlendState,
        generation: DeviceGeneration,
    ) -> Result<(), ApplyError> {
        if self.generation != Some(generation) {
            if !self.cache.is_empty() {
                log::debug!(
                    "releasing {} blend state objects from an earlier device generation",
                    self.cache.len()
                );
            }

            self.cache.clear();
            self.generation = Some(generation);
        }

        let key = BlendStateKey {
            descriptor: BlendStateDescriptor::from_state(state),
            generation,
        };

        let object = match self.cache.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let object = self.device.create_blend_state(&key.descriptor)?;

                log::debug!("created native object for {} (generation {})", state, generation);

                entry.insert(object)
            }
        };

        self.device.set_blend_state(
            object,
            state.blend_factor().to_normalized(),
            state.multi_sample_mask() as u32,
        );

        Ok(())
    }

    fn reset_states(&mut self) {
        log::debug!("releasing {} native blend state objects", self.cache.len());

        self.cache.clear();
        self.generation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::blending::Color;
    use crate::presets::PresetKind;

    #[derive(Default)]
    struct FakeDevice {
        created: Vec<BlendStateDescriptor>,
        bound: Vec<(usize, [f32; 4], u32)>,
        fail: bool,
    }

    impl NativeDevice for FakeDevice {
        type BlendStateObject = usize;

        fn create_blend_state(
            &mut self,
            descriptor: &BlendStateDescriptor,
        ) -> Result<usize, NativeError> {
            if self.fail {
                return Err(NativeError::new("out of memory"));
            }

            self.created.push(*descriptor);

            Ok(self.created.len() - 1)
        }

        fn set_blend_state(&mut self, object: &usize, blend_factor: [f32; 4], sample_mask: u32) {
            self.bound.push((*object, blend_factor, sample_mask));
        }
    }

    #[test]
    fn test_blend_operation_mapping() {
        assert_eq!(blend_operation(BlendFunction::Add), BlendOperation::Add);
        assert_eq!(blend_operation(BlendFunction::Subtract), BlendOperation::Subtract);
        assert_eq!(
            blend_operation(BlendFunction::ReverseSubtract),
            BlendOperation::ReverseSubtract
        );
        assert_eq!(blend_operation(BlendFunction::Min), BlendOperation::Minimum);
        assert_eq!(blend_operation(BlendFunction::Max), BlendOperation::Maximum);
    }

    #[test]
    fn test_color_factors_collapse_in_alpha_slot() {
        let collapsed = [
            (BlendFactor::SourceColor, BlendOption::SourceAlpha),
            (BlendFactor::InverseSourceColor, BlendOption::InverseSourceAlpha),
            (BlendFactor::DestinationColor, BlendOption::DestinationAlpha),
            (
                BlendFactor::InverseDestinationColor,
                BlendOption::InverseDestinationAlpha,
            ),
        ];

        for (factor, alpha_option) in collapsed.iter() {
            assert_eq!(blend_option(*factor, true), *alpha_option);
            assert_ne!(blend_option(*factor, false), *alpha_option);
        }

        assert_eq!(
            blend_option(BlendFactor::DestinationColor, false),
            BlendOption::DestinationColor
        );
    }

    #[test]
    fn test_non_color_factors_are_slot_independent() {
        let color_only = [
            BlendFactor::SourceColor,
            BlendFactor::InverseSourceColor,
            BlendFactor::DestinationColor,
            BlendFactor::InverseDestinationColor,
        ];

        for factor in BlendFactor::ALL.iter() {
            if !color_only.contains(factor) {
                assert_eq!(blend_option(*factor, true), blend_option(*factor, false));
            }
        }
    }

    #[test]
    fn test_color_write_mask_is_bitwise_or() {
        assert_eq!(color_write_mask(ColorWriteChannels::ALL), ColorWriteMask::ALL);
        assert_eq!(color_write_mask(ColorWriteChannels::NONE), ColorWriteMask::empty());
        assert_eq!(
            color_write_mask(ColorWriteChannels::GREEN | ColorWriteChannels::ALPHA),
            ColorWriteMask::GREEN | ColorWriteMask::ALPHA
        );
        assert_eq!(
            color_write_mask(ColorWriteChannels::BLUE).bits(),
            ColorWriteMask::BLUE.bits()
        );
    }

    #[test]
    fn test_descriptor_replicates_targets_with_own_write_masks() {
        let state = BlendState::begin()
            .source_blend(BlendFactor::SourceColor)
            .destination_blend(BlendFactor::InverseDestinationColor)
            .render_target_write_channels(1, ColorWriteChannels::RED)
            .unwrap()
            .render_target_write_channels(3, ColorWriteChannels::NONE)
            .unwrap()
            .finish();

        let descriptor = BlendStateDescriptor::from_state(&state);

        assert!(!descriptor.alpha_to_coverage_enable);
        assert!(!descriptor.independent_blend_enable);

        let first = descriptor.render_targets[0];

        assert!(first.blend_enable);
        assert_eq!(first.source_blend, BlendOption::SourceColor);
        assert_eq!(first.destination_blend, BlendOption::InverseDestinationColor);
        assert_eq!(first.source_alpha_blend, BlendOption::SourceAlpha);
        assert_eq!(first.destination_alpha_blend, BlendOption::InverseDestinationAlpha);
        assert_eq!(first.write_mask, ColorWriteMask::ALL);

        let masks: Vec<_> = descriptor
            .render_targets
            .iter()
            .map(|target| target.write_mask)
            .collect();

        assert_eq!(
            masks,
            vec![
                ColorWriteMask::ALL,
                ColorWriteMask::RED,
                ColorWriteMask::ALL,
                ColorWriteMask::empty()
            ]
        );

        for target in descriptor.render_targets.iter() {
            assert_eq!(
                RenderTargetBlendDescriptor {
                    write_mask: first.write_mask,
                    ..*target
                },
                first
            );
        }
    }

    #[test]
    fn test_opaque_descriptor_disables_blending() {
        let descriptor = BlendStateDescriptor::from_state(&PresetKind::Opaque.build());

        assert!(descriptor
            .render_targets
            .iter()
            .all(|target| !target.blend_enable));
    }

    #[test]
    fn test_native_object_is_created_once() {
        let mut backend = DescriptorBackend::new(FakeDevice::default());
        let state = PresetKind::AlphaBlend.build();
        let generation = DeviceGeneration::FIRST;

        backend.apply_blend_state(&state, generation).unwrap();
        backend.apply_blend_state(&state, generation).unwrap();

        assert_eq!(backend.device().created.len(), 1);
        assert_eq!(backend.device().bound.len(), 2);
        assert_eq!(
            backend.descriptor(&state, generation),
            Some(&BlendStateDescriptor::from_state(&state))
        );
    }

    #[test]
    fn test_binds_blend_factor_and_sample_mask() {
        let mut backend = DescriptorBackend::new(FakeDevice::default());
        let state = BlendState::begin()
            .blend_factor(Color::new(255, 0, 255, 0))
            .multi_sample_mask(0b1010)
            .finish();

        backend
            .apply_blend_state(&state, DeviceGeneration::FIRST)
            .unwrap();

        assert_eq!(
            backend.device().bound,
            vec![(0, [1.0, 0.0, 1.0, 0.0], 0b1010)]
        );
    }

    #[test]
    fn test_blend_factor_and_sample_mask_share_one_object() {
        let mut backend = DescriptorBackend::new(FakeDevice::default());
        let mut state = PresetKind::AlphaBlend.build();

        for i in 0..=255u8 {
            state.set_blend_factor(Color::new(i, i, i, 255));
            state.set_multi_sample_mask(i as i32);

            backend
                .apply_blend_state(&state, DeviceGeneration::FIRST)
                .unwrap();
        }

        assert_eq!(backend.device().created.len(), 1);
        assert_eq!(backend.cached_objects(), 1);
        assert_eq!(backend.device().bound.len(), 256);
        assert_eq!(backend.device().bound[255], (0, [1.0; 4], 255));
    }

    #[test]
    fn test_mutated_state_gets_its_own_object() {
        let mut backend = DescriptorBackend::new(FakeDevice::default());
        let mut state = BlendState::default();

        backend
            .apply_blend_state(&state, DeviceGeneration::FIRST)
            .unwrap();

        state.set_color_blend_function(BlendFunction::Max);

        backend
            .apply_blend_state(&state, DeviceGeneration::FIRST)
            .unwrap();

        assert_eq!(backend.cached_objects(), 2);
        assert_eq!(
            backend.device().created[1].render_targets[0].blend_operation,
            BlendOperation::Maximum
        );
    }

    #[test]
    fn test_new_generation_recreates_objects() {
        let mut backend = DescriptorBackend::new(FakeDevice::default());
        let state = PresetKind::Additive.build();
        let first = DeviceGeneration::FIRST;

        backend.apply_blend_state(&state, first).unwrap();
        backend.apply_blend_state(&state, first.next()).unwrap();

        assert_eq!(backend.device().created.len(), 2);
        assert_eq!(backend.cached_objects(), 1);
        assert!(backend.descriptor(&state, first).is_none());
        assert!(backend.descriptor(&state, first.next()).is_some());
    }

    #[test]
    fn test_reset_releases_objects() {
        let mut backend = DescriptorBackend::new(FakeDevice::default());
        let state = PresetKind::Additive.build();

        backend
            .apply_blend_state(&state, DeviceGeneration::FIRST)
            .unwrap();
        backend.reset_states();

        assert_eq!(backend.cached_objects(), 0);

        backend
            .apply_blend_state(&state, DeviceGeneration::FIRST)
            .unwrap();

        assert_eq!(backend.device().created.len(), 2);
    }

    #[test]
    fn test_creation_failure_is_reported_and_not_cached() {
        let mut backend = DescriptorBackend::new(FakeDevice {
            fail: true,
            ..FakeDevice::default()
        });

        let result = backend.apply_blend_state(&BlendState::default(), DeviceGeneration::FIRST);

        assert_eq!(
            result,
            Err(ApplyError::Native(NativeError::new("out of memory")))
        );
        assert_eq!(backend.cached_objects(), 0);
        assert!(backend.device().bound.is_empty());
    }
}
