use std::convert::TryFrom;
use std::fmt;

use bitflags::bitflags;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde_derive::{Deserialize, Serialize};

use crate::error::{InvalidBlendFactor, InvalidBlendFunction, InvalidRenderTargetSlot};
use crate::presets::PresetKind;

/// The number of render target slots a [BlendState] carries a color write mask for.
pub const RENDER_TARGET_SLOTS: usize = 4;

/// Enumerates the possible blending factors that can be applied to color values during
/// blending.
///
/// See the documentation for [BlendState] for details on how these blending factors are used
/// and what their effects are.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendFactor {
    One,
    Zero,
    SourceColor,
    InverseSourceColor,
    SourceAlpha,
    InverseSourceAlpha,
    DestinationColor,
    InverseDestinationColor,
    DestinationAlpha,
    InverseDestinationAlpha,
    BlendFactor,
    InverseBlendFactor,
    SourceAlphaSaturation,
}

impl BlendFactor {
    /// All blend factors, in the order of their raw codes.
    pub const ALL: [BlendFactor; 13] = [
        BlendFactor::One,
        BlendFactor::Zero,
        BlendFactor::SourceColor,
        BlendFactor::InverseSourceColor,
        BlendFactor::SourceAlpha,
        BlendFactor::InverseSourceAlpha,
        BlendFactor::DestinationColor,
        BlendFactor::InverseDestinationColor,
        BlendFactor::DestinationAlpha,
        BlendFactor::InverseDestinationAlpha,
        BlendFactor::BlendFactor,
        BlendFactor::InverseBlendFactor,
        BlendFactor::SourceAlphaSaturation,
    ];

    /// The stable raw code for this factor.
    pub fn raw(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for BlendFactor {
    type Error = InvalidBlendFactor;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        BlendFactor::ALL
            .get(raw as usize)
            .copied()
            .ok_or(InvalidBlendFactor(raw))
    }
}

/// Enumerates the available functions that can be employed to combine the source and
/// destination values during blending.
///
/// See the documentation for [BlendState] for details on how these functions act.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendFunction {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl BlendFunction {
    /// All blend functions, in the order of their raw codes.
    pub const ALL: [BlendFunction; 5] = [
        BlendFunction::Add,
        BlendFunction::Subtract,
        BlendFunction::ReverseSubtract,
        BlendFunction::Min,
        BlendFunction::Max,
    ];

    /// The stable raw code for this function.
    pub fn raw(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for BlendFunction {
    type Error = InvalidBlendFunction;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        BlendFunction::ALL
            .get(raw as usize)
            .copied()
            .ok_or(InvalidBlendFunction(raw))
    }
}

bitflags! {
    /// Describes which color channels of a render target are written to when a fragment's
    /// color output is stored.
    pub struct ColorWriteChannels: u8 {
        const NONE = 0b0000;
        const RED = 0b0001;
        const GREEN = 0b0010;
        const BLUE = 0b0100;
        const ALPHA = 0b1000;
        const ALL = Self::RED.bits | Self::GREEN.bits | Self::BLUE.bits | Self::ALPHA.bits;
    }
}

impl ColorWriteChannels {
    /// Returns the per-channel write flags as `[red, green, blue, alpha]`.
    pub fn to_mask(&self) -> [bool; 4] {
        [
            self.contains(ColorWriteChannels::RED),
            self.contains(ColorWriteChannels::GREEN),
            self.contains(ColorWriteChannels::BLUE),
            self.contains(ColorWriteChannels::ALPHA),
        ]
    }
}

impl Default for ColorWriteChannels {
    fn default() -> Self {
        ColorWriteChannels::ALL
    }
}

impl serde::Serialize for ColorWriteChannels {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> serde::Deserialize<'de> for ColorWriteChannels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = <u8 as serde::Deserialize>::deserialize(deserializer)?;

        ColorWriteChannels::from_bits(bits)
            .ok_or_else(|| de::Error::custom(format!("invalid color write channels: {:#06b}", bits)))
    }
}

/// An RGBA color with one byte per channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const TRANSPARENT_BLACK: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Returns the color with each channel mapped onto `[0, 1]`.
    pub fn to_normalized(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Provides instructions on how blending should be performed.
///
/// When blending is enabled, a fragment's color output does not merely overwrite the color
/// buffer's current color value for this fragment, but instead these two values are combined
/// using a [BlendFunction]. The new color output for the fragment is referred to as the source
/// color, the value already in the color buffer is referred to as the destination color.
/// Separate functions may be used for the RGB portion and for the alpha portion of the color
/// value; the respective functions are specified by [color_blend_function] and
/// [alpha_blend_function]:
///
/// - [BlendFunction::Add]: `O = F_s * S + F_d * D`.
/// - [BlendFunction::Subtract]: `O = F_s * S - F_d * D`.
/// - [BlendFunction::ReverseSubtract]: `O = F_d * D - F_s * S`.
/// - [BlendFunction::Min]: `O = min(F_d * D, F_s * S)`.
/// - [BlendFunction::Max]: `O = max(F_d * D, F_s * S)`.
///
/// Here `S` and `D` are the relevant portions of the source and destination values and `F_s`
/// and `F_d` are the [BlendFactor]s for `S` and `D` respectively. The factors
/// [BlendFactor::BlendFactor] and [BlendFactor::InverseBlendFactor] refer to the [blend_factor]
/// color.
///
/// Blending is considered disabled when both the color and the alpha portion use a source
/// factor of [BlendFactor::One] and a destination factor of [BlendFactor::Zero], see
/// [is_blend_enabled].
///
/// A [BlendState] may be instantiated with default values through [Default]:
///
/// ```
/// use glitz_blend::{BlendFactor, BlendFunction, BlendState, Color, ColorWriteChannels};
///
/// let state = BlendState::default();
///
/// assert_eq!(state.color_source_blend(), BlendFactor::One);
/// assert_eq!(state.color_destination_blend(), BlendFactor::Zero);
/// assert_eq!(state.alpha_blend_function(), BlendFunction::Add);
/// assert_eq!(state.blend_factor(), Color::WHITE);
/// assert_eq!(state.color_write_channels(), ColorWriteChannels::ALL);
/// assert!(!state.is_blend_enabled());
/// ```
///
/// Native backends cache objects by the value of a [BlendState]: changing a field after the
/// state has been applied is allowed and results in a different native object on the next
/// apply.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BlendState {
    color_blend_function: BlendFunction,
    alpha_blend_function: BlendFunction,
    color_source_blend: BlendFactor,
    color_destination_blend: BlendFactor,
    alpha_source_blend: BlendFactor,
    alpha_destination_blend: BlendFactor,
    blend_factor: Color,
    color_write_channels: [ColorWriteChannels; RENDER_TARGET_SLOTS],
    multi_sample_mask: i32,
}

impl BlendState {
    /// Returns a builder for a [BlendState] that starts out with the default values.
    pub fn begin() -> BlendStateBuilder {
        BlendStateBuilder {
            state: BlendState::default(),
        }
    }

    /// Returns `false` if this state is equivalent to writing the source color without
    /// blending.
    pub fn is_blend_enabled(&self) -> bool {
        !(self.color_source_blend == BlendFactor::One
            && self.color_destination_blend == BlendFactor::Zero
            && self.alpha_source_blend == BlendFactor::One
            && self.alpha_destination_blend == BlendFactor::Zero)
    }

    pub fn color_blend_function(&self) -> BlendFunction {
        self.color_blend_function
    }

    pub fn set_color_blend_function(&mut self, function: BlendFunction) {
        self.color_blend_function = function;
    }

    pub fn alpha_blend_function(&self) -> BlendFunction {
        self.alpha_blend_function
    }

    pub fn set_alpha_blend_function(&mut self, function: BlendFunction) {
        self.alpha_blend_function = function;
    }

    pub fn color_source_blend(&self) -> BlendFactor {
        self.color_source_blend
    }

    pub fn set_color_source_blend(&mut self, factor: BlendFactor) {
        self.color_source_blend = factor;
    }

    pub fn color_destination_blend(&self) -> BlendFactor {
        self.color_destination_blend
    }

    pub fn set_color_destination_blend(&mut self, factor: BlendFactor) {
        self.color_destination_blend = factor;
    }

    pub fn alpha_source_blend(&self) -> BlendFactor {
        self.alpha_source_blend
    }

    pub fn set_alpha_source_blend(&mut self, factor: BlendFactor) {
        self.alpha_source_blend = factor;
    }

    pub fn alpha_destination_blend(&self) -> BlendFactor {
        self.alpha_destination_blend
    }

    pub fn set_alpha_destination_blend(&mut self, factor: BlendFactor) {
        self.alpha_destination_blend = factor;
    }

    /// The color used by [BlendFactor::BlendFactor] and [BlendFactor::InverseBlendFactor].
    pub fn blend_factor(&self) -> Color {
        self.blend_factor
    }

    pub fn set_blend_factor(&mut self, color: Color) {
        self.blend_factor = color;
    }

    /// The channels written to the first render target.
    pub fn color_write_channels(&self) -> ColorWriteChannels {
        self.color_write_channels[0]
    }

    pub fn set_color_write_channels(&mut self, channels: ColorWriteChannels) {
        self.color_write_channels[0] = channels;
    }

    /// The channels written to the render target in the given `slot`, or `None` if `slot` is not
    /// smaller than [RENDER_TARGET_SLOTS].
    pub fn render_target_write_channels(&self, slot: usize) -> Option<ColorWriteChannels> {
        self.color_write_channels.get(slot).copied()
    }

    /// Sets the channels written to the render target in the given `slot`.
    ///
    /// Returns an [InvalidRenderTargetSlot] error if `slot` is not smaller than
    /// [RENDER_TARGET_SLOTS].
    pub fn set_render_target_write_channels(
        &mut self,
        slot: usize,
        channels: ColorWriteChannels,
    ) -> Result<(), InvalidRenderTargetSlot> {
        let target = self
            .color_write_channels
            .get_mut(slot)
            .ok_or(InvalidRenderTargetSlot(slot))?;

        *target = channels;

        Ok(())
    }

    /// The write channels for all render target slots, in slot order.
    pub fn all_write_channels(&self) -> &[ColorWriteChannels; RENDER_TARGET_SLOTS] {
        &self.color_write_channels
    }

    pub fn multi_sample_mask(&self) -> i32 {
        self.multi_sample_mask
    }

    pub fn set_multi_sample_mask(&mut self, mask: i32) {
        self.multi_sample_mask = mask;
    }
}

impl Default for BlendState {
    fn default() -> Self {
        BlendState {
            color_blend_function: BlendFunction::Add,
            alpha_blend_function: BlendFunction::Add,
            color_source_blend: BlendFactor::One,
            color_destination_blend: BlendFactor::Zero,
            alpha_source_blend: BlendFactor::One,
            alpha_destination_blend: BlendFactor::Zero,
            blend_factor: Color::WHITE,
            color_write_channels: [ColorWriteChannels::ALL; RENDER_TARGET_SLOTS],
            multi_sample_mask: i32::MAX,
        }
    }
}

impl fmt::Display for BlendState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match PresetKind::of(self) {
            Some(kind) => write!(f, "BlendState.{}", kind),
            None => f.write_str("BlendState.Custom"),
        }
    }
}

/// Builds a [BlendState], see [BlendState::begin].
///
/// # Example
///
/// ```
/// use glitz_blend::{BlendFactor, BlendState};
///
/// let state = BlendState::begin()
///     .source_blend(BlendFactor::SourceAlpha)
///     .destination_blend(BlendFactor::InverseSourceAlpha)
///     .finish();
///
/// assert_eq!(state.alpha_source_blend(), BlendFactor::SourceAlpha);
/// assert!(state.is_blend_enabled());
/// ```
pub struct BlendStateBuilder {
    state: BlendState,
}

impl BlendStateBuilder {
    /// Sets the same function for the color and the alpha portion.
    pub fn blend_function(mut self, function: BlendFunction) -> Self {
        self.state.color_blend_function = function;
        self.state.alpha_blend_function = function;

        self
    }

    pub fn color_blend_function(mut self, function: BlendFunction) -> Self {
        self.state.color_blend_function = function;

        self
    }

    pub fn alpha_blend_function(mut self, function: BlendFunction) -> Self {
        self.state.alpha_blend_function = function;

        self
    }

    /// Sets the same source factor for the color and the alpha portion.
    pub fn source_blend(mut self, factor: BlendFactor) -> Self {
        self.state.color_source_blend = factor;
        self.state.alpha_source_blend = factor;

        self
    }

    /// Sets the same destination factor for the color and the alpha portion.
    pub fn destination_blend(mut self, factor: BlendFactor) -> Self {
        self.state.color_destination_blend = factor;
        self.state.alpha_destination_blend = factor;

        self
    }

    pub fn color_source_blend(mut self, factor: BlendFactor) -> Self {
        self.state.color_source_blend = factor;

        self
    }

    pub fn color_destination_blend(mut self, factor: BlendFactor) -> Self {
        self.state.color_destination_blend = factor;

        self
    }

    pub fn alpha_source_blend(mut self, factor: BlendFactor) -> Self {
        self.state.alpha_source_blend = factor;

        self
    }

    pub fn alpha_destination_blend(mut self, factor: BlendFactor) -> Self {
        self.state.alpha_destination_blend = factor;

        self
    }

    pub fn blend_factor(mut self, color: Color) -> Self {
        self.state.blend_factor = color;

        self
    }

    /// Sets the write channels for every render target slot.
    pub fn write_channels(mut self, channels: ColorWriteChannels) -> Self {
        self.state.color_write_channels = [channels; RENDER_TARGET_SLOTS];

        self
    }

    /// Fails if `slot` is not smaller than [RENDER_TARGET_SLOTS].
    pub fn render_target_write_channels(
        mut self,
        slot: usize,
        channels: ColorWriteChannels,
    ) -> Result<Self, InvalidRenderTargetSlot> {
        self.state.set_render_target_write_channels(slot, channels)?;

        Ok(self)
    }

    pub fn multi_sample_mask(mut self, mask: i32) -> Self {
        self.state.multi_sample_mask = mask;

        self
    }

    pub fn finish(self) -> BlendState {
        self.state
    }
}
