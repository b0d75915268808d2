use crate::backend::BlendBackend;
use crate::blending::{BlendFactor, BlendFunction, BlendState};
use crate::error::ApplyError;
use crate::runtime::DeviceGeneration;

/// Blend modes of the console graphics API.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BlendFuncMode {
    Add,
    Subtract,
    ReverseSubtract,
}

/// Blend factors of the console graphics API.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BlendFuncFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
}

/// Maps a portable blend function onto a console blend mode.
///
/// The console API has no `min`/`max` modes.
pub fn blend_func_mode(function: BlendFunction) -> Result<BlendFuncMode, ApplyError> {
    match function {
        BlendFunction::Add => Ok(BlendFuncMode::Add),
        BlendFunction::Subtract => Ok(BlendFuncMode::Subtract),
        BlendFunction::ReverseSubtract => Ok(BlendFuncMode::ReverseSubtract),
        BlendFunction::Min | BlendFunction::Max => {
            Err(ApplyError::UnsupportedBlendFunction(function))
        }
    }
}

/// Maps a portable blend factor onto a console blend factor.
///
/// The console API has no constant blend color, so [BlendFactor::BlendFactor] and
/// [BlendFactor::InverseBlendFactor] are rejected.
pub fn blend_func_factor(factor: BlendFactor) -> Result<BlendFuncFactor, ApplyError> {
    match factor {
        BlendFactor::Zero => Ok(BlendFuncFactor::Zero),
        BlendFactor::One => Ok(BlendFuncFactor::One),
        BlendFactor::SourceColor => Ok(BlendFuncFactor::SrcColor),
        BlendFactor::InverseSourceColor => Ok(BlendFuncFactor::OneMinusSrcColor),
        BlendFactor::SourceAlpha => Ok(BlendFuncFactor::SrcAlpha),
        BlendFactor::InverseSourceAlpha => Ok(BlendFuncFactor::OneMinusSrcAlpha),
        BlendFactor::DestinationColor => Ok(BlendFuncFactor::DstColor),
        BlendFactor::InverseDestinationColor => Ok(BlendFuncFactor::OneMinusDstColor),
        BlendFactor::DestinationAlpha => Ok(BlendFuncFactor::DstAlpha),
        BlendFactor::InverseDestinationAlpha => Ok(BlendFuncFactor::OneMinusDstAlpha),
        BlendFactor::SourceAlphaSaturation => Ok(BlendFuncFactor::SrcAlphaSaturate),
        BlendFactor::BlendFactor | BlendFactor::InverseBlendFactor => {
            Err(ApplyError::UnsupportedBlendFactor(factor))
        }
    }
}

/// The graphics context of the console API.
pub trait ConsoleGraphics {
    fn set_blend_enabled(&mut self, enabled: bool);

    fn set_blend_func_rgb(&mut self, mode: BlendFuncMode, src: BlendFuncFactor, dst: BlendFuncFactor);

    fn set_blend_func_alpha(
        &mut self,
        mode: BlendFuncMode,
        src: BlendFuncFactor,
        dst: BlendFuncFactor,
    );
}

/// Applies blend state to a [ConsoleGraphics] context.
///
/// Every apply issues the enable flag and both channel-group calls; there is no caching. The
/// whole state is translated before any call is made, so an unsupported value leaves the context
/// untouched.
pub struct ConsoleBackend<G> {
    graphics: G,
}

impl<G> ConsoleBackend<G>
where
    G: ConsoleGraphics,
{
    pub fn new(graphics: G) -> Self {
        ConsoleBackend { graphics }
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }
}

impl<G> BlendBackend for ConsoleBackend<G>
where
    G: ConsoleGraphics,
{
    fn apply_blend_state(
        &mut self,
        state: &BlendState,
        _generation: DeviceGeneration,
    ) -> Result<(), ApplyError> {
        let rgb_mode = blend_func_mode(state.color_blend_function())?;
        let rgb_src = blend_func_factor(state.color_source_blend())?;
        let rgb_dst = blend_func_factor(state.color_destination_blend())?;
        let alpha_mode = blend_func_mode(state.alpha_blend_function())?;
        let alpha_src = blend_func_factor(state.alpha_source_blend())?;
        let alpha_dst = blend_func_factor(state.alpha_destination_blend())?;

        self.graphics.set_blend_enabled(state.is_blend_enabled());
        self.graphics.set_blend_func_alpha(alpha_mode, alpha_src, alpha_dst);
        self.graphics.set_blend_func_rgb(rgb_mode, rgb_src, rgb_dst);

        Ok(())
    }

    fn reset_states(&mut self) {}
}
