use web_sys::WebGl2RenderingContext as Gl;

use crate::backend::BlendBackend;
use crate::blending::{BlendFactor, BlendFunction, BlendState};
use crate::error::ApplyError;
use crate::runtime::{DeviceGeneration, DeviceOptions};

/// The subset of an OpenGL-family context needed to apply blend state.
///
/// Method names and argument order follow the GL entry points; enum arguments are raw GL
/// constants. Implemented for [web_sys::WebGl2RenderingContext].
pub trait GlContext {
    fn enable(&self, capability: u32);

    fn disable(&self, capability: u32);

    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32);

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32);

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool);

    fn get_error(&self) -> u32;
}

impl GlContext for Gl {
    fn enable(&self, capability: u32) {
        Gl::enable(self, capability)
    }

    fn disable(&self, capability: u32) {
        Gl::disable(self, capability)
    }

    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        Gl::blend_color(self, red, green, blue, alpha)
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        Gl::blend_equation_separate(self, mode_rgb, mode_alpha)
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        Gl::blend_func_separate(self, src_rgb, dst_rgb, src_alpha, dst_alpha)
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        Gl::color_mask(self, red, green, blue, alpha)
    }

    fn get_error(&self) -> u32 {
        Gl::get_error(self)
    }
}

/// Returns the GL blend equation constant for `function`.
pub fn blend_equation_id(function: BlendFunction) -> u32 {
    match function {
        BlendFunction::Add => Gl::FUNC_ADD,
        BlendFunction::Subtract => Gl::FUNC_SUBTRACT,
        BlendFunction::ReverseSubtract => Gl::FUNC_REVERSE_SUBTRACT,
        BlendFunction::Min => Gl::MIN,
        BlendFunction::Max => Gl::MAX,
    }
}

/// Returns the GL blend factor constant for `factor`.
///
/// [BlendFactor::BlendFactor] and [BlendFactor::InverseBlendFactor] map onto the constant color
/// set through `blendColor`.
pub fn blend_factor_id(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::One => Gl::ONE,
        BlendFactor::Zero => Gl::ZERO,
        BlendFactor::SourceColor => Gl::SRC_COLOR,
        BlendFactor::InverseSourceColor => Gl::ONE_MINUS_SRC_COLOR,
        BlendFactor::SourceAlpha => Gl::SRC_ALPHA,
        BlendFactor::InverseSourceAlpha => Gl::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DestinationColor => Gl::DST_COLOR,
        BlendFactor::InverseDestinationColor => Gl::ONE_MINUS_DST_COLOR,
        BlendFactor::DestinationAlpha => Gl::DST_ALPHA,
        BlendFactor::InverseDestinationAlpha => Gl::ONE_MINUS_DST_ALPHA,
        BlendFactor::BlendFactor => Gl::CONSTANT_COLOR,
        BlendFactor::InverseBlendFactor => Gl::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::SourceAlphaSaturation => Gl::SRC_ALPHA_SATURATE,
    }
}

/// A pending change to the GL context.
///
/// Applying the update issues the GL call (if any) and returns the name of the entry point that
/// was called.
pub trait ContextUpdate<C> {
    fn apply(self, context: &C) -> Option<&'static str>;
}

impl<C, F> ContextUpdate<C> for Option<F>
where
    F: FnOnce(&C) -> &'static str,
{
    fn apply(self, context: &C) -> Option<&'static str> {
        self.map(|f| f(context))
    }
}

/// Shadow copy of the blend-related GL context state.
///
/// Every setter compares against the shadowed value and only produces a GL call when the value
/// changes. After [invalidate](GlBlendCache::invalidate) the context state is considered unknown
/// and the next call to each setter always produces a GL call.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct GlBlendCache {
    blend_enabled: Option<bool>,
    blend_color: Option<[f32; 4]>,
    blend_equations: Option<(BlendFunction, BlendFunction)>,
    blend_func: Option<[BlendFactor; 4]>,
    color_mask: Option<[bool; 4]>,
}

impl GlBlendCache {
    pub fn new() -> Self {
        GlBlendCache::default()
    }

    pub fn invalidate(&mut self) {
        *self = GlBlendCache::default();
    }

    pub fn blend_enabled(&self) -> Option<bool> {
        self.blend_enabled
    }

    pub fn set_blend_enabled<C>(&mut self, blend_enabled: bool) -> impl ContextUpdate<C>
    where
        C: GlContext,
    {
        if self.blend_enabled != Some(blend_enabled) {
            self.blend_enabled = Some(blend_enabled);

            Some(move |context: &C| {
                if blend_enabled {
                    context.enable(Gl::BLEND);

                    "enable"
                } else {
                    context.disable(Gl::BLEND);

                    "disable"
                }
            })
        } else {
            None
        }
    }

    pub fn blend_color(&self) -> Option<[f32; 4]> {
        self.blend_color
    }

    pub fn set_blend_color<C>(&mut self, blend_color: [f32; 4]) -> impl ContextUpdate<C>
    where
        C: GlContext,
    {
        if self.blend_color != Some(blend_color) {
            self.blend_color = Some(blend_color);

            Some(move |context: &C| {
                let [r, g, b, a] = blend_color;

                context.blend_color(r, g, b, a);

                "blendColor"
            })
        } else {
            None
        }
    }

    pub fn blend_equations(&self) -> Option<(BlendFunction, BlendFunction)> {
        self.blend_equations
    }

    pub fn set_blend_equations<C>(
        &mut self,
        rgb: BlendFunction,
        alpha: BlendFunction,
    ) -> impl ContextUpdate<C>
    where
        C: GlContext,
    {
        if self.blend_equations != Some((rgb, alpha)) {
            self.blend_equations = Some((rgb, alpha));

            Some(move |context: &C| {
                context.blend_equation_separate(blend_equation_id(rgb), blend_equation_id(alpha));

                "blendEquationSeparate"
            })
        } else {
            None
        }
    }

    /// The shadowed factors as `[source_rgb, destination_rgb, source_alpha, destination_alpha]`.
    pub fn blend_func(&self) -> Option<[BlendFactor; 4]> {
        self.blend_func
    }

    pub fn set_blend_func<C>(
        &mut self,
        source_rgb: BlendFactor,
        destination_rgb: BlendFactor,
        source_alpha: BlendFactor,
        destination_alpha: BlendFactor,
    ) -> impl ContextUpdate<C>
    where
        C: GlContext,
    {
        let func = [source_rgb, destination_rgb, source_alpha, destination_alpha];

        if self.blend_func != Some(func) {
            self.blend_func = Some(func);

            Some(move |context: &C| {
                context.blend_func_separate(
                    blend_factor_id(source_rgb),
                    blend_factor_id(destination_rgb),
                    blend_factor_id(source_alpha),
                    blend_factor_id(destination_alpha),
                );

                "blendFuncSeparate"
            })
        } else {
            None
        }
    }

    pub fn color_mask(&self) -> Option<[bool; 4]> {
        self.color_mask
    }

    pub fn set_color_mask<C>(&mut self, color_mask: [bool; 4]) -> impl ContextUpdate<C>
    where
        C: GlContext,
    {
        if self.color_mask != Some(color_mask) {
            self.color_mask = Some(color_mask);

            Some(move |context: &C| {
                let [r, g, b, a] = color_mask;

                context.color_mask(r, g, b, a);

                "colorMask"
            })
        } else {
            None
        }
    }
}

/// Applies blend state to an OpenGL-family context.
///
/// Issues one GL call per concern (enable flag, blend color, equations, factors, color mask),
/// skipping calls whose value is already current. When error checking is enabled in the
/// [DeviceOptions], every call is followed by a `getError` check.
///
/// GL has a single color mask, so only the write channels of the first render target are
/// applied.
pub struct GlBackend<C> {
    context: C,
    cache: GlBlendCache,
    check_errors: bool,
    generation: Option<DeviceGeneration>,
}

impl<C> GlBackend<C>
where
    C: GlContext,
{
    pub fn new(context: C, options: &DeviceOptions) -> Self {
        GlBackend {
            context,
            cache: GlBlendCache::new(),
            check_errors: options.check_errors(),
            generation: None,
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn cache(&self) -> &GlBlendCache {
        &self.cache
    }

    /// Issues `update` and checks for a GL error.
    ///
    /// The shadow copy already holds the new value when the call is made; on error the context
    /// state is unknown, so the whole shadow copy is invalidated.
    fn submit<U>(&mut self, update: U) -> Result<(), ApplyError>
    where
        U: ContextUpdate<C>,
    {
        match update.apply(&self.context) {
            Some(call) if self.check_errors => match self.context.get_error() {
                Gl::NO_ERROR => Ok(()),
                code => {
                    log::warn!("GL error 0x{:04X} after {}", code, call);

                    self.cache.invalidate();

                    Err(ApplyError::Gl { call, code })
                }
            },
            _ => Ok(()),
        }
    }
}

impl<C> BlendBackend for GlBackend<C>
where
    C: GlContext,
{
    fn apply_blend_state(
        &mut self,
        state: &BlendState,
        generation: DeviceGeneration,
    ) -> Result<(), ApplyError> {
        if self.generation != Some(generation) {
            log::debug!("GL blend state shadow invalidated for generation {}", generation);

            self.cache.invalidate();
            self.generation = Some(generation);
        }

        let update = self.cache.set_blend_enabled::<C>(state.is_blend_enabled());
        self.submit(update)?;

        let update = self
            .cache
            .set_blend_color::<C>(state.blend_factor().to_normalized());
        self.submit(update)?;

        let update = self
            .cache
            .set_blend_equations::<C>(state.color_blend_function(), state.alpha_blend_function());
        self.submit(update)?;

        let update = self.cache.set_blend_func::<C>(
            state.color_source_blend(),
            state.color_destination_blend(),
            state.alpha_source_blend(),
            state.alpha_destination_blend(),
        );
        self.submit(update)?;

        let update = self
            .cache
            .set_color_mask::<C>(state.color_write_channels().to_mask());
        self.submit(update)
    }

    fn reset_states(&mut self) {
        self.cache.invalidate();
        self.generation = None;
    }
}
