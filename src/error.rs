use failure::Fail;

use crate::blending::{BlendFactor, BlendFunction};

/// Error returned when a raw integer does not name a [BlendFactor].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
#[fail(display = "invalid blend factor: {}", _0)]
pub struct InvalidBlendFactor(pub u32);

/// Error returned when a raw integer does not name a [BlendFunction].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
#[fail(display = "invalid blend function: {}", _0)]
pub struct InvalidBlendFunction(pub u32);

/// Error returned when a render target slot index is not smaller than
/// [RENDER_TARGET_SLOTS](crate::RENDER_TARGET_SLOTS).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
#[fail(display = "invalid render target slot: {}", _0)]
pub struct InvalidRenderTargetSlot(pub usize);

/// Error reported by a [NativeDevice](crate::backend::descriptor::NativeDevice) that failed to
/// create a blend state object.
#[derive(Clone, PartialEq, Eq, Debug, Fail)]
#[fail(display = "native blend state creation failed: {}", message)]
pub struct NativeError {
    pub message: String,
}

impl NativeError {
    pub fn new<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        NativeError {
            message: message.into(),
        }
    }
}

/// Error returned when a [BlendState](crate::BlendState) could not be applied to a context.
#[derive(Clone, PartialEq, Eq, Debug, Fail)]
pub enum ApplyError {
    #[fail(display = "GL error 0x{:04X} after {}", code, call)]
    Gl { call: &'static str, code: u32 },
    #[fail(display = "{}", _0)]
    Native(#[cause] NativeError),
    #[fail(display = "blend function {:?} is not supported by this backend", _0)]
    UnsupportedBlendFunction(BlendFunction),
    #[fail(display = "blend factor {:?} is not supported by this backend", _0)]
    UnsupportedBlendFactor(BlendFactor),
}

impl From<NativeError> for ApplyError {
    fn from(error: NativeError) -> Self {
        ApplyError::Native(error)
    }
}
