use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::blending::{BlendFactor, BlendState};

/// Enumerates the named [BlendState] presets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PresetKind {
    /// Adds the source color, weighted by its alpha, onto the destination.
    Additive,
    /// Blends a premultiplied-alpha source over the destination.
    AlphaBlend,
    /// Blends a straight-alpha source over the destination.
    NonPremultiplied,
    /// Overwrites the destination with the source.
    Opaque,
}

impl PresetKind {
    pub const ALL: [PresetKind; 4] = [
        PresetKind::Additive,
        PresetKind::AlphaBlend,
        PresetKind::NonPremultiplied,
        PresetKind::Opaque,
    ];

    /// Constructs a new [BlendState] with this preset's configuration.
    pub fn build(&self) -> BlendState {
        let (source, destination) = match self {
            PresetKind::Additive => (BlendFactor::SourceAlpha, BlendFactor::One),
            PresetKind::AlphaBlend => (BlendFactor::One, BlendFactor::InverseSourceAlpha),
            PresetKind::NonPremultiplied => {
                (BlendFactor::SourceAlpha, BlendFactor::InverseSourceAlpha)
            }
            PresetKind::Opaque => (BlendFactor::One, BlendFactor::Zero),
        };

        BlendState::begin()
            .source_blend(source)
            .destination_blend(destination)
            .finish()
    }

    /// Returns the preset that `state` is equal to, if any.
    pub fn of(state: &BlendState) -> Option<PresetKind> {
        PresetKind::ALL
            .iter()
            .copied()
            .find(|kind| &kind.build() == state)
    }

    fn index(&self) -> usize {
        match self {
            PresetKind::Additive => 0,
            PresetKind::AlphaBlend => 1,
            PresetKind::NonPremultiplied => 2,
            PresetKind::Opaque => 3,
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PresetKind::Additive => "Additive",
            PresetKind::AlphaBlend => "AlphaBlend",
            PresetKind::NonPremultiplied => "NonPremultiplied",
            PresetKind::Opaque => "Opaque",
        };

        f.write_str(name)
    }
}

/// Registry of lazily constructed [BlendState] presets.
///
/// Each preset is constructed on first access and shared afterwards. A graphics device owns one
/// registry and calls [reset](BlendStatePresets::reset) when the device is lost, after which
/// the next access constructs a fresh instance.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use glitz_blend::BlendStatePresets;
///
/// let mut presets = BlendStatePresets::new();
/// let first = presets.alpha_blend();
///
/// assert!(Rc::ptr_eq(&first, &presets.alpha_blend()));
///
/// presets.reset();
///
/// assert!(!Rc::ptr_eq(&first, &presets.alpha_blend()));
/// ```
pub struct BlendStatePresets {
    slots: [OnceCell<Rc<BlendState>>; 4],
}

impl BlendStatePresets {
    pub fn new() -> Self {
        BlendStatePresets {
            slots: [
                OnceCell::new(),
                OnceCell::new(),
                OnceCell::new(),
                OnceCell::new(),
            ],
        }
    }

    /// Returns the shared instance of the `kind` preset, constructing it if necessary.
    pub fn get(&self, kind: PresetKind) -> Rc<BlendState> {
        self.slots[kind.index()]
            .get_or_init(|| {
                log::debug!("constructing {} blend state preset", kind);

                Rc::new(kind.build())
            })
            .clone()
    }

    pub fn additive(&self) -> Rc<BlendState> {
        self.get(PresetKind::Additive)
    }

    pub fn alpha_blend(&self) -> Rc<BlendState> {
        self.get(PresetKind::AlphaBlend)
    }

    pub fn non_premultiplied(&self) -> Rc<BlendState> {
        self.get(PresetKind::NonPremultiplied)
    }

    pub fn opaque(&self) -> Rc<BlendState> {
        self.get(PresetKind::Opaque)
    }

    /// Returns `true` if the `kind` preset has been constructed since the last reset.
    pub fn is_initialized(&self, kind: PresetKind) -> bool {
        self.slots[kind.index()].get().is_some()
    }

    /// Drops all constructed presets.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.take();
        }

        log::debug!("blend state presets reset");
    }
}

impl Default for BlendStatePresets {
    fn default() -> Self {
        BlendStatePresets::new()
    }
}
