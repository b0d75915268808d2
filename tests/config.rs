use std::convert::TryFrom;

use glitz_blend::{
    BlendFactor, BlendFunction, BlendState, Color, ColorWriteChannels, InvalidBlendFactor,
    InvalidBlendFunction, PresetKind,
};

#[test]
fn test_missing_fields_take_defaults() {
    let state: BlendState = serde_json::from_str("{}").unwrap();

    assert_eq!(state, BlendState::default());
}

#[test]
fn test_load_non_premultiplied() {
    let json = r#"{
        "color-source-blend": "source-alpha",
        "alpha-source-blend": "source-alpha",
        "color-destination-blend": "inverse-source-alpha",
        "alpha-destination-blend": "inverse-source-alpha"
    }"#;

    let state: BlendState = serde_json::from_str(json).unwrap();

    assert_eq!(PresetKind::of(&state), Some(PresetKind::NonPremultiplied));
    assert_eq!(state.to_string(), "BlendState.NonPremultiplied");
}

#[test]
fn test_load_full_state() {
    let json = r#"{
        "color-blend-function": "reverse-subtract",
        "alpha-blend-function": "max",
        "color-source-blend": "blend-factor",
        "color-destination-blend": "inverse-blend-factor",
        "alpha-source-blend": "source-alpha-saturation",
        "alpha-destination-blend": "zero",
        "blend-factor": { "r": 10, "g": 20, "b": 30, "a": 40 },
        "color-write-channels": [15, 1, 6, 0],
        "multi-sample-mask": 3
    }"#;

    let state: BlendState = serde_json::from_str(json).unwrap();

    assert_eq!(state.color_blend_function(), BlendFunction::ReverseSubtract);
    assert_eq!(state.alpha_blend_function(), BlendFunction::Max);
    assert_eq!(state.color_source_blend(), BlendFactor::BlendFactor);
    assert_eq!(state.color_destination_blend(), BlendFactor::InverseBlendFactor);
    assert_eq!(state.alpha_source_blend(), BlendFactor::SourceAlphaSaturation);
    assert_eq!(state.alpha_destination_blend(), BlendFactor::Zero);
    assert_eq!(state.blend_factor(), Color::new(10, 20, 30, 40));
    assert_eq!(
        state.all_write_channels(),
        &[
            ColorWriteChannels::ALL,
            ColorWriteChannels::RED,
            ColorWriteChannels::GREEN | ColorWriteChannels::BLUE,
            ColorWriteChannels::NONE
        ]
    );
    assert_eq!(state.multi_sample_mask(), 3);
}

#[test]
fn test_serialized_state_loads_back() {
    let state = BlendState::begin()
        .source_blend(BlendFactor::DestinationColor)
        .render_target_write_channels(2, ColorWriteChannels::ALPHA)
        .unwrap()
        .finish();

    let json = serde_json::to_string(&state).unwrap();

    assert!(json.contains(r#""color-source-blend":"destination-color""#));
    assert_eq!(serde_json::from_str::<BlendState>(&json).unwrap(), state);
}

#[test]
fn test_rejects_unknown_write_channel_bits() {
    let result = serde_json::from_str::<BlendState>(r#"{ "color-write-channels": [16, 15, 15, 15] }"#);

    assert!(result.is_err());
}

#[test]
fn test_rejects_unknown_factor_name() {
    let result = serde_json::from_str::<BlendState>(r#"{ "color-source-blend": "source-beta" }"#);

    assert!(result.is_err());
}

#[test]
fn test_raw_codes_from_native_tables() {
    let raw = [4u32, 5, 4, 5];
    let factors: Result<Vec<BlendFactor>, _> =
        raw.iter().map(|code| BlendFactor::try_from(*code)).collect();

    assert_eq!(
        factors.unwrap(),
        vec![
            BlendFactor::SourceAlpha,
            BlendFactor::InverseSourceAlpha,
            BlendFactor::SourceAlpha,
            BlendFactor::InverseSourceAlpha
        ]
    );

    let error = BlendFactor::try_from(42).unwrap_err();

    assert_eq!(error, InvalidBlendFactor(42));
    assert_eq!(error.to_string(), "invalid blend factor: 42");
    assert_eq!(
        BlendFunction::try_from(7).unwrap_err().to_string(),
        InvalidBlendFunction(7).to_string()
    );
}
