//! Reader settings: numeric pacing knobs plus pass-through style values.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::pacing;

/// Style property a value is validated against before being accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StyleProperty {
    BackgroundColor,
    Color,
    FontSize,
    FontFamily,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            Self::BackgroundColor => "background-color",
            Self::Color => "color",
            Self::FontSize => "font-size",
            Self::FontFamily => "font-family",
        }
    }
}

/// External acceptance check for style-like settings. A rejected value
/// silently keeps the previous one.
pub trait StyleValidator {
    fn is_valid(&self, property: StyleProperty, value: &str) -> bool;
}

/// Validator that accepts every value.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllStyles;

impl StyleValidator for AcceptAllStyles {
    fn is_valid(&self, _property: StyleProperty, _value: &str) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Clamping bounds for the numeric settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SettingsBounds {
    pub min_words_per_minute: u16,
    pub max_words_per_minute: u16,
    pub min_words_per_chunk: u16,
    pub max_words_per_chunk: u16,
}

impl Default for SettingsBounds {
    fn default() -> Self {
        Self {
            min_words_per_minute: 60,
            max_words_per_minute: 6000,
            min_words_per_chunk: 1,
            max_words_per_chunk: 20,
        }
    }
}

/// The full settings record, persisted as one JSON document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub words_per_minute: u16,
    pub words_per_chunk: u16,
    pub slight_pause: bool,
    pub text_background_color: String,
    pub text_color: String,
    pub highlight_background_color: String,
    pub highlight_color: String,
    pub font_size: String,
    pub line_height: f32,
    pub font_family: String,
    pub text_align: TextAlign,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            words_per_minute: 300,
            words_per_chunk: 6,
            slight_pause: true,
            text_background_color: "#FFFFFF".to_string(),
            text_color: "#B3B3B3".to_string(),
            highlight_background_color: "#FFFFFF".to_string(),
            highlight_color: "#000000".to_string(),
            font_size: "20px".to_string(),
            line_height: 1.5,
            font_family: "sans-serif".to_string(),
            text_align: TextAlign::Left,
        }
    }
}

impl Settings {
    /// Character budget one chunk may occupy at the current chunk size.
    pub fn chunk_target_chars(&self) -> f32 {
        f32::from(self.words_per_chunk) * pacing::AVERAGE_WORD_CHARS
    }

    /// Merge a partial patch over these settings: numerics clamp to
    /// `bounds`, style values pass through `validator` and fall back to the
    /// current value when rejected.
    pub fn merged(
        &self,
        patch: &SettingsPatch,
        bounds: SettingsBounds,
        validator: &dyn StyleValidator,
    ) -> Settings {
        let mut next = self.clone();

        if let Some(wpm) = patch.words_per_minute {
            next.words_per_minute =
                wpm.clamp(bounds.min_words_per_minute, bounds.max_words_per_minute);
        }
        if let Some(wpc) = patch.words_per_chunk {
            next.words_per_chunk =
                wpc.clamp(bounds.min_words_per_chunk, bounds.max_words_per_chunk);
        }
        if let Some(slight_pause) = patch.slight_pause {
            next.slight_pause = slight_pause;
        }
        if let Some(line_height) = patch.line_height {
            if line_height.is_finite() && line_height > 0.0 {
                next.line_height = line_height;
            }
        }
        if let Some(text_align) = patch.text_align {
            next.text_align = text_align;
        }

        Self::merge_style(
            &mut next.text_background_color,
            patch.text_background_color.as_deref(),
            StyleProperty::BackgroundColor,
            validator,
        );
        Self::merge_style(
            &mut next.highlight_background_color,
            patch.highlight_background_color.as_deref(),
            StyleProperty::BackgroundColor,
            validator,
        );
        Self::merge_style(
            &mut next.text_color,
            patch.text_color.as_deref(),
            StyleProperty::Color,
            validator,
        );
        Self::merge_style(
            &mut next.highlight_color,
            patch.highlight_color.as_deref(),
            StyleProperty::Color,
            validator,
        );
        Self::merge_style(
            &mut next.font_size,
            patch.font_size.as_deref(),
            StyleProperty::FontSize,
            validator,
        );
        Self::merge_style(
            &mut next.font_family,
            patch.font_family.as_deref(),
            StyleProperty::FontFamily,
            validator,
        );

        next
    }

    fn merge_style(
        slot: &mut String,
        value: Option<&str>,
        property: StyleProperty,
        validator: &dyn StyleValidator,
    ) {
        let Some(value) = value else {
            return;
        };
        if validator.is_valid(property, value) {
            *slot = value.to_string();
        } else {
            debug!(
                "settings: rejected {}={:?}; keeping {:?}",
                property.css_name(),
                value,
                slot
            );
        }
    }
}

/// Partial settings update, typically deserialized from a host form.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub words_per_minute: Option<u16>,
    pub words_per_chunk: Option<u16>,
    pub slight_pause: Option<bool>,
    pub text_background_color: Option<String>,
    pub text_color: Option<String>,
    pub highlight_background_color: Option<String>,
    pub highlight_color: Option<String>,
    pub font_size: Option<String>,
    pub line_height: Option<f32>,
    pub font_family: Option<String>,
    pub text_align: Option<TextAlign>,
}

impl From<Settings> for SettingsPatch {
    fn from(settings: Settings) -> Self {
        Self {
            words_per_minute: Some(settings.words_per_minute),
            words_per_chunk: Some(settings.words_per_chunk),
            slight_pause: Some(settings.slight_pause),
            text_background_color: Some(settings.text_background_color),
            text_color: Some(settings.text_color),
            highlight_background_color: Some(settings.highlight_background_color),
            highlight_color: Some(settings.highlight_color),
            font_size: Some(settings.font_size),
            line_height: Some(settings.line_height),
            font_family: Some(settings.font_family),
            text_align: Some(settings.text_align),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectColors;

    impl StyleValidator for RejectColors {
        fn is_valid(&self, property: StyleProperty, _value: &str) -> bool {
            !matches!(
                property,
                StyleProperty::Color | StyleProperty::BackgroundColor
            )
        }
    }

    #[test]
    fn numeric_patch_values_clamp_to_bounds() {
        let settings = Settings::default();
        let patch = SettingsPatch {
            words_per_minute: Some(9999),
            words_per_chunk: Some(0),
            ..SettingsPatch::default()
        };
        let merged = settings.merged(&patch, SettingsBounds::default(), &AcceptAllStyles);
        assert_eq!(merged.words_per_minute, 6000);
        assert_eq!(merged.words_per_chunk, 1);
    }

    #[test]
    fn rejected_style_keeps_previous_value() {
        let settings = Settings::default();
        let patch = SettingsPatch {
            text_color: Some("not-a-color".to_string()),
            font_family: Some("serif".to_string()),
            ..SettingsPatch::default()
        };
        let merged = settings.merged(&patch, SettingsBounds::default(), &RejectColors);
        assert_eq!(merged.text_color, settings.text_color);
        assert_eq!(merged.font_family, "serif");
    }

    #[test]
    fn absent_patch_fields_change_nothing() {
        let settings = Settings::default();
        let merged = settings.merged(
            &SettingsPatch::default(),
            SettingsBounds::default(),
            &AcceptAllStyles,
        );
        assert_eq!(merged, settings);
    }

    #[test]
    fn non_positive_line_height_is_ignored() {
        let settings = Settings::default();
        let patch = SettingsPatch {
            line_height: Some(-2.0),
            ..SettingsPatch::default()
        };
        let merged = settings.merged(&patch, SettingsBounds::default(), &AcceptAllStyles);
        assert!((merged.line_height - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn chunk_target_scales_with_words_per_chunk() {
        let mut settings = Settings::default();
        settings.words_per_chunk = 2;
        assert!((settings.chunk_target_chars() - 11.4).abs() < 0.001);
    }
}
