//! Pure style resolution for features.
//!
//! Every lookup is a table match on tag and attributes. Nothing closes
//! over mutable state: the selection and the display context are passed
//! in explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};
use ward_map_records_models::{FeatureId, FeatureTag, RoadCondition};

use crate::{Feature, FeatureKey, Selection};

/// An sRGB color with alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const GOOD: Self = Self::rgb(0x00, 0x80, 0x00);
    pub const MODERATE: Self = Self::rgb(0xff, 0xa5, 0x00);
    pub const POOR: Self = Self::rgb(0xff, 0x00, 0x00);
    pub const UNKNOWN: Self = Self::rgb(0x80, 0x80, 0x80);
    pub const SELECTED: Self = Self::rgb(0x00, 0xe5, 0xff);
    pub const WARD_STROKE: Self = Self::rgb(0x00, 0x33, 0x66);
    pub const WARD_FILL: Self = Self::rgba(0, 0, 0, 0.05);
    pub const ZONE_STROKE: Self = Self::rgb(0xff, 0x00, 0x00);
    pub const ZONE_FILL: Self = Self::rgba(0xff, 0, 0, 0.1);
    pub const MEASURE_STROKE: Self = Self::rgb(0xff, 0xcc, 0x33);
    pub const MEASURE_FILL: Self = Self::rgba(0xff, 0xff, 0xff, 0.2);

    /// Condition palette for road strokes.
    #[must_use]
    pub const fn for_condition(condition: RoadCondition) -> Self {
        match condition {
            RoadCondition::Good => Self::GOOD,
            RoadCondition::Moderate => Self::MODERATE,
            RoadCondition::Poor => Self::POOR,
            RoadCondition::Unknown => Self::UNKNOWN,
        }
    }

    /// Carriage-type palette for multi-ward roads.
    #[must_use]
    pub fn for_carriage(carriage: Option<&str>) -> Self {
        match carriage.map(str::trim) {
            Some("Single Carriageway") => Self::rgb(0x34, 0x98, 0xdb),
            Some("Double Carriageway") => Self::rgb(0x9b, 0x59, 0xb6),
            Some("Mixed") => Self::rgb(0x2e, 0xcc, 0x71),
            _ => Self::UNKNOWN,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.a - 1.0).abs() < f32::EPSILON {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Resolved visual style of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub fill_color: Option<Color>,
}

impl Style {
    /// Style of the in-progress measurement sketch.
    #[must_use]
    pub const fn measurement() -> Self {
        Self {
            stroke_color: Color::MEASURE_STROKE,
            stroke_width: 2.0,
            fill_color: Some(Color::MEASURE_FILL),
        }
    }
}

/// Display-mode inputs to style resolution owned by the enclosing view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleContext {
    /// Ward currently focused in the side panel.
    pub focused_ward: Option<FeatureId>,
    /// Color multi-ward roads by carriage type instead of condition.
    pub carriage_palette: bool,
    /// Road emphasised by a search match.
    pub highlighted: Option<FeatureKey>,
}

const ROAD_WIDTH: f64 = 2.0;
const SELECTED_EXTRA: f64 = 3.0;
const MULTI_ROAD_EXTRA: f64 = 4.0;
const HIGHLIGHT_EXTRA: f64 = 2.0;
const WARD_WIDTH: f64 = 3.0;
const FOCUSED_WARD_WIDTH: f64 = 6.0;
const ZONE_WIDTH: f64 = 2.0;

/// Resolves the style of `feature`. Total over every tag.
#[must_use]
pub fn style_for(feature: &Feature, selection: &Selection, ctx: &StyleContext) -> Style {
    match feature.tag {
        FeatureTag::Zone => Style {
            stroke_color: Color::ZONE_STROKE,
            stroke_width: ZONE_WIDTH,
            fill_color: Some(Color::ZONE_FILL),
        },
        FeatureTag::Ward => {
            let focused = ctx.focused_ward.as_ref() == Some(&feature.id);
            Style {
                stroke_color: Color::WARD_STROKE,
                stroke_width: if focused { FOCUSED_WARD_WIDTH } else { WARD_WIDTH },
                fill_color: Some(Color::WARD_FILL),
            }
        }
        FeatureTag::Road | FeatureTag::MultiRoad => {
            let selected = selection.contains(feature.tag, &feature.id);
            let multi = feature.tag == FeatureTag::MultiRoad;
            let road = feature.road();

            let base = if multi && ctx.carriage_palette {
                Color::for_carriage(road.and_then(|r| r.carriage_m.as_deref()))
            } else {
                Color::for_condition(road.map_or(RoadCondition::Unknown, |r| r.condition_class()))
            };

            let mut width = ROAD_WIDTH;
            if selected {
                width += SELECTED_EXTRA;
            }
            if multi {
                width += MULTI_ROAD_EXTRA;
            }
            if ctx
                .highlighted
                .as_ref()
                .is_some_and(|k| k.tag == feature.tag && k.id == feature.id)
            {
                width += HIGHLIGHT_EXTRA;
            }

            Style {
                stroke_color: if selected { Color::SELECTED } else { base },
                stroke_width: width,
                fill_color: None,
            }
        }
    }
}
