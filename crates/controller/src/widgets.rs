//! GUI widget states and slider arithmetic, independent of any toolkit.

use std::fmt;

use formats::DEFAULT_DISTANCE_RANGE;
use scene::Section;

/// Two-state eye button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }

    pub fn toggled(self) -> Self {
        Self::from_visible(!self.is_visible())
    }

    pub fn icon(self) -> &'static str {
        match self {
            Visibility::Visible => "icons/eye.png",
            Visibility::Hidden => "icons/noteye.png",
        }
    }
}

/// Three-state section clipping button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClipMode {
    Off,
    Clip,
    ClipFlipped,
}

impl ClipMode {
    pub fn of(section: &Section) -> Self {
        match (section.clipping, section.flipped) {
            (false, _) => ClipMode::Off,
            (true, false) => ClipMode::Clip,
            (true, true) => ClipMode::ClipFlipped,
        }
    }

    /// Off -> Clip -> ClipFlipped -> Off.
    pub fn next(self) -> Self {
        match self {
            ClipMode::Off => ClipMode::Clip,
            ClipMode::Clip => ClipMode::ClipFlipped,
            ClipMode::ClipFlipped => ClipMode::Off,
        }
    }

    /// Writes the mode into a section. `Off` leaves `flipped` alone.
    pub fn apply(self, section: &mut Section) {
        match self {
            ClipMode::Off => section.clipping = false,
            ClipMode::Clip => {
                section.clipping = true;
                section.flipped = false;
            }
            ClipMode::ClipFlipped => {
                section.clipping = true;
                section.flipped = true;
            }
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ClipMode::Off => "icons/notsectionclip.png",
            ClipMode::Clip => "icons/sectionclip1.png",
            ClipMode::ClipFlipped => "icons/sectionclip2.png",
        }
    }
}

/// Expand/collapse state of a domain category list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    Open,
    #[default]
    Closed,
}

impl ListState {
    pub fn from_open(open: bool) -> Self {
        if open {
            ListState::Open
        } else {
            ListState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == ListState::Open
    }

    pub fn toggled(self) -> Self {
        match self {
            ListState::Open => ListState::Closed,
            ListState::Closed => ListState::Open,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ListState::Open => "icons/minus.png",
            ListState::Closed => "icons/plus.png",
        }
    }
}

/// Number of slider steps for float and log sliders.
pub const SLIDER_STEPS: f64 = 1000.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SliderKind {
    /// Position is the value.
    Int,
    /// Linear map of `0..=SLIDER_STEPS` onto `min..=max`.
    Float,
    /// Logarithmic map of `0..=SLIDER_STEPS` onto `min..=max`.
    Log,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SliderSpec {
    pub kind: SliderKind,
    pub min: f64,
    pub max: f64,
}

impl SliderSpec {
    pub const fn new(kind: SliderKind, min: f64, max: f64) -> Self {
        Self { kind, min, max }
    }

    /// Range the slider element itself spans.
    pub fn position_range(&self) -> (f64, f64) {
        match self.kind {
            SliderKind::Int => (self.min, self.max),
            SliderKind::Float | SliderKind::Log => (0.0, SLIDER_STEPS),
        }
    }

    pub fn value_at(&self, position: f64) -> f64 {
        match self.kind {
            SliderKind::Int => position,
            SliderKind::Float => self.min + (self.max - self.min) * position / SLIDER_STEPS,
            SliderKind::Log => {
                let (lmin, lmax) = (self.min.ln(), self.max.ln());
                (lmin + (lmax - lmin) * position / SLIDER_STEPS).exp()
            }
        }
    }

    pub fn position_of(&self, value: f64) -> f64 {
        match self.kind {
            SliderKind::Int => value,
            SliderKind::Float => (value - self.min) * SLIDER_STEPS / (self.max - self.min),
            SliderKind::Log => {
                let (lmin, lmax) = (self.min.ln(), self.max.ln());
                SLIDER_STEPS * (value.ln() - lmin) / (lmax - lmin)
            }
        }
    }
}

pub const MODEL_OPACITY_SLIDER: SliderSpec = SliderSpec::new(SliderKind::Float, 0.0, 1.0);

/// Section parameters exposed as sliders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SectionParam {
    Distance,
    Pitch,
    Yaw,
    VMin,
    VMax,
    VGamma,
}

impl SectionParam {
    pub const ALL: [SectionParam; 6] = [
        SectionParam::Distance,
        SectionParam::Pitch,
        SectionParam::Yaw,
        SectionParam::VMin,
        SectionParam::VMax,
        SectionParam::VGamma,
    ];

    /// Short id used for element ids.
    pub fn id(self) -> &'static str {
        match self {
            SectionParam::Distance => "dst",
            SectionParam::Pitch => "pit",
            SectionParam::Yaw => "yaw",
            SectionParam::VMin => "vmin",
            SectionParam::VMax => "vmax",
            SectionParam::VGamma => "vgamma",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionParam::Distance => "Distance",
            SectionParam::Pitch => "Pitch",
            SectionParam::Yaw => "Yaw",
            SectionParam::VMin => "VMin",
            SectionParam::VMax => "VMax",
            SectionParam::VGamma => "VGamma",
        }
    }

    /// Slider for this parameter. `distance_range` comes from the image
    /// server and only affects `Distance`.
    pub fn slider(self, distance_range: Option<(f64, f64)>) -> SliderSpec {
        match self {
            SectionParam::Distance => {
                let (min, max) = distance_range.unwrap_or(DEFAULT_DISTANCE_RANGE);
                SliderSpec::new(SliderKind::Int, min, max)
            }
            SectionParam::Pitch => SliderSpec::new(SliderKind::Int, 0.0, 180.0),
            SectionParam::Yaw => SliderSpec::new(SliderKind::Int, 0.0, 360.0),
            SectionParam::VMin | SectionParam::VMax => {
                SliderSpec::new(SliderKind::Int, -1024.0, 4096.0)
            }
            SectionParam::VGamma => SliderSpec::new(SliderKind::Log, 0.1, 10.0),
        }
    }

    pub fn get(self, section: &Section) -> f64 {
        match self {
            SectionParam::Distance => section.distance,
            SectionParam::Pitch => section.pitch,
            SectionParam::Yaw => section.yaw,
            SectionParam::VMin => section.map_vmin,
            SectionParam::VMax => section.map_vmax,
            SectionParam::VGamma => section.map_gamma,
        }
    }

    /// Stores `value`, clamping the grey-level window so that
    /// `vmin <= vmax`. Returns what was stored.
    pub fn set(self, section: &mut Section, value: f64) -> f64 {
        match self {
            SectionParam::Distance => section.distance = value,
            SectionParam::Pitch => section.pitch = value,
            SectionParam::Yaw => section.yaw = value,
            SectionParam::VMin => return section.set_map_vmin(value),
            SectionParam::VMax => return section.set_map_vmax(value),
            SectionParam::VGamma => section.map_gamma = value,
        }
        value
    }
}

impl fmt::Display for SectionParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which colour the swatch is currently editing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwatchTarget {
    Model,
    Domain(usize),
}
