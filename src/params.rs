//! Typed description of the debug panel: which field each widget edits and
//! within which bounds. The egui side in `gui` only renders these.

use crate::math::Color;
use crate::scene::{MaterialId, NodeId};

/// Values owned by the panel rather than by any scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    pub color: Color,
    /// Radians per second of idle rotation
    pub rotation_speed: f32,
    pub rotate_objects: bool,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            rotation_speed: 0.3,
            rotate_objects: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One editable field somewhere in the scene state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Position(NodeId, Axis),
    Visible(NodeId),
    LightIntensity(NodeId),
    Wireframe(MaterialId),
    Metalness(MaterialId),
    Roughness(MaterialId),
    AoMapIntensity(MaterialId),
    DisplacementScale(MaterialId),
    RotationSpeed,
    RotateObjects,
    AutoRotate,
    AutoRotateSpeed,
    EnableDamping,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Slider {
        label: String,
        binding: Binding,
        range: Range,
    },
    Toggle {
        label: String,
        binding: Binding,
    },
    /// Edits the material color and mirrors it into `ControlParams::color`
    Color { label: String, target: MaterialId },
}

impl Control {
    pub fn slider(label: impl Into<String>, binding: Binding, range: Range) -> Self {
        Control::Slider {
            label: label.into(),
            binding,
            range,
        }
    }

    pub fn toggle(label: impl Into<String>, binding: Binding) -> Self {
        Control::Toggle {
            label: label.into(),
            binding,
        }
    }

    pub fn color(label: impl Into<String>, target: MaterialId) -> Self {
        Control::Color {
            label: label.into(),
            target,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Control::Slider { label, .. }
            | Control::Toggle { label, .. }
            | Control::Color { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub title: String,
    pub open: bool,
    pub controls: Vec<Control>,
}

impl Folder {
    pub fn new(title: impl Into<String>, open: bool) -> Self {
        Self {
            title: title.into(),
            open,
            controls: Vec::new(),
        }
    }

    pub fn with(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub width: f32,
    pub folders: Vec<Folder>,
}

impl Panel {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            folders: Vec::new(),
        }
    }

    pub fn with(mut self, folder: Folder) -> Self {
        self.folders.push(folder);
        self
    }

    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.folders.iter().flat_map(|f| f.controls.iter())
    }

    pub fn find(&self, label: &str) -> Option<&Control> {
        self.controls().find(|c| c.label() == label)
    }
}

/// The camera folder both scenes share
pub fn camera_folder() -> Folder {
    Folder::new("Camera", true)
        .with(Control::toggle("autoRotate", Binding::AutoRotate))
        .with(Control::slider(
            "autoRotateSpeed",
            Binding::AutoRotateSpeed,
            Range::new(0.0, 25.0, 1.0),
        ))
        .with(Control::toggle("enableDamping", Binding::EnableDamping))
}
