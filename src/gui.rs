//! Debug panel: applies control edits to the scene and draws the widgets.

use crate::controls::OrbitControls;
use crate::core::FrameStats;
use crate::error::Result;
use crate::math::{parse_hex_color, Color};
use crate::params::{Axis, Binding, Control, ControlParams, Panel, Range};
use crate::scene::{MaterialId, Scene};

/// Mutable view over everything a panel control may edit
pub struct ControlSurface<'a> {
    pub scene: &'a mut Scene,
    pub controls: &'a mut OrbitControls,
    pub params: &'a mut ControlParams,
}

impl<'a> ControlSurface<'a> {
    pub fn new(
        scene: &'a mut Scene,
        controls: &'a mut OrbitControls,
        params: &'a mut ControlParams,
    ) -> Self {
        Self {
            scene,
            controls,
            params,
        }
    }

    /// Current value of a numeric binding; `None` if it names a missing object
    /// or a boolean field
    pub fn float(&self, binding: Binding) -> Option<f32> {
        match binding {
            Binding::Position(id, axis) => {
                let p = self.scene.node(id)?.position;
                Some(match axis {
                    Axis::X => p.x,
                    Axis::Y => p.y,
                    Axis::Z => p.z,
                })
            }
            Binding::LightIntensity(id) => Some(self.scene.node(id)?.light()?.intensity()),
            Binding::Metalness(id) => Some(self.scene.material(id)?.metalness),
            Binding::Roughness(id) => Some(self.scene.material(id)?.roughness),
            Binding::AoMapIntensity(id) => Some(self.scene.material(id)?.ao_map_intensity),
            Binding::DisplacementScale(id) => Some(self.scene.material(id)?.displacement_scale),
            Binding::RotationSpeed => Some(self.params.rotation_speed),
            Binding::AutoRotateSpeed => Some(self.controls.auto_rotate_speed),
            Binding::Visible(_)
            | Binding::Wireframe(_)
            | Binding::RotateObjects
            | Binding::AutoRotate
            | Binding::EnableDamping => None,
        }
    }

    /// Write a numeric binding, clamped to `range`. Returns the stored value.
    pub fn set_float(&mut self, binding: Binding, range: Range, value: f32) -> Option<f32> {
        let value = range.clamp(value);
        let slot: &mut f32 = match binding {
            Binding::Position(id, axis) => {
                let node = self.scene.node_mut(id)?;
                match axis {
                    Axis::X => &mut node.position.x,
                    Axis::Y => &mut node.position.y,
                    Axis::Z => &mut node.position.z,
                }
            }
            Binding::LightIntensity(id) => self.scene.node_mut(id)?.light_mut()?.intensity_mut(),
            Binding::Metalness(id) => &mut self.scene.material_mut(id)?.metalness,
            Binding::Roughness(id) => &mut self.scene.material_mut(id)?.roughness,
            Binding::AoMapIntensity(id) => &mut self.scene.material_mut(id)?.ao_map_intensity,
            Binding::DisplacementScale(id) => {
                &mut self.scene.material_mut(id)?.displacement_scale
            }
            Binding::RotationSpeed => &mut self.params.rotation_speed,
            Binding::AutoRotateSpeed => &mut self.controls.auto_rotate_speed,
            _ => return None,
        };
        *slot = value;
        Some(value)
    }

    pub fn bool(&self, binding: Binding) -> Option<bool> {
        match binding {
            Binding::Visible(id) => Some(self.scene.node(id)?.visible),
            Binding::Wireframe(id) => Some(self.scene.material(id)?.wireframe),
            Binding::RotateObjects => Some(self.params.rotate_objects),
            Binding::AutoRotate => Some(self.controls.auto_rotate),
            Binding::EnableDamping => Some(self.controls.enable_damping),
            _ => None,
        }
    }

    pub fn set_bool(&mut self, binding: Binding, value: bool) -> Option<bool> {
        let slot: &mut bool = match binding {
            Binding::Visible(id) => &mut self.scene.node_mut(id)?.visible,
            Binding::Wireframe(id) => &mut self.scene.material_mut(id)?.wireframe,
            Binding::RotateObjects => &mut self.params.rotate_objects,
            Binding::AutoRotate => &mut self.controls.auto_rotate,
            Binding::EnableDamping => &mut self.controls.enable_damping,
            _ => return None,
        };
        *slot = value;
        Some(value)
    }

    /// Parse a `#rrggbb` style string and apply it to the material and the
    /// shared params. Returns the numeric color.
    pub fn set_color(&mut self, target: MaterialId, text: &str) -> Result<u32> {
        let hex = parse_hex_color(text)?;
        self.params.color = Color::from_hex(hex);
        if let Some(material) = self.scene.material_mut(target) {
            material.color.set_hex(hex);
        } else {
            log::warn!("Color control targets missing material {:?}", target);
        }
        Ok(hex)
    }
}

/// Draw the panel anchored to the top-right corner. Returns true if any
/// value changed this frame.
pub fn show_panel(ctx: &egui::Context, panel: &Panel, surface: &mut ControlSurface<'_>) -> bool {
    let mut changed = false;
    egui::Window::new("Debug")
        .title_bar(true)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .default_width(panel.width)
        .show(ctx, |ui| {
            ui.set_width(panel.width);
            for folder in &panel.folders {
                egui::CollapsingHeader::new(&folder.title)
                    .default_open(folder.open)
                    .show(ui, |ui| {
                        for control in &folder.controls {
                            changed |= show_control(ui, control, surface);
                        }
                    });
            }
        });
    changed
}

fn show_control(ui: &mut egui::Ui, control: &Control, surface: &mut ControlSurface<'_>) -> bool {
    match control {
        Control::Slider {
            label,
            binding,
            range,
        } => {
            let Some(mut value) = surface.float(*binding) else {
                return false;
            };
            let response = ui.add(
                egui::Slider::new(&mut value, range.min..=range.max)
                    .step_by(range.step as f64)
                    .text(label.as_str()),
            );
            if response.changed() {
                surface.set_float(*binding, *range, value);
                return true;
            }
            false
        }
        Control::Toggle { label, binding } => {
            let Some(mut value) = surface.bool(*binding) else {
                return false;
            };
            if ui.checkbox(&mut value, label.as_str()).changed() {
                surface.set_bool(*binding, value);
                return true;
            }
            false
        }
        Control::Color { label, target } => {
            let Some(current) = surface.scene.material(*target).map(|m| m.color) else {
                return false;
            };
            let mut rgb = current.to_rgb8();
            let changed = ui
                .horizontal(|ui| {
                    let response = ui.color_edit_button_srgb(&mut rgb);
                    ui.label(label.as_str());
                    response.changed()
                })
                .inner;
            if changed {
                let text = Color::from_rgb8(rgb).to_hex_string();
                if let Err(e) = surface.set_color(*target, &text) {
                    log::warn!("{}", e);
                    return false;
                }
            }
            changed
        }
    }
}

/// FPS and frame-time readout in the top-left corner
pub fn show_stats(ctx: &egui::Context, stats: &FrameStats, title: &str) {
    egui::Window::new("Stats")
        .title_bar(false)
        .resizable(false)
        .fixed_pos(egui::pos2(10.0, 10.0))
        .show(ctx, |ui| {
            ui.heading(
                egui::RichText::new(format!("{:.0} FPS", stats.fps()))
                    .size(24.0)
                    .color(egui::Color32::from_rgb(74, 158, 255)),
            );
            ui.label(
                egui::RichText::new(format!("{:.2} ms", stats.frame_ms()))
                    .size(14.0)
                    .color(egui::Color32::GRAY),
            );
            ui.monospace(title);
        });
}
