//! Interactive space-colonization tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the growth engine and its
//! random source and implements [`eframe::App`] to drive, render and
//! control growth through an egui UI.

use eframe::App;
use log::{error, info};
use rand_chacha::ChaCha8Rng;
use sca_tree_core::{ConfigError, ParamRange, StepOutcome, Tree, TreeConfig, Vector2};

/// Screen-space gap between the tree origin and the bottom of the canvas.
const GROUND_MARGIN: f32 = 20.0;

/// Screen width of a branch of size 1 at zoom 1.
const BRANCH_WIDTH_SCALE: f32 = 4.0;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The growth engine: [`Tree`] and the [`TreeConfig`] new trees are drawn from.
/// - UI state (pan/zoom, timing, overlays).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the branches, attraction points and status.
///
/// ### Fields
/// - `tree` - Current tree being grown.
/// - `cfg` - Parameter ranges used by [`Viewer::regenerate`].
/// - `rng` - Seeded random source for new trees.
///
/// - `running` - Whether growth is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `show_crown` - Whether to outline the crown rectangle.
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    tree: Tree,
    cfg: TreeConfig,

    rng: ChaCha8Rng,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    show_crown: bool,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer with a freshly generated tree rooted at the origin.
    ///
    /// ### Returns
    /// The viewer, or the configuration error that prevented building the
    /// first tree.
    pub fn new(cfg: TreeConfig, mut rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        let tree = Tree::new(Vector2::ZERO, &cfg, &mut rng)?;

        Ok(Self {
            tree,
            cfg,
            rng,
            running: false,
            zoom: 2.0,
            pan: egui::vec2(0.0, 0.0),
            show_crown: false,
            step_interval: 0.3,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    pub fn set_step_interval(&mut self, seconds: f64) {
        self.step_interval = seconds.clamp(0.01, 5.0);
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Replaces the tree with a new random one drawn from `cfg`.
    ///
    /// Camera settings are kept and auto-running stops. If `cfg` cannot
    /// produce a valid tree the current one is kept and the error logged.
    fn regenerate(&mut self) {
        match Tree::new(self.tree.origin(), &self.cfg, &mut self.rng) {
            Ok(tree) => {
                self.tree = tree;
                self.running = false;
                info!("regenerated tree:\n{}", self.tree.status());
            }
            Err(e) => error!("cannot regenerate tree: {e}"),
        }
    }

    /// Advances growth by a single step and stops auto-running once the
    /// tree is done.
    fn step_once(&mut self) {
        if let StepOutcome::Finished(reason) = self.tree.step() {
            info!("growth finished: {reason:?}");
        }
        if self.tree.is_done() {
            self.running = false;
        }
    }

    /// Converts a tree-space position to screen-space.
    ///
    /// Tree space already has y pointing down, so positions are only
    /// scaled by `zoom`, offset by `pan`, and anchored just above the
    /// bottom center of `rect`.
    fn world_to_screen(&self, p: Vector2, rect: egui::Rect) -> egui::Pos2 {
        let anchor = rect.center_bottom() - egui::vec2(0.0, GROUND_MARGIN);
        egui::pos2(
            anchor.x + p.x as f32 * self.zoom + self.pan.x,
            anchor.y + p.y as f32 * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to tree-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vector2 {
        let anchor = rect.center_bottom() - egui::vec2(0.0, GROUND_MARGIN);
        let x = (p.x - anchor.x - self.pan.x) / self.zoom;
        let y = (p.y - anchor.y - self.pan.y) / self.zoom;
        Vector2::new(f64::from(x), f64::from(y))
    }

    /// Helper to draw a labeled [`ParamRange`] as two [`egui::DragValue`]s.
    fn labeled_range_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut ParamRange<f64>,
        bounds: std::ops::RangeInclusive<f64>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(
                egui::DragValue::new(&mut value.min)
                    .range(*bounds.start()..=value.max)
                    .speed(speed),
            );
            ui.label("..");
            ui.add(
                egui::DragValue::new(&mut value.max)
                    .range(value.min..=*bounds.end())
                    .speed(speed),
            );
        });
    }

    /// Helper to draw a labeled `usize` [`ParamRange`].
    fn labeled_range_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut ParamRange<usize>,
        bounds: std::ops::RangeInclusive<usize>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(&mut value.min).range(*bounds.start()..=value.max));
            ui.label("..");
            ui.add(egui::DragValue::new(&mut value.max).range(value.min..=*bounds.end()));
        });
    }

    /// Builds the top panel UI (run controls, stepping, regeneration, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let run_label = if self.running { "⏸ Pause" } else { "▶ Grow" };
                if ui
                    .add_enabled(!self.tree.is_done(), egui::Button::new(run_label))
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.01..=5.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    self.manual_step(ctx);
                }

                if ui.button("Regenerate").clicked() {
                    self.regenerate();
                }

                ui.separator();
                ui.checkbox(&mut self.show_crown, "Crown");
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    fn manual_step(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        if self.last_step_time > 0.0 {
            self.last_step_dt = now - self.last_step_time;
        }
        self.step_once();
        self.last_step_time = now;
    }

    /// Builds the bottom status bar (timing and growth state).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("state = {:?}", self.tree.state()));
            });
        });
    }

    /// Builds the right-hand panel with the tree status and parameter ranges.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Tree");
                ui.monospace(self.tree.status().to_string());

                ui.separator();
                ui.heading("Ranges");
                ui.label("Applied on Regenerate");

                Self::labeled_range_usize(
                    ui,
                    "points:",
                    &mut self.cfg.attraction_point_count,
                    1..=5000,
                );
                Self::labeled_range_f64(ui, "trunk:", &mut self.cfg.trunk_height, 1.0..=1000.0, 1.0);
                Self::labeled_range_f64(ui, "crown w:", &mut self.cfg.crown_width, 1.0..=1000.0, 1.0);
                Self::labeled_range_f64(
                    ui,
                    "crown h %:",
                    &mut self.cfg.crown_height_fraction,
                    0.01..=1.0,
                    0.01,
                );
                Self::labeled_range_f64(ui, "min dist:", &mut self.cfg.min_distance, 0.1..=100.0, 0.1);
                Self::labeled_range_f64(ui, "max dist:", &mut self.cfg.max_distance, 0.1..=200.0, 0.5);
                Self::labeled_range_f64(ui, "branch len:", &mut self.cfg.branch_length, 0.1..=50.0, 0.1);

                ui.horizontal(|ui| {
                    ui.label("canvas h:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.canvas_height)
                            .range(10.0..=5000.0)
                            .speed(1.0),
                    );
                });

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = TreeConfig::default();
                }
            });
    }

    /// Builds the central panel where the tree is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Keyboard: space steps, P regenerates.
            let (step_key, regen_key) =
                ctx.input(|i| (i.key_pressed(egui::Key::Space), i.key_pressed(egui::Key::P)));
            if step_key {
                self.manual_step(ctx);
            }
            if regen_key {
                self.regenerate();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            let snapshot = self.tree.snapshot();

            if self.show_crown {
                let c = snapshot.crown;
                let corners = [
                    Vector2::new(c.left, c.top),
                    Vector2::new(c.right(), c.top),
                    Vector2::new(c.right(), c.bottom()),
                    Vector2::new(c.left, c.bottom()),
                ];
                let points: Vec<egui::Pos2> = corners
                    .iter()
                    .map(|&p| self.world_to_screen(p, rect))
                    .collect();
                painter.add(egui::Shape::closed_line(
                    points,
                    egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                ));
            }

            // Branches, from each one back to its parent; thickness follows size.
            let last = self.tree.last_inserted();
            for (id, branch) in snapshot.branches.iter() {
                let Some(parent) = branch.parent else {
                    continue;
                };
                let a = self.world_to_screen(snapshot.branches[parent].pos, rect);
                let b = self.world_to_screen(branch.pos, rect);
                let width = ((branch.size.sqrt() as f32) * BRANCH_WIDTH_SCALE * self.zoom).max(1.0);
                let color = if last.contains(&id) {
                    egui::Color32::RED
                } else {
                    egui::Color32::from_rgb(141, 110, 99)
                };
                painter.line_segment([a, b], egui::Stroke::new(width, color));
            }

            // Remaining attraction points as 1x1 squares.
            let side = self.zoom.max(1.0);
            for point in snapshot.points {
                let p = self.world_to_screen(point.pos, rect);
                painter.rect_filled(
                    egui::Rect::from_min_size(p, egui::vec2(side, side)),
                    0.0,
                    egui::Color32::from_rgb(76, 175, 80),
                );
            }

            // Auto-run growth if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
