use std::path::Path;
use std::time::Duration;

use eframe::egui;
use icicle_core::model::{NodeKey, ProfileDatabase, ProfileKey, ROOT_NODE_KEY};
use icicle_core::parsers::parse_auto;
use icicle_core::{DrawSurface, PartitionView, ViewConfig};
use icicle_protocol::{Point, SharedStr};
use tracing::{info, warn};

use crate::renderer::PainterSurface;

/// Longest frame step fed to the animation, in seconds.
const MAX_STEP: f32 = 0.1;

/// Format a duration in ns to human-readable string.
fn format_duration(ns: u64) -> String {
    let ns = ns as f64;
    if ns < 1000.0 {
        format!("{ns:.0}ns")
    } else if ns < 1_000_000.0 {
        format!("{:.1}µs", ns / 1000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.2}ms", ns / 1_000_000.0)
    } else {
        format!("{:.2}s", ns / 1_000_000_000.0)
    }
}

/// Main application state.
pub struct PartitionApp {
    db: &'static ProfileDatabase,
    view: PartitionView<'static>,
    /// Node under the pointer in the last frame.
    hovered: Option<NodeKey>,
    /// Error message to display.
    error: Option<String>,
}

impl PartitionApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        db: &'static ProfileDatabase,
        config: ViewConfig,
    ) -> Self {
        // Cells are drawn on a white background by default
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self::with_store(db, config)
    }

    /// App over `db`, focused on the root of its first profile if it has one.
    pub fn with_store(db: &'static ProfileDatabase, config: ViewConfig) -> Self {
        let mut view = PartitionView::new(config);
        if let Err(err) = view.attach_data_source(db) {
            warn!(%err, "attaching profile database");
        }
        let mut app = Self {
            db,
            view,
            hovered: None,
            error: None,
        };
        if let Some(&key) = db.profile_keys().first() {
            app.focus(key, ROOT_NODE_KEY);
        }
        app
    }

    pub fn view(&self) -> &PartitionView<'static> {
        &self.view
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Parse `data`, add it to the database and focus its root.
    pub fn load_bytes(&mut self, data: &[u8], name: &str) {
        match parse_auto(data, name) {
            Ok(profile) => {
                info!(profile = %profile.name, nodes = profile.len(), "profile loaded");
                let key = self.db.add_profile(profile);
                self.error = None;
                self.focus(key, ROOT_NODE_KEY);
            }
            Err(err) => self.error = Some(format!("Failed to parse {name}: {err}")),
        }
    }

    pub fn load_file(&mut self, path: &Path) {
        match std::fs::read(path) {
            Ok(data) => {
                let name = path
                    .file_stem()
                    .map_or_else(|| "profile".to_owned(), |s| s.to_string_lossy().into_owned());
                self.load_bytes(&data, &name);
            }
            Err(e) => self.error = Some(format!("Failed to read file: {e}")),
        }
    }

    pub fn focus(&mut self, profile_key: ProfileKey, node_key: NodeKey) {
        if let Err(err) = self.view.set_active_node(profile_key, node_key) {
            self.error = Some(err.to_string());
        }
    }

    /// Focus the parent of the active node.
    pub fn up(&mut self) {
        let active = self.view.active_key();
        let parent = self
            .db
            .profile(active.profile_key)
            .ok()
            .and_then(|p| p.node(active.node_key).and_then(|n| n.parent_key));
        if let Some(parent) = parent {
            self.focus(active.profile_key, parent);
        }
    }

    fn profile_name(&self, key: ProfileKey) -> String {
        self.db
            .profile(key)
            .map(|p| p.name.to_string())
            .unwrap_or_default()
    }

    fn path_label(&self) -> String {
        let active = self.view.active_key();
        self.db
            .profile(active.profile_key)
            .map(|p| {
                p.path_of(active.node_key)
                    .iter()
                    .map(SharedStr::as_str)
                    .collect::<Vec<&str>>()
                    .join(" › ")
            })
            .unwrap_or_default()
    }

    /// `name | total | self` for a node of the active profile.
    fn describe(&self, node_key: NodeKey) -> Option<String> {
        let profile = self.db.profile(self.view.active_key().profile_key).ok()?;
        let node = profile.node(node_key)?;
        Some(format!(
            "{} | total {} | self {}",
            node.name,
            format_duration(node.inclusive_ns()),
            format_duration(node.exclusive_ns()),
        ))
    }

    fn show_partition(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
        let area = response.rect;
        let mut surface = PainterSurface::new(&painter, area);
        let window = surface.window_rect();
        if let Err(err) = self.view.render(&mut surface) {
            self.error = Some(err.to_string());
        }

        let local = |pos: egui::Pos2| {
            Point::new(
                f64::from(pos.x - area.min.x),
                f64::from(pos.y - area.min.y),
            )
        };
        let hit = |view: &PartitionView<'static>, pos: Option<egui::Pos2>| {
            pos.and_then(|pos| view.node_at(local(pos), &window))
                .map(|item| item.node_key)
        };

        self.hovered = hit(&self.view, response.hover_pos());
        if response.clicked() {
            if let Some(node_key) = hit(&self.view, response.interact_pointer_pos()) {
                let profile_key = self.view.active_key().profile_key;
                self.focus(profile_key, node_key);
            }
        }
        if let Some(text) = self.hovered.and_then(|key| self.describe(key)) {
            response.on_hover_text_at_pointer(text);
        }
    }
}

impl eframe::App for PartitionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt).clamp(0.0, MAX_STEP);
        if self.view.tick(Duration::from_secs_f32(dt)) || self.view.is_animating() {
            ctx.request_repaint();
        }

        // Files dropped onto the window
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = &file.bytes {
                self.load_bytes(bytes, &file.name);
            } else if let Some(path) = &file.path {
                self.load_file(path);
            }
        }

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("icicle");
                ui.separator();

                if ui.button("Open").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Profile", &["folded", "txt", "json"])
                        .pick_file()
                    {
                        self.load_file(&path);
                    }
                }

                let active = self.view.active_key();
                ui.add_enabled_ui(active.is_valid(), |ui| {
                    if ui.button("Up").clicked() {
                        self.up();
                    }
                    if ui.button("Root").clicked() {
                        self.focus(active.profile_key, ROOT_NODE_KEY);
                    }
                });

                let keys = self.db.profile_keys();
                if keys.len() > 1 {
                    let mut selected = active.profile_key;
                    egui::ComboBox::from_id_salt("profile")
                        .selected_text(self.profile_name(selected))
                        .show_ui(ui, |ui| {
                            for key in keys {
                                ui.selectable_value(&mut selected, key, self.profile_name(key));
                            }
                        });
                    if selected != active.profile_key {
                        self.focus(selected, ROOT_NODE_KEY);
                    }
                }

                ui.separator();
                ui.label(self.path_label());
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::RED, err);
                } else if let Some(text) = self
                    .hovered
                    .or_else(|| {
                        let active = self.view.active_key();
                        active.is_valid().then_some(active.node_key)
                    })
                    .and_then(|key| self.describe(key))
                {
                    ui.label(text);
                } else {
                    ui.label("No profile loaded. Click Open or drop a file here.");
                }
            });
        });

        // Central panel: partition view
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if !self.view.active_key().is_valid() {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Drop a profile here or click Open");
                    });
                    return;
                }
                self.show_partition(ui);
            });
    }
}
