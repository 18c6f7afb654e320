// Playground app shell
// Editor, transport, starter templates, project persistence, and the timeline
// pane. The shell owns the simulated host; the timeline engine only sees the
// bus, the instrument source, and its widget surface.

use crate::host::auth::AuthClient;
use crate::host::bus::{BusEvent, EventBus};
use crate::host::storage::{ProjectMeta, ProjectStore};
use crate::host::templates::TemplateCatalog;
use crate::sim::{BeatClock, BuiltinTemplates, MemoryStore, SimAuth, SimInstrument, SimRig};
use crate::timeline::TimelineViz;
use crate::ui::beat_indicator;
use crate::ui::widget::TimelineWidget;
use eframe::egui;
use std::sync::Arc;

pub struct PlaygroundApp {
    bus: EventBus,
    rig: Arc<SimRig>,
    viz: TimelineViz,
    widget: TimelineWidget,
    clock: BeatClock,
    current_beat: u32,
    templates: BuiltinTemplates,
    store: MemoryStore,
    projects: Vec<ProjectMeta>,
    auth: SimAuth,
    email: String,
    password: String,
    code: String,
    project_name: String,
    status: String,
}

impl PlaygroundApp {
    pub fn new(
        bus: EventBus,
        rig: Arc<SimRig>,
        viz: TimelineViz,
        widget: TimelineWidget,
        bpm: u32,
    ) -> Self {
        let beats_per_measure = viz.config().beats_per_measure;
        Self {
            bus,
            rig,
            viz,
            widget,
            clock: BeatClock::new(bpm, beats_per_measure),
            current_beat: 0,
            templates: BuiltinTemplates::new(),
            store: MemoryStore::new(),
            projects: Vec::new(),
            auth: SimAuth::new(),
            email: String::new(),
            password: String::new(),
            code: String::new(),
            project_name: String::new(),
            status: "Ready".to_string(),
        }
    }

    /// Stand-in for evaluating the editor code: rebind a fixed set of
    /// instruments on the rig. The timeline discovers them on the next tick.
    fn run_code(&mut self) {
        self.rig.clear();
        self.rig.insert(
            "drums",
            SimInstrument::new("EDrum808").with_values(vec![1.0, 0.0, 1.0, 0.0]),
        );
        self.rig.insert(
            "bass",
            SimInstrument::new("Mono").with_values(vec![0.0, 0.0, 7.0, 5.0]),
        );
        self.rig.insert(
            "lead",
            SimInstrument::new("PolySynth").with_values(vec![0.0, 4.0, 7.0, 12.0]),
        );
        self.viz.start();
        self.status = "Running".to_string();
    }

    fn clear_code(&mut self) {
        self.rig.clear();
        self.bus.publish(BusEvent::Clear);
        self.status = "Cleared".to_string();
    }

    fn save_project(&mut self) {
        if self.project_name.is_empty() {
            self.status = "Give the project a name first".to_string();
            return;
        }
        match self.store.save(&self.project_name, &self.code) {
            Ok(()) => {
                self.status = format!("Saved `{}`", self.project_name);
                self.refresh_projects();
            }
            Err(err) => self.status = format!("Save failed: {err}"),
        }
    }

    fn load_project(&mut self, name: &str) {
        match self.store.load(name) {
            Ok(code) => {
                self.code = code;
                self.project_name = name.to_string();
                self.status = format!("Loaded `{name}`");
            }
            Err(err) => self.status = format!("Load failed: {err}"),
        }
    }

    fn refresh_projects(&mut self) {
        match self.store.list() {
            Ok(projects) => self.projects = projects,
            Err(err) => self.status = format!("Listing failed: {err}"),
        }
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("▶ Run").clicked() {
                self.run_code();
            }
            if ui.button("■ Stop").clicked() {
                self.viz.stop();
                self.status = "Stopped".to_string();
            }
            if ui.button("✖ Clear").clicked() {
                self.clear_code();
            }
            ui.add_space(12.0);
            beat_indicator::show(ui, self.current_beat);
        });
    }

    fn draw_editor(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Template:");
            egui::ComboBox::from_id_salt("template_picker")
                .selected_text("Insert…")
                .show_ui(ui, |ui| {
                    let mut chosen = None;
                    for template in self.templates.templates() {
                        if ui
                            .selectable_label(false, &template.name)
                            .on_hover_text(&template.description)
                            .clicked()
                        {
                            chosen = Some(template.code.clone());
                        }
                    }
                    if let Some(code) = chosen {
                        self.code = code;
                        self.status = "Template inserted".to_string();
                    }
                });
        });

        egui::ScrollArea::vertical().max_height(180.0).show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut self.code)
                    .code_editor()
                    .desired_width(f32::INFINITY)
                    .desired_rows(10),
            );
        });
    }

    fn draw_projects(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Project:");
            ui.text_edit_singleline(&mut self.project_name);
            if ui.button("Save").clicked() {
                self.save_project();
            }
        });

        let mut to_load = None;
        for project in &self.projects {
            ui.horizontal(|ui| {
                if ui.link(&project.name).clicked() {
                    to_load = Some(project.name.clone());
                }
                ui.weak(project.updated_at.format("%Y-%m-%d %H:%M").to_string());
            });
        }
        if let Some(name) = to_load {
            self.load_project(&name);
        }
    }

    fn draw_account(&mut self, ui: &mut egui::Ui) {
        if let Some(session) = self.auth.session() {
            let email = session.email.clone();
            ui.horizontal(|ui| {
                ui.label(format!("Signed in as {email}"));
                if ui.button("Sign out").clicked() {
                    if let Err(err) = self.auth.sign_out() {
                        self.status = format!("Sign-out failed: {err}");
                    }
                }
            });
            return;
        }

        ui.horizontal(|ui| {
            ui.label("Email:");
            ui.text_edit_singleline(&mut self.email);
            ui.label("Password:");
            ui.add(egui::TextEdit::singleline(&mut self.password).password(true));
            if ui.button("Sign in").clicked() {
                match self.auth.sign_in(&self.email, &self.password) {
                    Ok(session) => self.status = format!("Welcome back, {}", session.email),
                    Err(err) => self.status = format!("Sign-in failed: {err}"),
                }
            }
            if ui.button("Sign up").clicked() {
                match self.auth.sign_up(&self.email, &self.password) {
                    Ok(session) => self.status = format!("Account created for {}", session.email),
                    Err(err) => self.status = format!("Sign-up failed: {err}"),
                }
            }
        });
    }

    fn draw_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            ui.label(&self.status);
            if self.viz.is_disabled() {
                ui.colored_label(
                    egui::Color32::from_rgb(255, 107, 107),
                    "⚠ timeline disabled after repeated errors",
                );
            }
        });
    }
}

impl eframe::App for PlaygroundApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep frames coming so the clock and the timeline loop advance.
        ctx.request_repaint();

        if let Some(beat) = self.clock.poll() {
            self.current_beat = beat;
            self.bus.publish(BusEvent::MetronomeTick(beat));
        }
        self.viz.on_frame();
        for id in self.widget.take_clicks() {
            self.viz.toggle_mute(&id);
            self.status = format!("Toggled mute on `{id}`");
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Livecode Playground");
            ui.separator();

            self.draw_transport(ui);
            ui.add_space(8.0);
            self.draw_editor(ui);

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Timeline");
            self.widget.show(ui);

            ui.add_space(8.0);
            ui.separator();
            self.draw_projects(ui);

            ui.add_space(8.0);
            ui.separator();
            self.draw_account(ui);

            self.draw_status_bar(ui);
        });
    }
}
