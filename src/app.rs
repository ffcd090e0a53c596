use crate::clicker::{ClickJob, Pointer};
use crate::dispatch::{Dispatcher, UiMessage, UiQueue};
use crate::hooks::{InputHooks, HOTKEY_HELP};
use crate::settings::{ClickButton, ClickInputs, ClickKind, PositionMode, RepeatMode};
use crate::store::{SavedSettings, SettingsStore};
use egui::viewport::WindowLevel;
use std::collections::VecDeque;
use std::sync::Arc;

pub const TITLE_IDLE: &str = "AutoClicker";
pub const TITLE_RUNNING: &str = "AutoClicker (RUNNING...)";
pub const TITLE_PICKING: &str = "AutoClicker - PICK LOCATION (CLICK)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind { Info, Warning, Error }

/// A message box shown over the main window until dismissed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

// -------------- UI State --------------
pub struct AppState {
    pub(crate) inputs: ClickInputs,
    top_most: bool,

    job: Option<ClickJob>,
    next_job_id: u64,
    pointer: Arc<dyn Pointer>,

    dispatcher: Dispatcher,
    queue: UiQueue,
    store: SettingsStore,
    hooks: Option<InputHooks>,

    /// Shown one at a time, oldest first.
    pub(crate) notices: VecDeque<Notice>,
    /// Window changes waiting for the next frame to hand them to the viewport.
    pub(crate) window_cmds: Vec<egui::ViewportCommand>,
    shown_title: String,
    shut_down: bool,
}

impl AppState {
    pub fn new(
        store: SettingsStore,
        pointer: Arc<dyn Pointer>,
        (dispatcher, queue): (Dispatcher, UiQueue),
        hooks: Option<InputHooks>,
    ) -> Self {
        Self {
            inputs: ClickInputs::default(),
            top_most: false,
            job: None,
            next_job_id: 0,
            pointer,
            dispatcher,
            queue,
            store,
            hooks,
            notices: VecDeque::new(),
            window_cmds: Vec::new(),
            shown_title: String::new(),
            shut_down: false,
        }
    }

    // -------------- Click lifecycle --------------

    pub fn is_running(&self) -> bool {
        self.job.as_ref().is_some_and(ClickJob::is_running)
    }

    pub fn start(&mut self) {
        if self.is_running() {
            tracing::debug!("start ignored, already running");
            return;
        }
        self.next_job_id += 1;
        let snapshot = self.inputs.snapshot();
        self.job = Some(ClickJob::spawn(
            self.next_job_id,
            snapshot,
            Arc::clone(&self.pointer),
            self.dispatcher.clone(),
        ));
    }

    pub fn stop(&mut self) {
        match self.job.take() {
            Some(job) => {
                tracing::info!(job = job.id(), "stopping click loop");
                job.stop();
            }
            None => tracing::debug!("stop ignored, not running"),
        }
    }

    pub fn toggle(&mut self) {
        if self.is_running() { self.stop(); } else { self.start(); }
    }

    // -------------- Settings --------------

    pub fn top_most(&self) -> bool { self.top_most }

    /// The only way to change the always-on-top flag; the window follows on the next frame.
    pub fn set_top_most(&mut self, on: bool) {
        self.top_most = on;
        let level = if on { WindowLevel::AlwaysOnTop } else { WindowLevel::Normal };
        self.window_cmds.push(egui::ViewportCommand::WindowLevel(level));
    }

    pub fn load_settings(&mut self) {
        match self.store.load() {
            Ok(Some(saved)) => {
                self.inputs = saved.inputs();
                self.set_top_most(saved.top_most);
            }
            Ok(None) => self.set_top_most(self.top_most),
            Err(err) => {
                tracing::warn!(%err, "keeping current settings");
                self.push_notice(Notice {
                    kind: NoticeKind::Warning,
                    title: "Load Error".into(),
                    body: format!("Could not load {}:\n{err}", self.store.path().display()),
                });
            }
        }
    }

    pub fn save_settings(&mut self) {
        let saved = SavedSettings::new(&self.inputs, self.top_most());
        if let Err(err) = self.store.save(&saved) {
            tracing::error!(%err, "settings not saved");
            self.push_notice(Notice {
                kind: NoticeKind::Error,
                title: "Save Error".into(),
                body: format!("Could not save settings:\n{err}"),
            });
        }
    }

    // -------------- Location picker --------------

    pub fn is_picking(&self) -> bool {
        self.hooks.as_ref().is_some_and(InputHooks::is_picking)
    }

    /// Returns whether the picker is now waiting for a click.
    pub fn pick_location(&mut self) -> bool {
        match &self.hooks {
            Some(hooks) if hooks.is_listening() => {
                hooks.arm_picker();
                true
            }
            _ => {
                self.push_notice(Notice {
                    kind: NoticeKind::Warning,
                    title: "Pick Location".into(),
                    body: "Picking a location needs global input hooks, which are not active.".into(),
                });
                false
            }
        }
    }

    // -------------- Dispatch --------------

    /// Applies everything other threads queued since the last frame.
    pub fn process_messages(&mut self) {
        let pending: Vec<_> = self.queue.drain().collect();
        for msg in pending {
            self.handle(msg);
        }
    }

    fn handle(&mut self, msg: UiMessage) {
        match msg {
            UiMessage::Start => self.start(),
            UiMessage::Stop => self.stop(),
            UiMessage::Toggle => self.toggle(),
            UiMessage::ClickLoopFinished { job_id } => {
                // Loops from earlier runs may report long after being replaced.
                if self.job.as_ref().is_some_and(|job| job.id() == job_id) {
                    self.stop();
                }
            }
            UiMessage::LocationPicked { x, y } => {
                self.inputs.x = x.max(0) as u32;
                self.inputs.y = y.max(0) as u32;
                self.inputs.position_mode = PositionMode::FixedPoint;
            }
            UiMessage::Warning { title, body } => {
                self.push_notice(Notice { kind: NoticeKind::Warning, title, body });
            }
        }
    }

    pub fn title(&self) -> &'static str {
        if self.is_picking() {
            TITLE_PICKING
        } else if self.is_running() {
            TITLE_RUNNING
        } else {
            TITLE_IDLE
        }
    }

    /// Stops clicking and mutes the global hooks. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down { return; }
        self.shut_down = true;
        self.stop();
        if let Some(hooks) = &self.hooks {
            hooks.shutdown();
        }
        tracing::info!("shut down");
    }

    // -------------- Widgets --------------

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("Help", |ui| {
                if ui.button("Hotkeys").clicked() {
                    self.show_hotkeys();
                    ui.close_menu();
                }
            });
            if ui.button("Exit").clicked() {
                self.shutdown();
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
    }

    fn show_hotkeys(&mut self) {
        self.push_notice(Notice {
            kind: NoticeKind::Info,
            title: "Hotkeys".into(),
            body: HOTKEY_HELP.into(),
        });
    }

    fn interval_group(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Click Interval");
            ui.horizontal(|ui| {
                let i = &mut self.inputs;
                ui.add(egui::DragValue::new(&mut i.hours).clamp_range(0..=999));
                ui.label("hours");
                ui.add(egui::DragValue::new(&mut i.minutes).clamp_range(0..=59));
                ui.label("minutes");
                ui.add(egui::DragValue::new(&mut i.seconds).clamp_range(0..=59));
                ui.label("seconds");
                ui.add(egui::DragValue::new(&mut i.millis).clamp_range(0..=999));
                ui.label("milliseconds");
            });
        });
    }

    fn repeat_group(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Click Repeat");
            let i = &mut self.inputs;
            ui.radio_value(&mut i.repeat_mode, RepeatMode::Infinite, "Infinite (Until stopped)");
            ui.horizontal(|ui| {
                ui.radio_value(&mut i.repeat_mode, RepeatMode::FixedCount, "");
                ui.add(egui::DragValue::new(&mut i.repeat_times).clamp_range(0..=99_999));
                ui.label("Times");
            });
        });
    }

    fn position_group(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Click Position");
            ui.radio_value(&mut self.inputs.position_mode, PositionMode::CurrentCursor, "Current Cursor Position");
            ui.horizontal(|ui| {
                let i = &mut self.inputs;
                ui.radio_value(&mut i.position_mode, PositionMode::FixedPoint, "");
                ui.label("X");
                ui.add(egui::DragValue::new(&mut i.x).clamp_range(0..=9999));
                ui.label("Y");
                ui.add(egui::DragValue::new(&mut i.y).clamp_range(0..=9999));
                if ui.button("Pick").on_hover_text("Click anywhere on screen to set X/Y").clicked()
                    && self.pick_location()
                {
                    // The title for this frame is already out.
                    ui.ctx().request_repaint();
                }
            });
        });
    }

    fn options_group(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Click Options");
            ui.horizontal(|ui| {
                let i = &mut self.inputs;
                ui.label("Mouse Button");
                egui::ComboBox::from_id_source("mouse_button")
                    .selected_text(i.button.label())
                    .show_ui(ui, |ui| {
                        for button in ClickButton::ALL {
                            ui.selectable_value(&mut i.button, button, button.label());
                        }
                    });
                ui.label("Click Type");
                egui::ComboBox::from_id_source("click_type")
                    .selected_text(i.click_kind.label())
                    .show_ui(ui, |ui| {
                        for kind in ClickKind::ALL {
                            ui.selectable_value(&mut i.click_kind, kind, kind.label());
                        }
                    });
            });
        });
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let running = self.is_running();
        ui.horizontal(|ui| {
            if ui.add_enabled(!running, egui::Button::new("Start (F6)")).clicked() { self.start(); }
            if ui.add_enabled(running, egui::Button::new("Stop (F7)")).clicked() { self.stop(); }
            if ui.button("Toggle (F8)").clicked() { self.toggle(); }
        });
        ui.horizontal(|ui| {
            if ui.button("Save Settings").clicked() { self.save_settings(); }
            if ui.button("Hotkeys").clicked() { self.show_hotkeys(); }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut top_most = self.top_most;
                if ui.checkbox(&mut top_most, "Top most window").changed() {
                    self.set_top_most(top_most);
                }
            });
        });
    }

    fn push_notice(&mut self, notice: Notice) {
        tracing::debug!(title = %notice.title, "notice queued");
        self.notices.push_back(notice);
    }

    pub(crate) fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    fn notice_window(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.front() else { return };
        let mut dismissed = false;
        egui::Window::new(notice.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                match notice.kind {
                    NoticeKind::Info => {}
                    NoticeKind::Warning => { ui.colored_label(egui::Color32::YELLOW, "Warning"); }
                    NoticeKind::Error => { ui.colored_label(egui::Color32::LIGHT_RED, "Error"); }
                }
                ui.label(notice.body.as_str());
                if ui.button("OK").clicked() { dismissed = true; }
            });
        if dismissed { self.dismiss_notice(); }
    }
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dispatcher.attach(ctx);
        self.process_messages();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }

        for cmd in self.window_cmds.drain(..) {
            ctx.send_viewport_cmd(cmd);
        }
        let title = self.title();
        if self.shown_title != title {
            self.shown_title = title.to_owned();
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.to_owned()));
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.menu_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.interval_group(ui);
            ui.horizontal(|ui| {
                self.repeat_group(ui);
                self.position_group(ui);
            });
            self.options_group(ui);
            ui.separator();
            self.controls(ui);
        });

        self.notice_window(ctx);
    }
}
