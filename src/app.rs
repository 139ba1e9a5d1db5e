//! Translator window - egui/eframe application.
//!
//! # Architecture
//!
//! [`TranslatorApp`] is the top-level [`eframe::App`].  It owns a
//! [`TaskDispatcher`] and turns every user action (button, hotkey) into a
//! [`Task`] that calls the shared [`TranslatorService`] off the UI thread.
//! Each frame it drains two non-blocking channels:
//!
//! * `hotkey_rx`: [`HotkeyEvent`]s posted by the hotkey listener thread.
//! * the dispatcher's [`TaskEvent`]s: `Started`, `Result`/`Error`,
//!   `Completed`.
//!
//! While a task is in flight every task button and the language pickers are
//! disabled and the bottom status line shows the task's status with a
//! spinner.  After `Completed` the status line shows "Task completed." or
//! the error for a few seconds.  A failed translation also replaces the
//! text in the output box (or the pop-up) so a stale result is never left
//! on screen.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use eframe::egui;
use tokio::sync::mpsc;

use crate::clipboard::Clipboard;
use crate::config::AppConfig;
use crate::dispatch::{Task, TaskDispatcher, TaskEvent};
use crate::hotkey::{HotkeyEvent, HotkeyManager};
use crate::ocr::{reserve_png_path, write_png};
use crate::translate::{Language, TranslationResult, TranslatorService};

const BUSY_NOTICE: &str = "A previous task is still running. Please wait.";
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// What started the task that is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOrigin {
    Manual,
    OcrClipboard,
    OcrFile,
    Hotkey,
    Languages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct Status {
    text: String,
    tone: Tone,
    /// `None` while it describes the running task.
    expires: Option<Instant>,
}

// ---------------------------------------------------------------------------
// TranslatorApp
// ---------------------------------------------------------------------------

pub struct TranslatorApp {
    // ── Collaborators ────────────────────────────────────────────────────
    service: Arc<TranslatorService>,
    clipboard: Arc<dyn Clipboard>,
    dispatcher: TaskDispatcher,
    hotkey_rx: mpsc::Receiver<HotkeyEvent>,
    /// Kept so listening can be stopped on exit.
    hotkeys: Option<Box<dyn HotkeyManager>>,
    config: AppConfig,

    // ── Form state ───────────────────────────────────────────────────────
    languages: Vec<Language>,
    source_idx: usize,
    target_idx: usize,
    input: String,
    output: String,

    // ── Task feedback ────────────────────────────────────────────────────
    status: Option<Status>,
    /// Hotkey translation shown in a pop-up window.
    popup: Option<String>,
    /// The pop-up asked for the window to stay above other windows.
    popup_pinned: bool,
    pending_origin: Option<TaskOrigin>,
    /// Status to show once the running task completes.
    completion: Option<(String, Tone)>,

    /// Where clipboard images are written for OCR.
    capture_dir: PathBuf,
}

impl TranslatorApp {
    pub fn new(
        service: Arc<TranslatorService>,
        clipboard: Arc<dyn Clipboard>,
        config: AppConfig,
        hotkey_rx: mpsc::Receiver<HotkeyEvent>,
        hotkeys: Option<Box<dyn HotkeyManager>>,
    ) -> Self {
        let languages = service.supported_languages();

        let mut app = Self {
            service,
            clipboard,
            dispatcher: TaskDispatcher::new(),
            hotkey_rx,
            hotkeys,
            config,
            languages: Vec::new(),
            source_idx: 0,
            target_idx: 0,
            input: String::new(),
            output: String::new(),
            status: None,
            popup: None,
            popup_pinned: false,
            pending_origin: None,
            completion: None,
            capture_dir: std::env::temp_dir(),
        };
        app.apply_languages(languages);

        if app.languages.is_empty() {
            app.status = Some(Status {
                text: format!(
                    "No languages available; is the translation server at {} running? \
                     Use \"Reload languages\" to retry.",
                    app.config.translation.base_url
                ),
                tone: Tone::Error,
                expires: None,
            });
        }
        app
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn translate_input(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            self.set_status("Enter some text to translate.", Tone::Error);
            return;
        }

        let (source, target) = self.language_codes();
        let service = Arc::clone(&self.service);
        let task = Task::new("Translating...", move || {
            Ok(service.perform_translation(&text, &source, &target))
        });
        self.submit(TaskOrigin::Manual, task);
    }

    /// Reads the image on the UI thread; PNG encoding and OCR run in the
    /// task.
    fn ocr_clipboard_image(&mut self) {
        let image = match self.clipboard.get_image() {
            Ok(Some(image)) => image,
            Ok(None) => {
                self.set_status("The clipboard holds no image.", Tone::Error);
                return;
            }
            Err(e) => {
                log::warn!("app: clipboard image read failed: {e}");
                self.set_status(format!("Could not read the clipboard image: {e}"), Tone::Error);
                return;
            }
        };
        let path = match reserve_png_path(&self.capture_dir) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("app: {e}");
                self.set_status(format!("Could not save the clipboard image: {e}"), Tone::Error);
                return;
            }
        };

        let (source, target) = self.language_codes();
        let service = Arc::clone(&self.service);
        let png = path.clone();
        let task = Task::new("Extracting text from the clipboard image...", move || {
            write_png(image, &png).context("cannot save the clipboard image")?;
            Ok(service.perform_ocr_and_translate(&png, &source, &target))
        })
        .remove_file_on_completion(path.clone());

        if !self.submit(TaskOrigin::OcrClipboard, task) {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("app: cannot remove {}: {e}", path.display());
            }
        }
    }

    fn ocr_image_file(&mut self, path: PathBuf) {
        let (source, target) = self.language_codes();
        let service = Arc::clone(&self.service);
        let status = format!(
            "Extracting text from {}...",
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        );
        let task = Task::new(status, move || {
            Ok(service.perform_ocr_and_translate(&path, &source, &target))
        });
        self.submit(TaskOrigin::OcrFile, task);
    }

    fn translate_clipboard(&mut self) {
        let (source, target) = self.language_codes();
        let service = Arc::clone(&self.service);
        let clipboard = Arc::clone(&self.clipboard);
        let task = Task::new("Translating clipboard...", move || {
            Ok(service.translate_clipboard(clipboard.as_ref(), &source, &target))
        });
        self.submit(TaskOrigin::Hotkey, task);
    }

    fn reload_languages(&mut self) {
        let service = Arc::clone(&self.service);
        let base_url = self.config.translation.base_url.clone();
        let task = Task::new("Loading languages...", move || {
            let count = service.reload_languages().len();
            Ok(if count == 0 {
                TranslationResult::failure(format!("No languages available from {base_url}."))
            } else {
                TranslationResult::success(format!("Loaded {count} languages."))
            })
        });
        self.submit(TaskOrigin::Languages, task);
    }

    fn copy_output(&mut self) {
        if self.output.is_empty() {
            return;
        }
        match self.clipboard.set_text(&self.output) {
            Ok(()) => self.set_status("Copied to clipboard.", Tone::Info),
            Err(e) => self.set_status(e.to_string(), Tone::Error),
        }
    }

    fn swap_languages(&mut self) {
        std::mem::swap(&mut self.source_idx, &mut self.target_idx);
        if !self.output.is_empty() {
            self.input = std::mem::take(&mut self.output);
        }
    }

    fn submit(&mut self, origin: TaskOrigin, task: Task) -> bool {
        if self.dispatcher.submit(task) {
            self.pending_origin = Some(origin);
            self.completion = None;
            true
        } else {
            self.set_status(BUSY_NOTICE, Tone::Error);
            false
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    fn poll_hotkeys(&mut self) {
        while let Ok(event) = self.hotkey_rx.try_recv() {
            match event {
                HotkeyEvent::ClipboardTranslation => self.translate_clipboard(),
            }
        }
    }

    fn poll_tasks(&mut self) {
        while let Some(event) = self.dispatcher.try_next_event() {
            self.handle_task_event(event);
        }
    }

    fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Started { status } => {
                self.status = Some(Status {
                    text: status,
                    tone: Tone::Info,
                    expires: None,
                });
            }
            TaskEvent::Result(TranslationResult::Success { translated_text }) => {
                if self.pending_origin == Some(TaskOrigin::Languages) {
                    if let Some(languages) = self.service.cached_languages() {
                        self.apply_languages(languages);
                    }
                    self.completion = Some((translated_text, Tone::Info));
                } else {
                    self.show_text(translated_text);
                }
            }
            TaskEvent::Result(TranslationResult::Failure { error }) => {
                self.show_failure(format!("Error: {error}"));
            }
            TaskEvent::Error { message } => {
                self.show_failure(format!("Task failed: {message}"));
            }
            TaskEvent::Completed => {
                self.pending_origin = None;
                match self.completion.take() {
                    Some((text, tone)) => self.set_status(text, tone),
                    None => self.set_status("Task completed.", Tone::Info),
                }
            }
        }
    }

    /// Put a task's text where its origin expects it: the pop-up for hotkey
    /// translations, the output box otherwise.
    fn show_text(&mut self, text: String) {
        let popup = self.pending_origin == Some(TaskOrigin::Hotkey) && self.config.ui.popup_on_hotkey;
        if popup {
            self.popup = Some(text);
        } else {
            self.output = text;
        }
    }

    fn show_failure(&mut self, text: String) {
        // A failed reload leaves the translation alone.
        if self.pending_origin != Some(TaskOrigin::Languages) {
            self.show_text(text.clone());
        }
        self.completion = Some((text, Tone::Error));
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Selected codes, or the configured defaults when the language list
    /// could not be loaded.
    fn language_codes(&self) -> (String, String) {
        let code = |idx: usize, fallback: &str| {
            self.languages
                .get(idx)
                .map(|l| l.code.clone())
                .unwrap_or_else(|| fallback.to_string())
        };
        (
            code(self.source_idx, &self.config.translation.default_source),
            code(self.target_idx, &self.config.translation.default_target),
        )
    }

    /// Replace the language list, keeping the selected codes when they are
    /// still offered and falling back to the configured defaults.
    fn apply_languages(&mut self, languages: Vec<Language>) {
        let (source, target) = self.language_codes();
        let defaults = &self.config.translation;
        let position = |code: &str| languages.iter().position(|l| l.code == code);

        self.source_idx = position(&source)
            .or_else(|| position(&defaults.default_source))
            .unwrap_or(0);
        self.target_idx = position(&target)
            .or_else(|| position(&defaults.default_target))
            .unwrap_or_else(|| languages.len().saturating_sub(1).min(1));
        self.languages = languages;
    }

    /// Flip the pop-up pin and return the level the main window should use.
    fn toggle_pin(&mut self) -> egui::WindowLevel {
        self.popup_pinned = !self.popup_pinned;
        if self.popup_pinned || self.config.ui.always_on_top {
            egui::WindowLevel::AlwaysOnTop
        } else {
            egui::WindowLevel::Normal
        }
    }

    fn set_status(&mut self, text: impl Into<String>, tone: Tone) {
        self.status = Some(Status {
            text: text.into(),
            tone,
            expires: Some(Instant::now() + STATUS_TIMEOUT),
        });
    }

    fn expire_status(&mut self) {
        let expired = self
            .status
            .as_ref()
            .and_then(|s| s.expires)
            .is_some_and(|t| Instant::now() >= t);
        if expired {
            self.status = None;
        }
    }

    fn language_name(&self, idx: usize) -> &str {
        self.languages.get(idx).map(|l| l.name.as_str()).unwrap_or("-")
    }

    // ── Panel renderers ──────────────────────────────────────────────────

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.dispatcher.is_busy() {
                ui.spinner();
            }
            if let Some(status) = &self.status {
                let color = match status.tone {
                    Tone::Info => egui::Color32::from_rgb(150, 150, 150),
                    Tone::Error => egui::Color32::from_rgb(255, 136, 68),
                };
                ui.label(egui::RichText::new(status.text.as_str()).color(color));
            } else {
                ui.label(
                    egui::RichText::new(self.dispatcher.state().label())
                        .color(egui::Color32::from_rgb(120, 120, 120)),
                );
            }
        });
    }

    fn draw_language_row(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!busy, |ui| {
                let source_name = self.language_name(self.source_idx).to_string();
                egui::ComboBox::from_id_salt("source_language")
                    .selected_text(source_name)
                    .show_ui(ui, |ui| {
                        for (i, lang) in self.languages.iter().enumerate() {
                            ui.selectable_value(&mut self.source_idx, i, lang.name.as_str());
                        }
                    });

                if ui.button("⇄ Swap").clicked() {
                    self.swap_languages();
                }

                let target_name = self.language_name(self.target_idx).to_string();
                egui::ComboBox::from_id_salt("target_language")
                    .selected_text(target_name)
                    .show_ui(ui, |ui| {
                        for (i, lang) in self.languages.iter().enumerate() {
                            ui.selectable_value(&mut self.target_idx, i, lang.name.as_str());
                        }
                    });

                if ui.button("⟳ Reload languages").clicked() {
                    self.reload_languages();
                }
            });
        });
    }

    fn draw_actions(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.horizontal(|ui| {
            if ui.add_enabled(!busy, egui::Button::new("Translate")).clicked() {
                self.translate_input();
            }
            if ui
                .add_enabled(!busy, egui::Button::new("OCR clipboard image"))
                .clicked()
            {
                self.ocr_clipboard_image();
            }
            if ui
                .add_enabled(!busy, egui::Button::new("OCR image file..."))
                .clicked()
            {
                let picked = rfd::FileDialog::new()
                    .set_title("Choose an image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file();
                if let Some(path) = picked {
                    self.ocr_image_file(path);
                }
            }
            if ui
                .add_enabled(!self.output.is_empty(), egui::Button::new("Copy result"))
                .clicked()
            {
                self.copy_output();
            }
        });
    }

    fn draw_popup(&mut self, ctx: &egui::Context) {
        let Some(text) = self.popup.clone() else {
            return;
        };

        let mut open = true;
        let mut copy = false;
        let mut pin = false;
        let pin_label = if self.popup_pinned { "Unpin" } else { "Pin" };
        egui::Window::new("Clipboard translation")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("popup_text")
                    .max_height(240.0)
                    .show(ui, |ui| {
                        ui.label(text.as_str());
                    });
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    copy = ui.button("Copy").clicked();
                    pin = ui
                        .button(pin_label)
                        .on_hover_text("Keep the window above other windows")
                        .clicked();
                });
            });

        if copy {
            ctx.copy_text(text);
        }
        // Closing a pinned pop-up unpins the window again.
        if pin || (!open && self.popup_pinned) {
            let level = self.toggle_pin();
            ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(level));
        }
        if !open {
            self.popup = None;
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for TranslatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_hotkeys();
        self.poll_tasks();
        self.expire_status();

        let busy = self.dispatcher.is_busy();
        if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if self.status.as_ref().is_some_and(|s| s.expires.is_some()) {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_language_row(ui, busy);
            ui.separator();

            ui.label("Text");
            egui::ScrollArea::vertical()
                .id_salt("input_text")
                .max_height(160.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.input)
                            .desired_rows(6)
                            .desired_width(f32::INFINITY),
                    );
                });

            ui.add_space(4.0);
            self.draw_actions(ui, busy);
            ui.separator();

            ui.label("Translation");
            egui::ScrollArea::vertical()
                .id_salt("output_text")
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.output.as_str())
                            .desired_rows(6)
                            .desired_width(f32::INFINITY),
                    );
                });
        });

        self.draw_popup(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(hotkeys) = self.hotkeys.as_mut() {
            hotkeys.stop_listening();
        }
        let timeout = self.config.tasks.shutdown_timeout();
        if self.dispatcher.shutdown(timeout) {
            log::info!("Translator window closing");
        } else {
            log::warn!("Translator window closing with a task still running");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
