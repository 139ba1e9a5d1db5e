//! Application entry point - Polar Translate.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run).
//! 3. Build the LibreTranslate backend and the Tesseract OCR engine.
//! 4. Warm up the supported-language list.
//! 5. Run [`eframe::run_native`]; the creator registers the global hotkey
//!    (it needs the egui context to request repaints) and builds the app.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use polar_translate::{
    app::TranslatorApp,
    clipboard::SystemClipboard,
    config::AppConfig,
    hotkey::{forwarding_callback, HotkeyEvent, HotkeyManager, RdevHotkeyManager},
    ocr::TesseractOcr,
    translate::{LibreTranslator, TranslatorService},
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Polar Translate")
        .with_inner_size([width, height])
        .with_min_inner_size([420.0, 320.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Hotkeys
// ---------------------------------------------------------------------------

/// Register the clipboard-translation hotkey and start listening.
///
/// Failures are logged and leave the app usable without hotkeys.
fn start_hotkeys(
    config: &AppConfig,
    ctx: egui::Context,
    tx: mpsc::Sender<HotkeyEvent>,
) -> Option<Box<dyn HotkeyManager>> {
    if !config.hotkey.enabled {
        log::info!("Global hotkeys disabled in settings");
        return None;
    }

    let mut manager = RdevHotkeyManager::new();
    let callback = forwarding_callback(tx, HotkeyEvent::ClipboardTranslation, move || {
        ctx.request_repaint();
    });

    let chord = &config.hotkey.clipboard_translation;
    if let Err(e) = manager.register(chord, callback) {
        log::warn!("Cannot register hotkey '{chord}': {e}");
        return None;
    }
    if let Err(e) = manager.start_listening() {
        log::warn!("Global hotkeys unavailable: {e}");
        return None;
    }

    log::info!("Global hotkeys: {}", manager.registered().join(", "));
    Some(Box::new(manager))
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Polar Translate starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });

    // 3. Collaborators
    let ocr = TesseractOcr::from_config(&config.ocr);
    match ocr.version() {
        Some(version) => log::info!("OCR engine: {version}"),
        None => log::warn!("Tesseract not found; OCR actions will fail until it is installed"),
    }
    let service = Arc::new(TranslatorService::new(
        Arc::new(LibreTranslator::from_config(&config.translation)),
        Arc::new(ocr),
    ));

    // 4. Warm-up
    let languages = service.supported_languages();
    log::info!(
        "{} languages available from {}",
        languages.len(),
        config.translation.base_url
    );

    // 5. UI
    let (hotkey_tx, hotkey_rx) = mpsc::channel::<HotkeyEvent>(16);
    let options = native_options(&config);

    eframe::run_native(
        "Polar Translate",
        options,
        Box::new(move |cc| {
            let hotkeys = start_hotkeys(&config, cc.egui_ctx.clone(), hotkey_tx);
            let app = TranslatorApp::new(
                service,
                Arc::new(SystemClipboard::new()),
                config,
                hotkey_rx,
                hotkeys,
            );
            Ok(Box::new(app))
        }),
    )
}
