//! `rdev`-backed [`HotkeyManager`].
//!
//! `rdev::listen` blocks forever and has no shutdown API, so it runs on a
//! dedicated `hotkey-listener` OS thread that is spawned on the first
//! [`start_listening`](HotkeyManager::start_listening) and lives until the
//! process exits.  [`stop_listening`](HotkeyManager::stop_listening) and
//! `Drop` clear a shared flag; while it is clear the thread discards every
//! event.
//!
//! Callbacks run on the listener thread and must return quickly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use super::chord::{ChordTracker, Hotkey};
use super::{HotkeyCallback, HotkeyError, HotkeyManager};

struct Binding {
    hotkey: Hotkey,
    callback: HotkeyCallback,
}

#[derive(Default)]
struct Shared {
    bindings: Mutex<Vec<Binding>>,
    listening: AtomicBool,
}

impl Shared {
    fn bindings(&self) -> MutexGuard<'_, Vec<Binding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn callback_for(&self, hotkey: &Hotkey) -> Option<HotkeyCallback> {
        self.bindings()
            .iter()
            .find(|b| b.hotkey == *hotkey)
            .map(|b| Arc::clone(&b.callback))
    }
}

// ---------------------------------------------------------------------------
// RdevHotkeyManager
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RdevHotkeyManager {
    shared: Arc<Shared>,
    /// Never joined: `rdev::listen` does not return.
    thread: Option<JoinHandle<()>>,
}

impl RdevHotkeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::Relaxed)
    }

    /// Canonical names of all registered hotkeys.
    pub fn registered(&self) -> Vec<String> {
        self.shared
            .bindings()
            .iter()
            .map(|b| b.hotkey.to_string())
            .collect()
    }

    fn spawn_listener(&self) -> Result<JoinHandle<()>, HotkeyError> {
        let shared = Arc::clone(&self.shared);

        std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut tracker = ChordTracker::new();
                let listener_shared = Arc::clone(&shared);
                let result = rdev::listen(move |event| {
                    dispatch_event(&listener_shared, &mut tracker, &event.event_type);
                });

                if let Err(e) = result {
                    log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
                    shared.listening.store(false, Ordering::Relaxed);
                }
            })
            .map_err(|e| HotkeyError::Listener(e.to_string()))
    }
}

/// Feed one key event to the tracker and fire the matching callback.
///
/// The tracker sees every event so modifier state stays correct even while
/// listening is paused.
fn dispatch_event(shared: &Shared, tracker: &mut ChordTracker, event: &rdev::EventType) {
    let Some(chord) = tracker.handle(event) else {
        return;
    };
    if !shared.listening.load(Ordering::Relaxed) {
        return;
    }

    // Clone out of the lock so a callback may (un)register hotkeys.
    if let Some(callback) = shared.callback_for(&chord) {
        log::debug!("hotkey: {chord} pressed");
        callback();
    }
}

impl HotkeyManager for RdevHotkeyManager {
    fn register(&mut self, hotkey: &str, callback: HotkeyCallback) -> Result<(), HotkeyError> {
        let hotkey: Hotkey = hotkey.parse()?;
        let mut bindings = self.shared.bindings();

        match bindings.iter_mut().find(|b| b.hotkey == hotkey) {
            Some(existing) => {
                log::info!("hotkey: replacing binding for {hotkey}");
                existing.callback = callback;
            }
            None => {
                log::info!("hotkey: registered {hotkey}");
                bindings.push(Binding { hotkey, callback });
            }
        }
        Ok(())
    }

    fn unregister(&mut self, hotkey: &str) -> bool {
        let Ok(hotkey) = hotkey.parse::<Hotkey>() else {
            return false;
        };
        let mut bindings = self.shared.bindings();
        let before = bindings.len();
        bindings.retain(|b| b.hotkey != hotkey);
        before != bindings.len()
    }

    fn start_listening(&mut self) -> Result<(), HotkeyError> {
        if self.thread.is_none() {
            self.thread = Some(self.spawn_listener()?);
        }
        self.shared.listening.store(true, Ordering::Relaxed);
        log::info!("hotkey: listening for {} hotkey(s)", self.shared.bindings().len());
        Ok(())
    }

    fn stop_listening(&mut self) {
        if self.shared.listening.swap(false, Ordering::Relaxed) {
            log::info!("hotkey: stopped listening");
        }
    }
}

impl Drop for RdevHotkeyManager {
    fn drop(&mut self) {
        self.shared.listening.store(false, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use rdev::{EventType, Key};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, HotkeyCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn press_ctrl_alt_t(manager: &RdevHotkeyManager, tracker: &mut ChordTracker) {
        for event in [
            EventType::KeyPress(Key::ControlLeft),
            EventType::KeyPress(Key::Alt),
            EventType::KeyPress(Key::KeyT),
            EventType::KeyRelease(Key::KeyT),
            EventType::KeyRelease(Key::Alt),
            EventType::KeyRelease(Key::ControlLeft),
        ] {
            dispatch_event(&manager.shared, tracker, &event);
        }
    }

    /// Mark as listening without spawning the OS listener.
    fn listening(manager: &RdevHotkeyManager) {
        manager.shared.listening.store(true, Ordering::Relaxed);
    }

    #[test]
    fn register_rejects_invalid_hotkey() {
        let mut manager = RdevHotkeyManager::new();
        let (_, cb) = counter();
        assert!(manager.register("ctrl+", cb).is_err());
        assert!(manager.registered().is_empty());
    }

    #[test]
    fn registered_hotkey_fires_callback() {
        let mut manager = RdevHotkeyManager::new();
        let (count, cb) = counter();
        manager.register("ctrl+alt+t", cb).unwrap();
        listening(&manager);

        let mut tracker = ChordTracker::new();
        press_ctrl_alt_t(&manager, &mut tracker);
        press_ctrl_alt_t(&manager, &mut tracker);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn nothing_fires_while_not_listening() {
        let mut manager = RdevHotkeyManager::new();
        let (count, cb) = counter();
        manager.register("ctrl+alt+t", cb).unwrap();

        let mut tracker = ChordTracker::new();
        press_ctrl_alt_t(&manager, &mut tracker);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        listening(&manager);
        manager.stop_listening();
        assert!(!manager.is_listening());
        press_ctrl_alt_t(&manager, &mut tracker);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let mut manager = RdevHotkeyManager::new();
        let (count, cb) = counter();
        manager.register("alt+t", cb).unwrap();
        listening(&manager);

        let mut tracker = ChordTracker::new();
        press_ctrl_alt_t(&manager, &mut tracker);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registering_again_replaces_callback() {
        let mut manager = RdevHotkeyManager::new();
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        manager.register("ctrl+alt+t", cb1).unwrap();
        manager.register("Alt+Ctrl+T", cb2).unwrap();
        assert_eq!(manager.registered(), vec!["ctrl+alt+t".to_string()]);
        listening(&manager);

        press_ctrl_alt_t(&manager, &mut ChordTracker::new());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_removes_binding() {
        let mut manager = RdevHotkeyManager::new();
        let (count, cb) = counter();
        manager.register("ctrl+alt+t", cb).unwrap();

        assert!(manager.unregister("CTRL+ALT+T"));
        assert!(!manager.unregister("ctrl+alt+t"));
        assert!(!manager.unregister("not a hotkey"));

        listening(&manager);
        press_ctrl_alt_t(&manager, &mut ChordTracker::new());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn manager_is_usable_as_trait_object() {
        let mut manager: Box<dyn HotkeyManager> = Box::new(RdevHotkeyManager::new());
        let (_, cb) = counter();
        manager.register("f9", cb).unwrap();
        manager.stop_listening();
    }
}
