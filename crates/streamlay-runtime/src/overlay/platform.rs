//! Platform-specific overlay window configuration.
//!
//! Overlay windows sit above normal windows (below the menu bar on macOS),
//! follow the user across virtual desktops and stay out of window switchers.
//! Click-through itself is toggled at runtime with
//! `set_ignore_cursor_events`, so nothing here makes a window transparent to
//! input.

use streamlay_core::{Bounds, Error};
use tauri::WebviewWindow;
use tracing::debug;

pub fn configure_overlay(window: &WebviewWindow) -> Result<(), Error> {
    debug!(window = window.label(), "configuring overlay window");

    #[cfg(target_os = "macos")]
    configure_overlay_macos(window)?;

    #[cfg(target_os = "windows")]
    configure_overlay_windows(window)?;

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let _ = window;

    Ok(())
}

#[cfg(target_os = "macos")]
fn configure_overlay_macos(window: &WebviewWindow) -> Result<(), Error> {
    use objc2::rc::Retained;
    use objc2_app_kit::{
        NSAccessibility, NSAccessibilitySystemDialogSubrole, NSMainMenuWindowLevel, NSWindow,
        NSWindowCollectionBehavior,
    };

    let ns_window_ptr = window
        .ns_window()
        .map_err(|e| Error::Window(format!("Failed to get NSWindow handle: {e}")))?;

    // SAFETY: the pointer stays valid while the window exists; retaining keeps
    // it alive for the calls below.
    let ns_window: Retained<NSWindow> = unsafe { Retained::retain(ns_window_ptr as *mut NSWindow) }
        .ok_or_else(|| Error::Window("NSWindow pointer was null".to_string()))?;

    ns_window.setLevel(NSMainMenuWindowLevel);
    ns_window.setHasShadow(false);
    ns_window.setCollectionBehavior(
        NSWindowCollectionBehavior::CanJoinAllSpaces
            | NSWindowCollectionBehavior::Stationary
            | NSWindowCollectionBehavior::IgnoresCycle
            | NSWindowCollectionBehavior::FullScreenAuxiliary
            | NSWindowCollectionBehavior::Transient,
    );
    unsafe {
        ns_window.setAccessibilitySubrole(Some(NSAccessibilitySystemDialogSubrole));
    }

    Ok(())
}

#[cfg(target_os = "windows")]
fn configure_overlay_windows(window: &WebviewWindow) -> Result<(), Error> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        GWL_EXSTYLE, GetWindowLongPtrW, HWND_TOPMOST, SWP_NOMOVE, SWP_NOSIZE, SetWindowLongPtrW,
        SetWindowPos, WS_EX_TOOLWINDOW,
    };

    let hwnd = window
        .hwnd()
        .map_err(|e| Error::Window(format!("Failed to get HWND handle: {e}")))?;

    unsafe {
        let hwnd = HWND(hwnd.0);

        // Keeps the overlay out of the taskbar and Alt+Tab.
        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE) | WS_EX_TOOLWINDOW.0 as isize;
        SetWindowLongPtrW(hwnd, GWL_EXSTYLE, ex_style);

        SetWindowPos(hwnd, Some(HWND_TOPMOST), 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)
            .map_err(|e| Error::Window(format!("Failed to raise window: {e}")))?;
    }

    Ok(())
}

/// Moves and resizes a window, then orders it front.
///
/// macOS constrains frames away from the menu bar, so the frame is set on
/// the `NSWindow` directly (top-left input is flipped to AppKit's bottom-left
/// origin) from the main thread.
#[cfg(target_os = "macos")]
pub fn place(window: &WebviewWindow, bounds: Bounds) -> Result<(), Error> {
    let ns_window_ptr = window
        .ns_window()
        .map_err(|e| Error::Window(format!("Failed to get NSWindow handle: {e}")))?;
    let ptr_addr = ns_window_ptr as usize;

    window
        .run_on_main_thread(move || {
            use objc2::MainThreadMarker;
            use objc2::rc::Retained;
            use objc2_app_kit::{NSScreen, NSWindow};
            use objc2_foundation::{NSPoint, NSRect, NSSize};

            // SAFETY: run_on_main_thread.
            let mtm = unsafe { MainThreadMarker::new_unchecked() };
            let Some(ns_window) = (unsafe { Retained::retain(ptr_addr as *mut NSWindow) }) else {
                tracing::warn!("failed to retain NSWindow pointer");
                return;
            };

            let screen_height = NSScreen::mainScreen(mtm)
                .map(|screen| screen.frame().size.height)
                .unwrap_or(1080.0);
            let (x, y) = (f64::from(bounds.x), f64::from(bounds.y));
            let (width, height) = (f64::from(bounds.width), f64::from(bounds.height));

            let frame = NSRect::new(
                NSPoint::new(x, screen_height - y - height),
                NSSize::new(width, height),
            );
            ns_window.setFrame_display(frame, false);
            ns_window.orderFront(None);
        })
        .map_err(|e| Error::Window(format!("Failed to run on main thread: {e}")))
}

#[cfg(not(target_os = "macos"))]
pub fn place(window: &WebviewWindow, bounds: Bounds) -> Result<(), Error> {
    use tauri::{LogicalPosition, LogicalSize};

    window
        .set_size(LogicalSize::new(bounds.width, bounds.height))
        .and_then(|()| window.set_position(LogicalPosition::new(bounds.x, bounds.y)))
        .and_then(|()| window.show())
        .map_err(|e| Error::Window(e.to_string()))
}
