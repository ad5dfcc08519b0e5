//! Window event any view can fire to ask for the company selector.

use gloo::events::EventListener;

pub const OPEN_COMPANY_SELECTOR: &str = "open-company-selector";

/// Dispatch the payload-less `open-company-selector` event on `window`.
pub fn open_company_selector() {
    let Some(window) = web_sys::window() else {
        return;
    };
    match web_sys::CustomEvent::new(OPEN_COMPANY_SELECTOR) {
        Ok(event) => {
            if let Err(err) = window.dispatch_event(&event) {
                tracing::debug!(error = ?err, "selector event dispatch failed");
            }
        }
        Err(err) => tracing::debug!(error = ?err, "could not build selector event"),
    }
}

/// Listen for the selector event until the returned guard is dropped.
pub fn on_open_company_selector(mut handler: impl FnMut() + 'static) -> Option<EventListener> {
    let window = web_sys::window()?;
    Some(EventListener::new(&window, OPEN_COMPANY_SELECTOR, move |_| {
        handler()
    }))
}
