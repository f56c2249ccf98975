//! Toast Notification Component
//!
//! Renders the toast list from global state. Sticky toasts stay until the
//! close button is pressed.

use leptos::*;

use superset_embedded::toast::{Toast, ToastKind};

use crate::state::global::use_global_state;

/// Toast notification container
#[component]
pub fn Toasts() -> impl IntoView {
    let state = use_global_state();
    let toasts = state.toasts;

    view! {
        <div class="toast-container" role="alert">
            <For
                each=move || toasts.with(|list| list.iter().cloned().collect::<Vec<_>>())
                key=|toast| toast.id
                children=move |toast: Toast| {
                    let state = state.clone();
                    view! { <ToastMessage toast=toast on_close=Callback::new(move |id| state.dismiss_toast(id)) /> }
                }
            />
        </div>
    }
}

/// Icon and class for a toast kind
fn toast_style(kind: ToastKind) -> (&'static str, &'static str) {
    match kind {
        ToastKind::Info => ("ℹ", "toast toast--info"),
        ToastKind::Success => ("✓", "toast toast--success"),
        ToastKind::Warning => ("⚠", "toast toast--warning"),
        ToastKind::Danger => ("✕", "toast toast--danger"),
    }
}

#[component]
fn ToastMessage(toast: Toast, on_close: Callback<u64>) -> impl IntoView {
    let (icon, class) = toast_style(toast.kind);
    let id = toast.id;

    view! {
        <div class=class>
            <span class="toast__icon">{icon}</span>
            <span class="toast__text">{toast.text}</span>
            <button class="toast__close" aria-label="Close" on:click=move |_| on_close.call(id)>
                "×"
            </button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danger_style() {
        assert_eq!(toast_style(ToastKind::Danger).1, "toast toast--danger");
    }
}
