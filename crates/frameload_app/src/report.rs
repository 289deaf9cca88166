//! One-line descriptions of what the loader reports.

use frameload_core::{FrameLoader, FrameId, UiEvent, UiEventKind};

/// `frame#2 "left"` for named frames, `frame#2` otherwise.
pub(crate) fn frame_label(loader: &FrameLoader, frame: FrameId) -> String {
    match loader.frame(frame).and_then(|view| view.name) {
        Some(name) => format!("{frame} \"{name}\""),
        None => frame.to_string(),
    }
}

pub(crate) fn describe(loader: &FrameLoader, event: &UiEvent) -> String {
    let label = frame_label(loader, event.frame);
    match &event.kind {
        UiEventKind::Started(url) => format!("{label}: started {url}"),
        UiEventKind::Redirected(url) => format!("{label}: redirected to {url}"),
        UiEventKind::StatusText(text) => format!("{label}: {text}"),
        UiEventKind::Error { url, message } if url.is_empty() => {
            format!("{label}: error: {message}")
        }
        UiEventKind::Error { url, message } => format!("{label}: error loading {url}: {message}"),
        UiEventKind::FrameInserted { parent } => format!("{label}: inserted into {parent}"),
        UiEventKind::NewWindow(url) => format!("{label}: new window for {url}"),
        UiEventKind::Completed => format!("{label}: completed"),
        UiEventKind::Canceled => format!("{label}: canceled"),
    }
}

pub(crate) fn describe_resource(frame: &str, url: &str, bytes: usize) -> String {
    if bytes == 0 {
        format!("{frame}: {url} unavailable")
    } else {
        format!("{frame}: {url} ({bytes} bytes)")
    }
}
