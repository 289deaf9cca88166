use frameload_logging::loader_warn;

use crate::{Effect, FrameLoader, LoadError, Msg, UiEvent, UiEventKind};

/// Applies a message to the loader and returns the effects it produced.
///
/// Synchronous errors are reported to the UI as `UiEventKind::Error` on the
/// root frame; they never change loader state.
pub fn update(mut state: FrameLoader, msg: Msg) -> (FrameLoader, Vec<Effect>) {
    let result = match msg {
        Msg::OpenUrl { url, options } => state
            .open_url(state.root(), &url, options)
            .map(|_| ())
            .map_err(|err| (url, err)),
        Msg::Navigate {
            source,
            target,
            url,
            options,
        } => state
            .navigate(source, target.as_deref(), &url, options)
            .map(|_| ())
            .map_err(|err| (url, err)),
        Msg::Stop => state
            .stop(state.root())
            .map_err(|err| (String::new(), err)),
        Msg::StopFrame(frame) => state.stop(frame).map_err(|err| (String::new(), err)),
        Msg::Reload => state
            .reload()
            .map(|_| ())
            .map_err(|err| (String::new(), err)),
        Msg::ReloadFrames => state
            .reload_frames()
            .map_err(|err| (String::new(), err)),
        Msg::Job { job_id, event } => {
            state.on_job_event(job_id, event);
            Ok(())
        }
        Msg::AddChildFrame { parent, name } => state
            .add_child_frame(parent, name.as_deref())
            .map(|_| ())
            .map_err(|err| (String::new(), err)),
        Msg::RequestResource { frame, url } => state
            .request_resource(frame, &url)
            .map_err(|err| (url, err)),
        Msg::CancelResource { frame, url } => state
            .cancel_resource(frame, &url)
            .map(|_| ())
            .map_err(|err| (url, err)),
        Msg::SetSettings { frame, settings } => state
            .set_settings(frame, settings)
            .map_err(|err| (String::new(), err)),
        Msg::NoOp => Ok(()),
    };

    let mut effects = state.take_effects();
    if let Err((url, err)) = result {
        effects.push(report(&state, url, err));
    }
    (state, effects)
}

fn report(state: &FrameLoader, url: String, err: LoadError) -> Effect {
    loader_warn!("rejected request: {}", err);
    let frame = match err {
        LoadError::UnknownFrame(_) => state.root(),
        LoadError::NotParsing(frame) => frame,
        LoadError::MalformedUrl { .. } => state.root(),
    };
    Effect::Notify(UiEvent {
        frame,
        kind: UiEventKind::Error {
            url,
            message: err.to_string(),
        },
    })
}
