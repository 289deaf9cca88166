use frameload_core::{
    update, Effect, FrameLoader, JobEvent, LoadError, Msg, OpenOptions, UiEvent, UiEventKind,
};

fn open(state: FrameLoader, url: &str) -> (FrameLoader, Vec<Effect>) {
    update(
        state,
        Msg::OpenUrl {
            url: url.to_string(),
            options: OpenOptions::default(),
        },
    )
}

fn started(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::StartFetch { job_id, .. } => Some(*job_id),
        _ => None,
    })
}

#[test]
fn page_load_through_messages() {
    let state = FrameLoader::default();
    let root = state.root();

    let (state, effects) = open(state, "http://example/");
    let job_id = started(&effects).unwrap();

    let (state, effects) = update(
        state,
        Msg::Job {
            job_id,
            event: JobEvent::Data(b"<frameset>".to_vec()),
        },
    );
    assert!(matches!(effects[0], Effect::BeginDocument { .. }));

    let (state, effects) = update(
        state,
        Msg::AddChildFrame {
            parent: root,
            name: Some("main".to_string()),
        },
    );
    let child = state.children(root)[0];
    assert!(effects.contains(&Effect::Notify(UiEvent {
        frame: child,
        kind: UiEventKind::FrameInserted { parent: root },
    })));

    let (state, _) = update(
        state,
        Msg::Job {
            job_id,
            event: JobEvent::Finished,
        },
    );
    let (state, effects) = update(
        state,
        Msg::Navigate {
            source: root,
            target: Some("main".to_string()),
            url: "http://example/main".to_string(),
            options: OpenOptions::default(),
        },
    );
    let child_job = started(&effects).unwrap();

    let (state, effects) = update(
        state,
        Msg::Job {
            job_id: child_job,
            event: JobEvent::Finished,
        },
    );
    assert!(effects.contains(&Effect::Notify(UiEvent {
        frame: root,
        kind: UiEventKind::Completed,
    })));
    assert!(state.is_fully_complete(root));
}

#[test]
fn malformed_url_is_reported_without_state_change() {
    let state = FrameLoader::default();
    let root = state.root();

    let (next, effects) = open(state.clone(), "no scheme here");

    assert_eq!(next, state);
    assert_eq!(effects.len(), 1);
    assert!(matches!(
        &effects[0],
        Effect::Notify(UiEvent {
            frame,
            kind: UiEventKind::Error { url, .. },
        }) if *frame == root && url == "no scheme here"
    ));
}

#[test]
fn child_frame_outside_parsing_is_reported_on_the_parent() {
    let state = FrameLoader::default();
    let root = state.root();

    let (_, effects) = update(
        state,
        Msg::AddChildFrame {
            parent: root,
            name: None,
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(UiEvent {
            frame: root,
            kind: UiEventKind::Error {
                url: String::new(),
                message: LoadError::NotParsing(root).to_string(),
            },
        })]
    );
}

#[test]
fn stop_message_cancels_the_root() {
    let state = FrameLoader::default();
    let root = state.root();
    let (state, effects) = open(state, "http://example/");
    let job_id = started(&effects).unwrap();

    let (state, effects) = update(state, Msg::Stop);

    assert!(effects.contains(&Effect::CancelFetch { job_id }));
    assert!(effects.contains(&Effect::Notify(UiEvent {
        frame: root,
        kind: UiEventKind::Canceled,
    })));
    assert_eq!(state.live_jobs(), 0);
}

#[test]
fn reload_message_before_any_load_is_silent() {
    let state = FrameLoader::default();

    let (next, effects) = update(state.clone(), Msg::Reload);

    assert_eq!(next, state);
    assert!(effects.is_empty());
}
