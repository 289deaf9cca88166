mod support;

use frameload_core::{
    Effect, FrameLoader, JobEvent, LoadState, Navigation, OpenOptions, Outcome, UiEventKind,
};
use pretty_assertions::assert_eq;
use support::{
    init_logging, open_parsing, started_jobs, terminal_events, ui_kinds, FramesetFixture,
};

/// Frameset fixture with every document finished and the root completed.
fn completed_frameset() -> FramesetFixture {
    let mut fixture = FramesetFixture::new();
    for job in [fixture.a_job, fixture.b_job, fixture.root_job] {
        fixture.loader.on_job_event(job, JobEvent::Finished);
    }
    let effects = fixture.loader.take_effects();
    assert_eq!(
        terminal_events(&effects, fixture.root),
        vec![UiEventKind::Completed]
    );
    fixture
}

#[test]
fn reload_refetches_the_root_bypassing_caches() {
    init_logging();
    let mut loader = FrameLoader::default();
    let root = loader.root();
    let job = open_parsing(&mut loader, root, "http://example/");
    loader.on_job_event(job, JobEvent::Finished);
    loader.take_effects();

    let reloaded = loader.reload().unwrap().expect("a document was loaded");
    let effects = loader.take_effects();

    assert_eq!(
        effects[0],
        Effect::StartFetch {
            job_id: reloaded,
            url: "http://example/".to_string(),
            reload: true,
        }
    );
    assert!(loader.frame(root).unwrap().reload);
    assert!(loader.job(reloaded).unwrap().reload());
}

#[test]
fn reload_before_any_load_does_nothing() {
    init_logging();
    let mut loader = FrameLoader::default();

    assert_eq!(loader.reload(), Ok(None));
    assert!(loader.take_effects().is_empty());
}

#[test]
fn reload_discards_the_frameset() {
    init_logging();
    let mut fixture = completed_frameset();

    fixture.loader.reload().unwrap();
    let effects = fixture.loader.take_effects();

    assert_eq!(started_jobs(&effects).len(), 1);
    assert!(fixture.loader.children(fixture.root).is_empty());
    assert_eq!(fixture.loader.frame_count(), 1);
}

#[test]
fn reload_frames_keeps_the_frameset_document() {
    init_logging();
    let mut fixture = completed_frameset();
    let loader = &mut fixture.loader;

    loader.reload_frames().unwrap();
    let effects = loader.take_effects();

    let urls: Vec<String> = started_jobs(&effects)
        .into_iter()
        .map(|(_, url)| url)
        .collect();
    assert_eq!(urls, vec!["http://example/a", "http://example/b"]);
    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, Effect::StartFetch { reload: false, .. })));
    assert_eq!(loader.children(fixture.root), &[fixture.a, fixture.b]);
    assert_eq!(loader.frame(fixture.root).unwrap().load, LoadState::Pending);
    assert_eq!(loader.frame(fixture.root).unwrap().generation, 2);
    assert_eq!(
        ui_kinds(&effects, fixture.root),
        vec![UiEventKind::Started("http://example/".to_string())]
    );
    assert!(terminal_events(&effects, fixture.a).is_empty());

    let a_job = loader.frame(fixture.a).unwrap().document_job.unwrap();
    let b_job = loader.frame(fixture.b).unwrap().document_job.unwrap();
    loader.on_job_event(a_job, JobEvent::Finished);
    assert!(terminal_events(&loader.take_effects(), fixture.root).is_empty());
    loader.on_job_event(b_job, JobEvent::Finished);
    let effects = loader.take_effects();
    assert_eq!(
        terminal_events(&effects, fixture.root),
        vec![UiEventKind::Completed]
    );
}

#[test]
fn reload_frames_descends_into_nested_framesets() {
    init_logging();
    let mut fixture = FramesetFixture::new();
    let loader = &mut fixture.loader;
    let deep = loader.add_child_frame(fixture.a, Some("deep")).unwrap();
    let deep_job = open_parsing(loader, deep, "http://example/deep");
    for job in [deep_job, fixture.a_job, fixture.b_job, fixture.root_job] {
        loader.on_job_event(job, JobEvent::Finished);
    }
    assert_eq!(
        loader.frame(fixture.root).unwrap().load,
        LoadState::Done(Outcome::Completed)
    );
    loader.take_effects();

    loader.reload_frames().unwrap();
    let urls: Vec<String> = started_jobs(&loader.take_effects())
        .into_iter()
        .map(|(_, url)| url)
        .collect();

    assert_eq!(urls, vec!["http://example/deep", "http://example/b"]);
    assert_eq!(loader.frame(fixture.a).unwrap().load, LoadState::Pending);
    assert_eq!(loader.children(fixture.a), &[deep]);
}

#[test]
fn reload_frames_without_frames_is_a_full_reload() {
    init_logging();
    let mut loader = FrameLoader::default();
    let root = loader.root();
    let job = open_parsing(&mut loader, root, "http://example/plain");
    loader.on_job_event(job, JobEvent::Finished);
    loader.take_effects();

    loader.reload_frames().unwrap();
    let effects = loader.take_effects();

    assert!(matches!(
        effects.first(),
        Some(Effect::StartFetch { url, reload: true, .. }) if url == "http://example/plain"
    ));
}

#[test]
fn navigating_a_child_after_completion_reports_again() {
    init_logging();
    let mut fixture = completed_frameset();
    let loader = &mut fixture.loader;

    let navigation = loader
        .navigate(fixture.b, Some("a"), "a2", OpenOptions::default())
        .unwrap();
    assert_eq!(navigation, Navigation::Opened(fixture.a));
    let effects = loader.take_effects();
    assert!(terminal_events(&effects, fixture.root).is_empty());
    assert_eq!(
        ui_kinds(&effects, fixture.root),
        vec![UiEventKind::Started("http://example/".to_string())]
    );
    let root = loader.frame(fixture.root).unwrap();
    assert_eq!(root.load, LoadState::Pending);
    assert_eq!(root.generation, 2);

    let job = loader.frame(fixture.a).unwrap().document_job.unwrap();
    loader.on_job_event(job, JobEvent::Finished);
    let effects = loader.take_effects();
    assert_eq!(
        terminal_events(&effects, fixture.root),
        vec![UiEventKind::Completed]
    );
    assert_eq!(loader.frame(fixture.a).unwrap().url, "http://example/a2");
}
