mod common;

use common::{drag, ScratchDir};
use eframe_annotate::event::EventLog;
use eframe_annotate::export::BatchOutcome;
use eframe_annotate::{EditorContext, EditorEvent, ResizePreset, ToolKind};

#[test]
fn test_resize_keeps_aspect_ratio() {
    let dir = ScratchDir::new("aspect");
    let wide = dir.png("wide.png", 1600, 900);
    let small = dir.png("small.png", 600, 400);
    let mut editor = EditorContext::default();
    editor.load_many([&wide, &small]);

    assert!(editor.resize_active(ResizePreset::Small).unwrap());
    let entry = editor.active_entry().unwrap();
    assert_eq!(
        (entry.current_dimensions().width, entry.current_dimensions().height),
        (800, 450)
    );
    assert!(entry.is_resized());
    assert!(entry.reported_file_size() < entry.original_file_size());

    editor.select(&small).unwrap();
    assert!(!editor.resize_active(ResizePreset::Small).unwrap());
    assert_eq!(editor.active_entry().unwrap().current_dimensions().width, 600);
    assert!(!editor.can_undo());
}

#[test]
fn test_undo_resize_restores_original_size() {
    let dir = ScratchDir::new("undo_resize");
    let path = dir.png("wide.png", 1600, 900);
    let mut editor = EditorContext::default();
    editor.load(&path).unwrap();

    editor.resize_active(ResizePreset::Medium).unwrap();
    assert_eq!(editor.active_entry().unwrap().current_dimensions().width, 1200);
    editor.undo().unwrap();
    let entry = editor.active_entry().unwrap();
    assert_eq!(entry.current_dimensions().width, 1600);
    assert!(!entry.is_resized());
}

#[test]
fn test_save_reports_sizes() {
    let dir = ScratchDir::new("save");
    let path = dir.png("a.png", 300, 200);
    let mut editor = EditorContext::default();
    editor.load(&path).unwrap();
    editor.activate_tool(ToolKind::Pencil).unwrap();
    drag(&mut editor, (10.0, 10.0), (250.0, 150.0));

    let target = dir.path().join("out").join("a.jpg");
    let report = editor.save_active(&target, Some(70)).unwrap();
    assert_eq!(report.target, target);
    assert!(target.exists());
    assert_eq!(report.bytes_written, std::fs::metadata(&target).unwrap().len());
    assert!(report.original_size.is_some());
    // Saving never touches the undo stack
    assert_eq!(editor.active_entry().unwrap().history().undo_len(), 1);
}

#[test]
fn test_save_without_source_file_reports_new_size_only() {
    let dir = ScratchDir::new("missing_source");
    let path = dir.png("a.png", 64, 64);
    let mut editor = EditorContext::default();
    let events = EventLog::new();
    editor.subscribe(events.handler());
    editor.load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let target = dir.path().join("copy");
    let report = editor.save_active(&target, None).unwrap();
    assert_eq!(report.target.extension().unwrap(), "png");
    assert!(report.original_size.is_none());
    assert!(report.reduction_percent().is_none());
    assert!(events
        .drain()
        .iter()
        .any(|e| matches!(e, EditorEvent::Warning { path: Some(p), .. } if p == &path)));
}

#[test]
fn test_unsupported_extension_leaves_state_untouched() {
    let dir = ScratchDir::new("bad_ext");
    let path = dir.png("a.png", 64, 64);
    let mut editor = EditorContext::default();
    editor.load(&path).unwrap();

    let target = dir.path().join("a.xyz");
    let report = editor.save_active(&target, None).unwrap();
    // Unknown extensions are coerced rather than rejected
    assert_eq!(report.target.extension().unwrap(), "png");
    assert!(!editor.can_undo());
}

#[test]
fn test_batch_resize_then_export() {
    let dir = ScratchDir::new("batch");
    let wide = dir.png("wide.png", 1600, 900);
    let small = dir.png("small.png", 600, 400);
    let mut editor = EditorContext::default();
    let events = EventLog::new();
    editor.subscribe(events.handler());
    editor.load_many([&wide, &small]);

    let mut job = editor.batch_resize(ResizePreset::Small).unwrap();
    let items = editor.run_batch(&mut job);
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0].outcome, BatchOutcome::Resized { .. }));
    assert!(matches!(items[1].outcome, BatchOutcome::Unchanged));
    assert!(events
        .drain()
        .contains(&EditorEvent::BatchProgress { done: 2, total: 2 }));

    let out = dir.path().join("exported");
    let mut job = editor.batch_export(&out, Some(80)).unwrap();
    let items = editor.run_batch(&mut job);
    assert!(matches!(items[0].outcome, BatchOutcome::Exported(_)));
    assert!(matches!(items[1].outcome, BatchOutcome::Skipped));
    assert!(out.join("wide.png").exists());
    assert!(!out.join("small.png").exists());

    let exported = image::open(out.join("wide.png")).unwrap();
    assert_eq!((exported.width(), exported.height()), (800, 450));
}

#[test]
fn test_batch_failure_does_not_stop_the_rest() {
    let dir = ScratchDir::new("batch_fail");
    let a = dir.png("a.png", 1600, 900);
    let b = dir.png("b.png", 1600, 900);
    let mut editor = EditorContext::default();
    editor.load_many([&a, &b]);
    let mut job = editor.batch_resize(ResizePreset::Medium).unwrap();
    editor.run_batch(&mut job);

    // A file where the export directory should be
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();
    let mut job = editor.batch_export(&blocked, None).unwrap();
    let items = editor.run_batch(&mut job);
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|item| matches!(item.outcome, BatchOutcome::Failed(_))));
}
