use convoy_core::{update, FileMeta, FileStatus, Msg, QueueState, Tool};

fn add_files(state: QueueState, names: &[(&str, u64)]) -> QueueState {
    let metas = names
        .iter()
        .map(|(name, size)| FileMeta::new(*name, *size))
        .collect();
    let (state, _effects) = update(state, Msg::FilesAdded(metas));
    state
}

#[test]
fn added_files_get_unique_ids_in_queue_order() {
    let state = QueueState::new(Tool::PdfCompress);
    let mut state = add_files(state, &[("a.pdf", 1024), ("b.pdf", 2048), ("c.pdf", 512)]);

    let view = state.view();
    assert_eq!(view.file_count, 3);
    let ids: Vec<_> = view.rows.iter().map(|row| row.file_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let names: Vec<_> = view.rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    assert!(view.rows.iter().all(|row| row.status == FileStatus::Pending));
    assert!(state.consume_dirty());
}

#[test]
fn ids_are_not_reused_after_removal() {
    let state = QueueState::new(Tool::PdfCompress);
    let state = add_files(state, &[("a.pdf", 1024), ("b.pdf", 1024)]);
    let (state, _effects) = update(state, Msg::FileRemoved { file_id: 2 });
    let state = add_files(state, &[("c.pdf", 1024)]);

    let ids: Vec<_> = state.view().rows.iter().map(|row| row.file_id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn remove_is_noop_for_unknown_id() {
    let state = QueueState::new(Tool::PdfCompress);
    let mut state = add_files(state, &[("a.pdf", 1024)]);
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::FileRemoved { file_id: 99 });
    assert_eq!(state.view().file_count, 1);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn removed_id_never_reappears() {
    let state = QueueState::new(Tool::PdfCompress);
    let state = add_files(state, &[("a.pdf", 1024), ("b.pdf", 1024), ("c.pdf", 1024)]);
    let (state, _effects) = update(state, Msg::FileRemoved { file_id: 2 });

    assert!(state.view().rows.iter().all(|row| row.file_id != 2));
}

#[test]
fn clear_all_empties_queue_and_batch_flag() {
    let state = QueueState::new(Tool::PdfCompress);
    let state = add_files(state, &[("a.pdf", 1024), ("b.pdf", 1024)]);
    let (state, _effects) = update(
        state,
        Msg::ConvertClicked {
            options: convoy_core::BatchOptions::Compress {
                level: convoy_core::CompressionLevel::Balanced,
            },
        },
    );
    assert!(state.batch_running());

    let (state, effects) = update(state, Msg::ClearAll);
    assert_eq!(state.view().file_count, 0);
    assert!(!state.batch_running());
    assert_eq!(effects, vec![convoy_core::Effect::CancelInFlight]);
}

#[test]
fn intake_rejects_wrong_extension_with_error_status() {
    let state = QueueState::new(Tool::PdfCompress);
    let state = add_files(state, &[("notes.txt", 1024), ("ok.pdf", 1024)]);

    let view = state.view();
    let bad = &view.rows[0];
    assert_eq!(bad.status, FileStatus::Error);
    assert_eq!(bad.error.as_deref(), Some("unsupported file type .txt"));
    assert!(bad.download_url.is_none());

    let good = &view.rows[1];
    assert_eq!(good.status, FileStatus::Pending);
    assert!(good.error.is_none());
}

#[test]
fn intake_rejects_oversized_file() {
    let state = QueueState::new(Tool::FontConvert);
    let state = add_files(state, &[("big.ttf", 51 * 1024 * 1024)]);

    let row = &state.view().rows[0];
    assert_eq!(row.status, FileStatus::Error);
    assert_eq!(row.error.as_deref(), Some("file exceeds the 50 MB limit"));
}

#[test]
fn intake_rejection_emits_warning_notice() {
    let state = QueueState::new(Tool::PdfCompress);
    let metas = vec![FileMeta::new("photo.png", 1024)];
    let (_state, effects) = update(state, Msg::FilesAdded(metas));

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        convoy_core::Effect::Notify { level, text } => {
            assert_eq!(*level, convoy_core::NoticeLevel::Warning);
            assert!(text.contains("photo.png"));
        }
        other => panic!("unexpected effect {other:?}"),
    }
}
