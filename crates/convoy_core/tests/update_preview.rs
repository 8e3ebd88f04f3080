use convoy_core::{
    update, BatchOptions, Effect, Msg, PreviewArtifact, QueueState, Tool,
};

fn qr_options(text: &str) -> BatchOptions {
    BatchOptions::Qr {
        text: text.to_string(),
        size: 256,
        margin: 4,
        dark: "#000000".into(),
        light: "#ffffff".into(),
    }
}

fn png_artifact(len: usize) -> PreviewArtifact {
    PreviewArtifact {
        media_type: "image/png".into(),
        bytes: vec![0u8; len],
    }
}

#[test]
fn each_edit_bumps_the_generation() {
    let state = QueueState::new(Tool::QrGenerate);
    let (state, effects) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options("hello"),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RequestPreview {
            generation: 1,
            options: qr_options("hello"),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options("hello world"),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RequestPreview {
            generation: 2,
            options: qr_options("hello world"),
        }]
    );
    assert_eq!(state.view().preview.unwrap().generation, 2);
}

#[test]
fn stale_preview_response_is_discarded() {
    let state = QueueState::new(Tool::QrGenerate);
    let (state, _) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options("first"),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options("second"),
        },
    );
    assert!(state.consume_dirty());

    // The slow response for generation 1 arrives after generation 2 was
    // requested; it must not overwrite the newer round.
    let (mut state, _) = update(
        state,
        Msg::PreviewReady {
            generation: 1,
            result: Ok(png_artifact(100)),
        },
    );
    let view = state.view();
    let preview = view.preview.as_ref().unwrap();
    assert!(preview.waiting);
    assert_eq!(preview.generation, 2);
    assert!(!state.consume_dirty());

    let (state, _) = update(
        state,
        Msg::PreviewReady {
            generation: 2,
            result: Ok(png_artifact(200)),
        },
    );
    let view = state.view();
    let preview = view.preview.as_ref().unwrap();
    assert!(!preview.waiting);
    assert_eq!(preview.byte_len, Some(200));
}

#[test]
fn preview_failure_is_reported_for_current_generation_only() {
    let state = QueueState::new(Tool::QrGenerate);
    let (state, _) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options("text"),
        },
    );
    let (state, _) = update(
        state,
        Msg::PreviewReady {
            generation: 1,
            result: Err("service unavailable".to_string()),
        },
    );

    let view = state.view();
    let preview = view.preview.as_ref().unwrap();
    assert_eq!(preview.error.as_deref(), Some("service unavailable"));
}

#[test]
fn clear_all_invalidates_pending_preview() {
    let state = QueueState::new(Tool::QrGenerate);
    let (state, _) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options("text"),
        },
    );
    let (state, _) = update(state, Msg::ClearAll);

    // The in-flight response for the cleared round is dropped on arrival.
    let (state, _) = update(
        state,
        Msg::PreviewReady {
            generation: 1,
            result: Ok(png_artifact(64)),
        },
    );
    assert!(state.view().preview.is_none());
}

#[test]
fn empty_preview_text_warns_without_a_request() {
    let state = QueueState::new(Tool::QrGenerate);
    let (state, effects) = update(
        state,
        Msg::PreviewEdited {
            options: qr_options(""),
        },
    );

    assert!(state.view().preview.is_none());
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Notify { .. }));
}
