use console_core::{
    render_file_list, AudioStreamInfo, FileEntry, ItemAction, ListKind, Msg, VideoStreamInfo,
};
use pretty_assertions::assert_eq;

fn movie() -> FileEntry {
    FileEntry {
        filename: "movie.mkv".to_string(),
        size: "1.5 GB".to_string(),
        video_streams: Some(vec![VideoStreamInfo {
            codec: Some("h264".to_string()),
            resolution: Some("1920x1080".to_string()),
            fps: Some("23.98 fps".to_string()),
        }]),
        audio_streams: Some(vec![
            AudioStreamInfo {
                codec: Some("aac".to_string()),
                language: Some("eng".to_string()),
            },
            AudioStreamInfo {
                codec: Some("ac3".to_string()),
                language: None,
            },
        ]),
    }
}

#[test]
fn empty_lists_render_single_placeholder_without_actions() {
    for (kind, label) in [
        (ListKind::Uploaded, "No files uploaded yet"),
        (ListKind::Processed, "No processed files yet"),
    ] {
        let view = render_file_list(kind, &[]);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].label, label);
        assert_eq!(view.items[0].filename, None);
        assert_eq!(view.items[0].details, None);
        assert_eq!(view.action_count(), 0);
    }
}

#[test]
fn stream_details_are_numbered_per_kind() {
    let view = render_file_list(ListKind::Uploaded, &[movie()]);
    let item = view.item(1).expect("first item");

    assert_eq!(item.label, "movie.mkv (1.5 GB)");
    assert_eq!(
        item.details.clone().unwrap(),
        vec![
            "Video Stream 1: H264, Resolution: 1920x1080, FPS: 23.98 fps".to_string(),
            "Audio Stream 1: AAC, Language: ENG".to_string(),
            "Audio Stream 2: AC3, Language: UNKNOWN".to_string(),
        ]
    );
    assert_eq!(item.actions, vec![ItemAction::Process, ItemAction::Delete]);
    assert_eq!(
        ItemAction::Delete.msg("movie.mkv"),
        Msg::DeleteClicked {
            filename: "movie.mkv".to_string()
        }
    );
}

#[test]
fn missing_streams_render_no_detail_list() {
    let plain = FileEntry::new("notes.ts", "10 KB");
    let view = render_file_list(ListKind::Processed, &[plain]);

    assert_eq!(view.items[0].details, None);
    assert!(view.items[0].actions.is_empty());
}

#[test]
fn present_but_empty_streams_render_empty_detail_list() {
    let entry = FileEntry {
        video_streams: Some(Vec::new()),
        ..FileEntry::new("blank.mp4", "0 B")
    };
    let view = render_file_list(ListKind::Uploaded, &[entry]);

    assert_eq!(view.items[0].details, Some(Vec::new()));
}

#[test]
fn rendering_is_idempotent() {
    let files = vec![movie(), FileEntry::new("b.ts", "2 MB")];
    assert_eq!(
        render_file_list(ListKind::Uploaded, &files),
        render_file_list(ListKind::Uploaded, &files)
    );
    assert_eq!(render_file_list(ListKind::Uploaded, &files).item(3), None);
}
