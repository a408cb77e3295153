use console_core::{AppViewModel, ListKind, ListView, TaskRowView, UploadRowView};

pub fn list_title(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Uploaded => "Uploaded files",
        ListKind::Processed => "Processed files",
    }
}

/// Numbered listing; the numbers are the `#n` positions accepted as input.
pub fn render_list(kind: ListKind, list: &ListView) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", list_title(kind))];
    for (index, item) in list.items.iter().enumerate() {
        if item.filename.is_none() {
            lines.push(format!("   {}", item.label));
            continue;
        }
        let mut line = format!("{:>3}. {}", index + 1, item.label);
        for action in &item.actions {
            line.push_str(&format!("  [{}]", action.label().to_lowercase()));
        }
        lines.push(line);
        for detail in item.details.iter().flatten() {
            lines.push(format!("       {detail}"));
        }
    }
    lines
}

/// Lines for everything that changed between two views, lists excluded.
pub fn render_changes(previous: &AppViewModel, view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    for upload in &view.uploads {
        let before = previous.uploads.iter().find(|row| row.name == upload.name);
        if progress_step_changed(before, upload) {
            lines.push(upload_line(upload));
        }
    }

    for task in &view.tasks {
        let before = previous.tasks.iter().find(|row| row.task_id == task.task_id);
        if before.map(|row| &row.phase) != Some(&task.phase) {
            lines.push(task_line(task));
        }
    }

    if let Some(notice) = &view.message {
        if previous.message.as_ref().map(|n| n.id) != Some(notice.id) {
            lines.push(format!("[{}] {}", notice.severity.class(), notice.text));
        }
    }

    if view.alert.is_some() && view.alert != previous.alert {
        for (index, text) in view.alert.iter().flat_map(|a| a.lines()).enumerate() {
            let prefix = if index == 0 { "!! " } else { "   " };
            lines.push(format!("{prefix}{text}"));
        }
        lines.push("   (type ok to acknowledge)".to_string());
    }

    if let Some(confirm) = &view.confirmation {
        if previous.confirmation.as_ref() != Some(confirm) {
            lines.push(format!("? {} [y/n]", confirm.prompt));
        }
    }

    lines
}

pub fn help_lines() -> Vec<String> {
    [
        "files | ls               list uploaded files",
        "processed | ready        list processed files",
        "upload <path>...         upload video files (.ts .mp4 .mkv); quote paths with spaces",
        "delete <name> | #<n>     delete an uploaded file",
        "process <name> | #<n>    queue an uploaded file for processing",
        "y | n                    answer the pending question",
        "close                    dismiss the current message",
        "ok                       acknowledge an alert",
        "quit                     leave the console",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

fn upload_line(upload: &UploadRowView) -> String {
    match upload.percent {
        Some(percent) => format!("   upload {}: {} ({percent}%)", upload.name, upload.progress),
        None => format!("   upload {}: starting", upload.name),
    }
}

fn task_line(task: &TaskRowView) -> String {
    format!("   task {} ({}): {}", task.task_id, task.filename, task.phase.label())
}

/// Progress is reported in steps of ten percent.
fn progress_step_changed(before: Option<&UploadRowView>, current: &UploadRowView) -> bool {
    match before {
        None => true,
        Some(before) => before.percent.map(|p| p / 10) != current.percent.map(|p| p / 10),
    }
}

#[cfg(test)]
mod tests {
    use console_core::{
        render_file_list, AudioStreamInfo, ConfirmView, FileEntry, Notice, Severity, TaskPhase,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn uploaded_list_is_numbered_with_actions_and_streams() {
        let file = FileEntry {
            audio_streams: Some(vec![AudioStreamInfo {
                codec: Some("aac".to_string()),
                language: Some("eng".to_string()),
            }]),
            ..FileEntry::new("movie.mkv", "1.5 GB")
        };
        let lines = render_list(ListKind::Uploaded, &render_file_list(ListKind::Uploaded, &[file]));

        assert_eq!(
            lines,
            vec![
                "== Uploaded files ==".to_string(),
                "  1. movie.mkv (1.5 GB)  [process]  [delete]".to_string(),
                "       Audio Stream 1: AAC, Language: ENG".to_string(),
            ]
        );
    }

    #[test]
    fn empty_list_shows_placeholder_without_number() {
        let lines = render_list(ListKind::Processed, &render_file_list(ListKind::Processed, &[]));
        assert_eq!(lines[1], "   No processed files yet");
    }

    #[test]
    fn only_changes_are_rendered() {
        let before = AppViewModel {
            message: Some(Notice {
                id: 1,
                text: "File has been deleted".to_string(),
                severity: Severity::Success,
            }),
            ..AppViewModel::default()
        };
        assert!(render_changes(&before, &before).is_empty());

        let after = AppViewModel {
            message: Some(Notice {
                id: 2,
                text: "Error deleting file: Not Found".to_string(),
                severity: Severity::Error,
            }),
            confirmation: Some(ConfirmView {
                prompt: "Are you sure you want to process a.mkv?".to_string(),
            }),
            tasks: vec![TaskRowView {
                task_id: "t1".to_string(),
                filename: "a.mkv".to_string(),
                phase: TaskPhase::Queued,
            }],
            ..AppViewModel::default()
        };
        assert_eq!(
            render_changes(&before, &after),
            vec![
                "   task t1 (a.mkv): queued".to_string(),
                "[error] Error deleting file: Not Found".to_string(),
                "? Are you sure you want to process a.mkv? [y/n]".to_string(),
            ]
        );
    }

    #[test]
    fn upload_progress_is_reported_in_steps() {
        let at = |sent| AppViewModel {
            uploads: vec![UploadRowView::new("clip.ts", sent, 1000)],
            ..AppViewModel::default()
        };
        assert!(render_changes(&at(110), &at(150)).is_empty());
        assert_eq!(render_changes(&at(150), &at(210)).len(), 1);
    }

    #[test]
    fn multi_line_alert_is_indented() {
        let view = AppViewModel {
            alert: Some(
                "File a.avi has an unsupported type\nFile b.txt has an unsupported type".to_string(),
            ),
            ..AppViewModel::default()
        };
        let lines = render_changes(&AppViewModel::default(), &view);
        assert_eq!(lines[0], "!! File a.avi has an unsupported type");
        assert_eq!(lines[1], "   File b.txt has an unsupported type");
        assert_eq!(lines.len(), 3);
    }
}
