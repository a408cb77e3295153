use std::fs;
use std::path::PathBuf;

use console_core::{AppViewModel, DroppedFile, ListKind, ListView, Msg};

/// What a line typed at the console asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dispatch(Msg),
    Help,
    Quit,
    Nothing,
}

/// Interprets one input line. `#n` refers to the n-th entry of the
/// uploaded list as last rendered.
pub fn interpret(line: &str, view: &AppViewModel) -> Result<Action, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let msg = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(Action::Nothing),
        "help" | "?" => return Ok(Action::Help),
        "quit" | "exit" => return Ok(Action::Quit),
        "files" | "ls" => Msg::RefreshRequested(ListKind::Uploaded),
        "processed" | "ready" => Msg::RefreshRequested(ListKind::Processed),
        "upload" => {
            if rest.is_empty() {
                return Err("Usage: upload <path>... (quote paths with spaces)".to_string());
            }
            Msg::FilesDropped(dropped_files(split_args(rest)?.into_iter().map(PathBuf::from)))
        }
        "delete" | "rm" => Msg::DeleteClicked {
            filename: target(rest, &view.uploaded, "delete")?,
        },
        "process" => Msg::ProcessClicked {
            filename: target(rest, &view.uploaded, "process")?,
        },
        "y" | "yes" => Msg::ConfirmationAnswered(true),
        "n" | "no" => Msg::ConfirmationAnswered(false),
        "close" => Msg::MessageClosed,
        "ok" => Msg::AlertDismissed,
        other => return Err(format!("Unknown command '{other}'; type help")),
    };
    Ok(Action::Dispatch(msg))
}

/// Reads sizes from disk; unreadable paths keep `None` and are rejected
/// by validation.
pub fn dropped_files(paths: impl IntoIterator<Item = PathBuf>) -> Vec<DroppedFile> {
    paths
        .into_iter()
        .map(|path| {
            let size = fs::metadata(&path)
                .ok()
                .filter(|meta| meta.is_file())
                .map(|meta| meta.len());
            DroppedFile::new(path, size)
        })
        .collect()
}

/// Splits on whitespace; single or double quotes group a path that
/// contains spaces.
fn split_args(text: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_arg = false;

    for ch in text.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_arg = true;
            }
            None if ch.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(ch);
                in_arg = true;
            }
        }
    }
    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

fn target(rest: &str, list: &ListView, verb: &str) -> Result<String, String> {
    if rest.is_empty() {
        return Err(format!("Usage: {verb} <filename> | {verb} #<n>"));
    }
    let Some(index) = rest.strip_prefix('#') else {
        return Ok(rest.to_string());
    };
    let position: usize = index
        .parse()
        .map_err(|_| format!("'{rest}' is not a list position"))?;
    list.item(position)
        .and_then(|item| item.filename.clone())
        .ok_or_else(|| format!("No uploaded file at position {position}"))
}
