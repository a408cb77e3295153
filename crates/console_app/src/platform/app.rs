use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use console_core::{update, AppState, AppViewModel, ListKind, Msg};
use console_logging::{console_debug, console_info};

use super::cli::{Args, Command};
use super::effects::EffectRunner;
use super::input::{self, Action};
use super::ui::render;
use super::{config, logging};

/// Everything the main loop reacts to, in arrival order.
pub enum Inbox {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log_to.into());

    let mut config = config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbox>();
    let runner = EffectRunner::new(config.engine_config(), inbox_tx.clone())?;
    let mut console = Console {
        state: AppState::with_settings(config.upload_policy(), config.dismiss_after()),
        shown: AppViewModel::default(),
        runner,
    };

    let command = args.command.unwrap_or(Command::Console);
    let interactive = command == Command::Console;
    console_info!("Starting console_app: {:?}", command);

    spawn_input_reader(inbox_tx);
    if interactive {
        println!("Type help for a list of commands.");
    }
    for msg in initial_msgs(command) {
        console.dispatch(msg);
    }

    while interactive || !console.state.is_settled() {
        let Ok(item) = inbox_rx.recv() else {
            break;
        };
        match item {
            Inbox::Msg(msg) => console.dispatch(msg),
            Inbox::Line(line) => {
                if console.handle_line(&line) == Flow::Quit {
                    break;
                }
            }
            Inbox::InputClosed if interactive => break,
            Inbox::InputClosed => {
                // Nobody left to answer; treat a pending question as declined.
                if console.shown.confirmation.is_some() {
                    console.dispatch(Msg::ConfirmationAnswered(false));
                }
            }
        }
    }

    console_info!("Shutting down");
    console.runner.shutdown();
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Console {
    state: AppState,
    /// Last view printed; output is the difference to it.
    shown: AppViewModel,
    runner: EffectRunner,
}

impl Console {
    fn dispatch(&mut self, msg: Msg) {
        let listed = match &msg {
            Msg::FilesListed {
                kind,
                result: Ok(_),
            } => Some(*kind),
            _ => None,
        };

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        if !effects.is_empty() {
            console_debug!("Effects: {:?}", effects);
        }
        self.runner.enqueue(effects);

        if was_dirty || listed.is_some() {
            let view = self.state.view();
            let mut lines = Vec::new();
            if let Some(kind) = listed {
                let list = match kind {
                    ListKind::Uploaded => &view.uploaded,
                    ListKind::Processed => &view.processed,
                };
                lines.extend(render::render_list(kind, list));
            }
            lines.extend(render::render_changes(&self.shown, &view));
            print_lines(&lines);
            self.shown = view;
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        match input::interpret(line, &self.shown) {
            Ok(Action::Dispatch(msg)) => self.dispatch(msg),
            Ok(Action::Help) => print_lines(&render::help_lines()),
            Ok(Action::Quit) => return Flow::Quit,
            Ok(Action::Nothing) => {}
            Err(text) => print_lines(&[text]),
        }
        Flow::Continue
    }
}

fn initial_msgs(command: Command) -> Vec<Msg> {
    match command {
        Command::Console => vec![Msg::PageLoaded],
        Command::Files => vec![Msg::RefreshRequested(ListKind::Uploaded)],
        Command::Processed => vec![Msg::RefreshRequested(ListKind::Processed)],
        Command::Upload { paths } => vec![Msg::FilesDropped(input::dropped_files(paths))],
        Command::Delete { filename, yes } => {
            let mut msgs = vec![Msg::DeleteClicked { filename }];
            if yes {
                msgs.push(Msg::ConfirmationAnswered(true));
            }
            msgs
        }
        Command::Process { filename, yes } => {
            let mut msgs = vec![Msg::ProcessClicked { filename }];
            if yes {
                msgs.push(Msg::ConfirmationAnswered(true));
            }
            msgs
        }
    }
}

fn spawn_input_reader(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if inbox.send(Inbox::Line(line)).is_err() {
                return;
            }
        }
        let _ = inbox.send(Inbox::InputClosed);
    });
}

fn print_lines(lines: &[String]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn confirmed_one_shot_commands_answer_the_question() {
        let msgs = initial_msgs(Command::Delete {
            filename: "a.mkv".to_string(),
            yes: true,
        });
        assert_eq!(
            msgs,
            vec![
                Msg::DeleteClicked {
                    filename: "a.mkv".to_string()
                },
                Msg::ConfirmationAnswered(true),
            ]
        );

        let msgs = initial_msgs(Command::Process {
            filename: "a.mkv".to_string(),
            yes: false,
        });
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn one_shot_upload_drops_given_paths() {
        let msgs = initial_msgs(Command::Upload {
            paths: vec![PathBuf::from("/nonexistent/clip.ts")],
        });
        let [Msg::FilesDropped(files)] = msgs.as_slice() else {
            panic!("expected a single drop");
        };
        assert_eq!(files[0].name, "clip.ts");
        assert_eq!(files[0].size, None);
    }
}
