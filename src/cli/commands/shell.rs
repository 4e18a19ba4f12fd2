//! Interactive labeling loop.
//!
//! Reads one command per line, routes it through [`Session::handle`] and
//! prints the resulting state. End of input behaves like `quit`, and an
//! I/O failure also runs the automatic export before it is reported, so
//! the session is saved however the loop ends.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::session::{CommandOutcome, Session, SessionCommand, SessionStatus};
use crate::sync::{ExportStats, FileOps};

const HELP: &str = "\
Commands:
  n, next          next image
  p, prev          previous image
  g, goto <n>      jump to image n
  <k>              toggle the k-th label
  t <label>        toggle a label by name
  e, export        write the table now
  s, status        show the current image
  h, help          show this help
  q, quit          export and exit";

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(SessionCommand),
    Help,
    Empty,
}

/// Parse a line typed at the prompt.
///
/// # Errors
///
/// Returns `InvalidArgument` for unknown commands or missing operands.
pub fn parse_line(line: &str) -> Result<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }

    if let Ok(key) = line.parse::<usize>() {
        return Ok(Input::Command(SessionCommand::ToggleKey(key)));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "n" | "next" => SessionCommand::Next,
        "p" | "prev" => SessionCommand::Prev,
        "e" | "export" => SessionCommand::Export,
        "s" | "status" => SessionCommand::Status,
        "q" | "quit" | "exit" => SessionCommand::Quit,
        "h" | "help" | "?" => return Ok(Input::Help),
        "g" | "goto" => {
            let position = rest.parse::<usize>().map_err(|_| {
                Error::InvalidArgument(format!("goto needs an image number, got '{rest}'"))
            })?;
            SessionCommand::Goto(position)
        }
        "t" | "toggle" => {
            if rest.is_empty() {
                return Err(Error::InvalidArgument("toggle needs a label name".to_string()));
            }
            SessionCommand::Toggle(rest.to_string())
        }
        other => {
            return Err(Error::InvalidArgument(format!(
                "unknown command '{other}' (type h for help)"
            )))
        }
    };
    Ok(Input::Command(command))
}

#[derive(Serialize)]
struct Event<'a> {
    event: &'a CommandOutcome,
    status: &'a SessionStatus,
}

/// Run the loop until `quit` or end of input.
///
/// Command failures are printed and the loop continues. Input lines that
/// are not valid UTF-8 are skipped. Returns the automatic export, if it
/// succeeded.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails. The
/// automatic export has run by then.
pub fn run<F, R, W>(
    session: &mut Session<F>,
    input: R,
    out: &mut W,
    json: bool,
) -> Result<Option<ExportStats>>
where
    F: FileOps,
    R: BufRead,
    W: Write,
{
    drive(session, input, out, json).inspect_err(|e| {
        warn!(error = %e, "Labeling loop stopped on an I/O error");
        session.export_on_termination();
    })
}

fn drive<F, R, W>(
    session: &mut Session<F>,
    input: R,
    out: &mut W,
    json: bool,
) -> Result<Option<ExportStats>>
where
    F: FileOps,
    R: BufRead,
    W: Write,
{
    if !json {
        print_status(out, &session.status())?;
        writeln!(out, "{}", "Type h for help.".dimmed())?;
    }

    let mut lines = input.lines();
    loop {
        if !json {
            write!(out, "> ")?;
            out.flush()?;
        }

        let line = match lines.next() {
            None => None,
            Some(Ok(line)) => Some(line),
            Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Skipping input line that is not valid UTF-8");
                print_error(out, &Error::InvalidArgument("input is not valid UTF-8".to_string()), json)?;
                continue;
            }
            Some(Err(e)) => return Err(e.into()),
        };

        let command = match line {
            None => SessionCommand::Quit,
            Some(line) => match parse_line(&line) {
                Ok(Input::Command(command)) => command,
                Ok(Input::Help) => {
                    if !json {
                        writeln!(out, "{HELP}")?;
                    }
                    continue;
                }
                Ok(Input::Empty) => continue,
                Err(e) => {
                    print_error(out, &e, json)?;
                    continue;
                }
            },
        };

        match session.handle(command) {
            Ok(outcome) => {
                let reported = report(out, &outcome, &session.status(), json);
                if let CommandOutcome::Ended { export } = outcome {
                    if let Err(e) = reported {
                        warn!(error = %e, "Could not report the automatic export");
                    }
                    return Ok(export);
                }
                reported?;
            }
            Err(e) => print_error(out, &e, json)?,
        }
    }
}

fn report<W: Write>(out: &mut W, outcome: &CommandOutcome, status: &SessionStatus, json: bool) -> Result<()> {
    if json {
        return print_event(out, outcome, status);
    }
    print_outcome(out, outcome)?;
    if matches!(
        outcome,
        CommandOutcome::Moved { .. } | CommandOutcome::Toggled { .. } | CommandOutcome::Status
    ) {
        print_status(out, status)?;
    }
    Ok(())
}

/// Run the loop over the process's stdin and stdout.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub fn run_stdio<F: FileOps>(session: &mut Session<F>, json: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    run(session, stdin.lock(), &mut stdout, json)?;
    Ok(())
}

fn print_event<W: Write>(out: &mut W, outcome: &CommandOutcome, status: &SessionStatus) -> Result<()> {
    let event = Event {
        event: outcome,
        status,
    };
    writeln!(out, "{}", serde_json::to_string(&event)?)?;
    Ok(())
}

fn print_outcome<W: Write>(out: &mut W, outcome: &CommandOutcome) -> Result<()> {
    match outcome {
        CommandOutcome::Moved { moved: false, .. } => {
            writeln!(out, "{}", "No more images in that direction.".dimmed())?;
        }
        CommandOutcome::Toggled { item, label, action } => {
            writeln!(out, "{action} {} on {item}", label.bold())?;
        }
        CommandOutcome::Exported(stats) => {
            writeln!(
                out,
                "Exported {} labeled images to {}",
                stats.rows,
                stats.path.display()
            )?;
        }
        CommandOutcome::Ended { export } => print_ended(out, export.as_ref())?,
        CommandOutcome::Moved { .. } | CommandOutcome::Status => {}
    }
    Ok(())
}

/// Print the current item with its label states.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_status<W: Write>(out: &mut W, status: &SessionStatus) -> Result<()> {
    writeln!(
        out,
        "{} {}",
        format!("[{}]", status.progress()).cyan(),
        status.item.bold()
    )?;
    writeln!(out, "  {}", status.path.display().to_string().dimmed())?;
    for label in &status.labels {
        let line = format!("  {:>2}  {}", label.key, label.label);
        if label.active {
            writeln!(out, "{} {}", line.green().bold(), "*".green())?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn print_ended<W: Write>(out: &mut W, export: Option<&ExportStats>) -> Result<()> {
    match export {
        Some(stats) => writeln!(
            out,
            "Saved {} labeled images to {}",
            stats.rows,
            stats.path.display()
        )?,
        None => writeln!(
            out,
            "{}",
            "Automatic export failed; labels from this session were not saved.".red()
        )?,
    }
    Ok(())
}

fn print_error<W: Write>(out: &mut W, e: &Error, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", e.to_structured_json())?;
    } else if let Some(hint) = e.hint() {
        writeln!(out, "{} {e}\n  Hint: {hint}", "Error:".red())?;
    } else {
        writeln!(out, "{} {e}", "Error:".red())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::model::SyncPolicy;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn session(dir: &TempDir, policy: SyncPolicy) -> Session {
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            fs::write(dir.path().join(name), b"img").unwrap();
        }
        Session::create(
            dir.path(),
            vec!["cat".to_string(), "dog".to_string()],
            policy,
            Settings::default(),
        )
        .unwrap()
    }

    fn play(session: &mut Session, script: &str, json: bool) -> (Option<ExportStats>, String) {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let export = run(session, Cursor::new(script.to_string()), &mut out, json).unwrap();
        (export, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  ").unwrap(), Input::Empty);
        assert_eq!(parse_line("2").unwrap(), Input::Command(SessionCommand::ToggleKey(2)));
        assert_eq!(parse_line("N").unwrap(), Input::Command(SessionCommand::Next));
        assert_eq!(parse_line("goto 4").unwrap(), Input::Command(SessionCommand::Goto(4)));
        assert_eq!(
            parse_line("t  red fox ").unwrap(),
            Input::Command(SessionCommand::Toggle("red fox".to_string()))
        );
        assert_eq!(parse_line("?").unwrap(), Input::Help);
        assert!(parse_line("g").is_err());
        assert!(parse_line("toggle").is_err());
        assert!(parse_line("jump").is_err());
    }

    #[test]
    fn test_session_script_exports_on_quit() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, SyncPolicy::RecordOnly);

        let (export, output) = play(&mut s, "1\n2\nn\nn\n2\nq\n", false);
        let stats = export.unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(
            fs::read_to_string(&stats.path).unwrap(),
            "item,cat,dog\na.jpg,1,1\nc.jpg,0,1\n"
        );
        assert!(output.contains("[image 3 of 3] c.jpg"));
        assert!(output.contains("Saved 2 labeled images"));
    }

    #[test]
    fn test_end_of_input_acts_as_quit() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, SyncPolicy::RecordOnly);

        let (export, _) = play(&mut s, "2\n", false);
        assert_eq!(export.unwrap().rows, 1);
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, SyncPolicy::RecordOnly);

        let (export, output) = play(&mut s, "t bird\n9\nfly\ng 7\n1\nq\n", false);
        assert!(output.contains("Error: Label not in catalog: bird"));
        assert!(output.contains("unknown command 'fly'"));
        assert_eq!(export.unwrap().rows, 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, SyncPolicy::RecordOnly);

        let mut script = b"1\n".to_vec();
        script.extend_from_slice(&[0xff, 0xfe, b'\n']);
        script.extend_from_slice(b"2\n");
        let mut out = Vec::new();
        let export = run(&mut s, Cursor::new(script), &mut out, false).unwrap();

        let stats = export.unwrap();
        assert_eq!(fs::read_to_string(&stats.path).unwrap(), "item,cat,dog\na.jpg,1,1\n");
        assert!(String::from_utf8(out).unwrap().contains("not valid UTF-8"));
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_output_failure_still_exports() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, SyncPolicy::RecordOnly);
        s.toggle("dog").unwrap();

        let result = run(&mut s, Cursor::new("1\n"), &mut ClosedOutput, false);
        assert!(matches!(result, Err(Error::Io(_))));

        let auto = Settings::default().auto_export_path(dir.path());
        assert_eq!(fs::read_to_string(auto).unwrap(), "item,cat,dog\na.jpg,0,1\n");
    }

    #[test]
    fn test_json_events() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, SyncPolicy::Duplicate);

        let (_, output) = play(&mut s, "t dog\ne\nq\n", true);
        let events: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["event"]["outcome"], "toggled");
        assert_eq!(events[0]["event"]["action"], "added");
        assert_eq!(events[0]["status"]["labels"][1]["active"], true);
        assert_eq!(events[1]["event"]["outcome"], "exported");
        assert_eq!(events[1]["event"]["rows"], 1);
        assert_eq!(events[2]["event"]["outcome"], "ended");
        assert!(dir.path().join("dog").join("a.jpg").is_file());
    }
}
