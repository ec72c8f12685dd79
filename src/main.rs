use anyhow::{bail, Context};
use ifac_tracker_lib::{init_tracing, open, AddTopicPayload};
use std::path::PathBuf;

const USAGE: &str = "usage: ifac-tracker [show [QUERY] | toggle CODE ITEM | add CODE|- NAME [ITEM;ITEM...] | remove CODE]";

fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("IFAC_TRACKER_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("neither IFAC_TRACKER_HOME nor HOME is set")?;
    Ok(PathBuf::from(home).join(".ifac-tracker"))
}

/// Form-style input: `-` asks for a generated code, items are `;`-separated with blank entries
/// dropped.
fn add_payload(code: &str, name: &str, items: &str) -> AddTopicPayload {
    AddTopicPayload {
        code: (code != "-").then(|| code.to_string()),
        name: name.to_string(),
        items: parse_items(items),
        keywords: String::new(),
    }
}

fn parse_items(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, PartialEq)]
enum Command {
    Show(Option<String>),
    Toggle { code: String, item: String },
    Add(AddTopicPayload),
    Remove(String),
}

/// `None` for anything that does not match a usage form exactly, extra arguments included.
fn parse_command(args: &[&str]) -> Option<Command> {
    let command = match args {
        [] | ["show"] => Command::Show(None),
        ["show", query] => Command::Show(Some(query.to_string())),
        ["toggle", code, item] => Command::Toggle {
            code: code.to_string(),
            item: item.to_string(),
        },
        ["add", code, name] => Command::Add(add_payload(code, name, "")),
        ["add", code, name, items] => Command::Add(add_payload(code, name, items)),
        ["remove", code] => Command::Remove(code.to_string()),
        _ => return None,
    };
    Some(command)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let app_data_dir = data_dir()?;
    std::fs::create_dir_all(&app_data_dir)
        .with_context(|| format!("creating {}", app_data_dir.display()))?;
    init_tracing(&app_data_dir)?;

    let mut session = open(&app_data_dir).await?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let Some(command) = parse_command(&args) else {
        bail!(USAGE);
    };

    let snapshot = match command {
        Command::Show(None) => session.snapshot(),
        Command::Show(Some(query)) => session.set_query(&query),
        Command::Toggle { code, item } => session.toggle_item(&code, &item),
        Command::Add(payload) => session.add_or_replace_user_topic(payload).1,
        Command::Remove(code) => {
            if !session.remove_user_topic(&code) {
                bail!("no user topic with code {}", code);
            }
            session.snapshot()
        }
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{add_payload, parse_command, parse_items, Command};

    #[test]
    fn items_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(parse_items(" one ;; ;two"), vec!["one", "two"]);
        assert!(parse_items("").is_empty());
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(parse_command(&["add", "-", "Mine", "a;b", "stray"]).is_none());
        assert!(parse_command(&["toggle", "TC1", "a", "b"]).is_none());
        assert!(parse_command(&["show", "q", "more"]).is_none());
        assert!(parse_command(&["frobnicate"]).is_none());
    }

    #[test]
    fn add_forms_parse() {
        let Some(Command::Add(payload)) = parse_command(&["add", "-", "Mine", "a; b"]) else {
            panic!("expected add command");
        };
        assert_eq!(payload.code, None);
        assert_eq!(payload.items, vec!["a", "b"]);

        let Some(Command::Add(payload)) = parse_command(&["add", "TC9", "Mine"]) else {
            panic!("expected add command");
        };
        assert!(payload.items.is_empty());
        assert_eq!(parse_command(&[]), Some(Command::Show(None)));
    }

    #[test]
    fn dash_requests_generated_code() {
        assert_eq!(add_payload("-", "Mine", "a").code, None);
        assert_eq!(add_payload("TC9", "Mine", "a").code.as_deref(), Some("TC9"));
    }
}
