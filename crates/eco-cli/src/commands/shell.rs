use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{Cli, GlobalFlags};
use crate::commands::dispatch::dispatch;
use crate::context::AppContext;
use crate::ui;

/// Handle `ecosort shell`: read commands from stdin and run them against one
/// session, so results, history and the location fix carry across lines.
///
/// Global flags come from the shell invocation; per-line globals are ignored.
pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.in_shell = true;
    let interactive = ui::prefs().interactive;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if interactive {
            eprint!("ecosort> ");
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let words = match split_words(&line) {
            Ok(words) => words,
            Err(error) => {
                eprintln!("ecosort error: {error}");
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            Some(_) => {}
        }

        let cli = match Cli::try_parse_from(std::iter::once("ecosort".to_string()).chain(words)) {
            Ok(cli) => cli,
            Err(error) => {
                let _ = error.print();
                continue;
            }
        };
        if let Err(error) = dispatch(cli.command, ctx, flags).await {
            eprintln!("ecosort error: {error:#}");
        }
    }

    ctx.in_shell = false;
    Ok(())
}

/// Split a line on whitespace, honoring single and double quotes.
fn split_words(line: &str) -> anyhow::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        anyhow::bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::split_words;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            split_words("  recyclers --material  Glass ").expect("split"),
            vec!["recyclers", "--material", "Glass"]
        );
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            split_words(r#"pickup --address "12 Park Road" --notes 'ring twice'"#)
                .expect("split"),
            vec!["pickup", "--address", "12 Park Road", "--notes", "ring twice"]
        );
    }

    #[test]
    fn empty_quotes_are_an_empty_word() {
        assert_eq!(split_words(r#"ask """#).expect("split"), vec!["ask", ""]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(split_words("ask \"what about glass").is_err());
    }
}
