use tokio::io::{AsyncBufReadExt, BufReader};

/// Ask a yes/no question on stderr and read the answer from stdin.
///
/// An empty answer takes `default`. End of input counts as "no".
pub async fn confirm(question: &str, default: bool) -> anyhow::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    eprint!("{question} {hint} ");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(answer) = lines.next_line().await? else {
        return Ok(false);
    };
    Ok(parse_answer(&answer, default))
}

/// Resolve once the user presses Enter. Never resolves if stdin is closed.
pub async fn wait_for_enter() -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if lines.next_line().await?.is_none() {
        std::future::pending::<()>().await;
    }
    Ok(())
}

fn parse_answer(answer: &str, default: bool) -> bool {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_answer;

    #[test]
    fn answers_are_case_insensitive() {
        assert!(parse_answer("Y", false));
        assert!(parse_answer(" yes \n", false));
        assert!(!parse_answer("n", true));
        assert!(!parse_answer("retake", true));
    }

    #[test]
    fn empty_answer_takes_default() {
        assert!(parse_answer("", true));
        assert!(!parse_answer("   ", false));
    }
}
