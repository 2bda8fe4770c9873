//! Line commands read by the headless shell.

use crate::error::ShellError;

/// One reader action, or a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `goto <path[#fragment]>`: route change.
    Goto(String),
    /// `select <id>`: menu click.
    Select(String),
    /// `transitioned`: the fly-out animation finished.
    Transitioned,
    /// `visible <id[,id...]>`: these sections intersect the active band;
    /// every other registered section does not.
    Visible(Vec<String>),
    /// `scroll <id>`: imperative scroll.
    Scroll(String),
    Dock,
    Undock,
    /// `motion reduce|allow`.
    Motion { reduced: bool },
    /// `forget`: clear persisted preferences so the next load replays the
    /// intro.
    Forget,
    Status,
    Quit,
}

impl ShellCommand {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Command` for an unknown verb or a missing
    /// argument.
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));
        let argument = rest.split_whitespace().next();
        let required = |usage: &str| {
            argument
                .map(str::to_owned)
                .ok_or_else(|| ShellError::Command(format!("usage: {usage}")))
        };

        match verb {
            "goto" => Ok(Self::Goto(required("goto <path[#fragment]>")?)),
            "select" => Ok(Self::Select(required("select <id>")?)),
            "transitioned" => Ok(Self::Transitioned),
            "visible" => Ok(Self::Visible(
                rest.split(|c: char| c == ',' || c.is_whitespace())
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_owned)
                    .collect(),
            )),
            "scroll" => Ok(Self::Scroll(required("scroll <id>")?)),
            "dock" => Ok(Self::Dock),
            "undock" => Ok(Self::Undock),
            "motion" => match argument {
                Some("reduce") => Ok(Self::Motion { reduced: true }),
                Some("allow") => Ok(Self::Motion { reduced: false }),
                _ => Err(ShellError::Command("usage: motion reduce|allow".to_owned())),
            },
            "forget" => Ok(Self::Forget),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ShellError::Command(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            ShellCommand::parse("goto /guide#setup").unwrap(),
            ShellCommand::Goto("/guide#setup".to_owned())
        );
        assert_eq!(
            ShellCommand::parse("  select overview ").unwrap(),
            ShellCommand::Select("overview".to_owned())
        );
        assert_eq!(
            ShellCommand::parse("motion reduce").unwrap(),
            ShellCommand::Motion { reduced: true }
        );
    }

    #[test]
    fn test_visible_splits_ids_and_allows_none() {
        assert_eq!(
            ShellCommand::parse("visible b, c").unwrap(),
            ShellCommand::Visible(vec!["b".to_owned(), "c".to_owned()])
        );
        assert_eq!(
            ShellCommand::parse("visible b,c").unwrap(),
            ShellCommand::Visible(vec!["b".to_owned(), "c".to_owned()])
        );
        assert_eq!(
            ShellCommand::parse("visible").unwrap(),
            ShellCommand::Visible(Vec::new())
        );
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        match ShellCommand::parse("select") {
            Err(ShellError::Command(message)) => assert_eq!(message, "usage: select <id>"),
            other => panic!("expected Command error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_verb_is_rejected() {
        assert!(matches!(
            ShellCommand::parse("fly"),
            Err(ShellError::Command(verb)) if verb == "fly"
        ));
    }
}
