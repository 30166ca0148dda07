use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui,
}

#[derive(Debug, Error)]
pub enum ParseInvocationError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// The only CLI surface is application launch, `--help` and `--version`.
pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, ParseInvocationError> {
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return Ok(CliInvocation::PrintHelp),
            "--version" | "-V" => return Ok(CliInvocation::PrintVersion),
            other => return Err(ParseInvocationError::UnknownArgument(other.to_string())),
        }
    }
    Ok(CliInvocation::Tui)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("kintai")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_launches_the_tui() {
        assert_eq!(parse_invocation(&args(&[])).expect("parse"), CliInvocation::Tui);
    }

    #[test]
    fn help_and_version_flags_are_recognized() {
        assert_eq!(
            parse_invocation(&args(&["--help"])).expect("parse"),
            CliInvocation::PrintHelp
        );
        assert_eq!(
            parse_invocation(&args(&["-V"])).expect("parse"),
            CliInvocation::PrintVersion
        );
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        let error = parse_invocation(&args(&["--bogus"])).expect_err("reject");
        assert!(error.to_string().contains("--bogus"));
    }
}
