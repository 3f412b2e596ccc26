#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseArgsResult<T> {
    Parsed(T),
    Usage(String),
}

/// Run `parser` over the command arguments, falling back to the usage text when
/// there are no arguments or the parser rejects them.
pub fn parse_args<'a, T>(
    args: &[&'a str],
    usage: &str,
    parser: impl FnOnce(&[&'a str]) -> Option<T>,
) -> ParseArgsResult<T> {
    if args.is_empty() {
        return ParseArgsResult::Usage(usage.to_string());
    }
    match parser(args) {
        Some(parsed) => ParseArgsResult::Parsed(parsed),
        None => ParseArgsResult::Usage(usage.to_string()),
    }
}
