//! Command tokens carried by message text.

/// Marker that starts a command.
pub const COMMAND_PREFIX: char = '/';

/// A command parsed from message text: `/name args...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Name without the prefix. Case-sensitive.
    pub name: String,
    /// Everything after the first run of whitespace, trimmed.
    pub args: String,
}

impl Command {
    /// Parses `text` as a command.
    ///
    /// The name is the token between the prefix and the first whitespace.
    /// Text without the prefix, or with nothing after it, is not a command.
    ///
    /// ```rust
    /// use courier_framework::Command;
    ///
    /// let cmd = Command::parse("/start hello world").unwrap();
    /// assert_eq!(cmd.name, "start");
    /// assert_eq!(cmd.args, "hello world");
    /// assert!(Command::parse("hello").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix(COMMAND_PREFIX)?;
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            args: args.to_string(),
        })
    }

    /// The arguments split on whitespace.
    pub fn arg_list(&self) -> Vec<&str> {
        self.args.split_whitespace().collect()
    }
}
