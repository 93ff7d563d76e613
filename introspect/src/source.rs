//! The input side of introspection.
//!
//! Anything that can describe a command tree implements [`CommandSource`]:
//! declarations loaded from files do, and with the `clap` feature so does
//! `clap::Command`.

use crate::declaration::{CommandDecl, ParamDecl};

/// A command tree node the [`Introspector`](crate::Introspector) can read.
pub trait CommandSource {
    /// Name of this command.
    fn command_name(&self) -> String;

    /// Help or description text.
    fn help_text(&self) -> Option<String>;

    /// Whether the command is hidden from users.
    fn is_hidden(&self) -> bool {
        false
    }

    /// Parameters in declaration order.
    fn parameters(&self) -> Vec<ParamDecl>;

    /// Direct subcommands in declaration order.
    fn child_commands(&self) -> Vec<&Self>;
}

impl CommandSource for CommandDecl {
    fn command_name(&self) -> String {
        self.name.clone()
    }

    fn help_text(&self) -> Option<String> {
        self.help.clone()
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn parameters(&self) -> Vec<ParamDecl> {
        self.params.clone()
    }

    fn child_commands(&self) -> Vec<&Self> {
        self.subcommands.iter().collect()
    }
}
