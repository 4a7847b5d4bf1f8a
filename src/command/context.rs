//! Per-command parse context
//!
//! Each command taking part in a parse (or a completion walk) gets a
//! context linked to its parent's, so the full command path is always
//! recoverable from the innermost one.

use crate::command::Command;
use std::rc::Rc;

/// Parse-time state for one command in the chain
#[derive(Debug, Clone)]
pub struct Context<'a> {
    /// The command this context belongs to
    command: &'a Command,

    /// Context of the command that dispatched into this one
    parent: Option<Rc<Context<'a>>>,

    /// Whether options may follow the first positional token
    allow_interspersed_args: bool,
}

impl<'a> Context<'a> {
    /// Context for the outermost command
    pub fn root(command: &'a Command) -> Self {
        Context {
            command,
            parent: None,
            allow_interspersed_args: command.interspersed_setting().unwrap_or(true),
        }
    }

    /// Context for a subcommand; inherits the interspersed setting unless
    /// the subcommand overrides it
    pub fn child(parent: &Rc<Context<'a>>, command: &'a Command) -> Self {
        Context {
            command,
            allow_interspersed_args: command
                .interspersed_setting()
                .unwrap_or(parent.allow_interspersed_args),
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn command(&self) -> &'a Command {
        self.command
    }

    pub fn parent(&self) -> Option<&Context<'a>> {
        self.parent.as_deref()
    }

    pub fn allow_interspersed_args(&self) -> bool {
        self.allow_interspersed_args
    }

    /// Whether this is the outermost context
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// This context followed by each ancestor, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = &Context<'a>> {
        std::iter::successors(Some(self), |ctx| ctx.parent())
    }

    /// Command names from the root down to this command
    pub fn command_path(&self) -> Vec<&'a str> {
        let mut path: Vec<&'a str> = self.ancestors().map(|ctx| ctx.command.name()).collect();
        path.reverse();
        path
    }

    /// Command names joined with spaces, as typed on the command line
    pub fn command_name_path(&self) -> String {
        self.command_path().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_defaults_to_interspersed() {
        let cmd = Command::new("tool");
        let ctx = Context::root(&cmd);
        assert!(ctx.allow_interspersed_args());
        assert!(ctx.is_root());
        assert_eq!(ctx.command_path(), vec!["tool"]);
    }

    #[test]
    fn test_child_inherits_setting() {
        let root = Command::new("tool").allow_interspersed_args(false);
        let sub = Command::new("sub");
        let root_ctx = Rc::new(Context::root(&root));
        let sub_ctx = Context::child(&root_ctx, &sub);
        assert!(!sub_ctx.allow_interspersed_args());
        assert_eq!(sub_ctx.command_path(), vec!["tool", "sub"]);
        assert_eq!(sub_ctx.command_name_path(), "tool sub");
    }

    #[test]
    fn test_child_overrides_setting() {
        let root = Command::new("tool").allow_interspersed_args(false);
        let sub = Command::new("sub").allow_interspersed_args(true);
        let root_ctx = Rc::new(Context::root(&root));
        let sub_ctx = Context::child(&root_ctx, &sub);
        assert!(sub_ctx.allow_interspersed_args());
        assert_eq!(sub_ctx.parent().map(|p| p.command().name()), Some("tool"));
    }
}
