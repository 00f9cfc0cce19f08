//! Process arguments forwarded to the model runtime.
//!
//! The harness never interprets these. Models that want options read them
//! as HDL-style plus-args (`+seed=3`, `+trace`).

/// Verbatim argument list handed to [`SimModel::create`](crate::SimModel::create).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeArgs {
    args: Vec<String>,
}

impl RuntimeArgs {
    /// Wraps an argument list without inspecting it.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends more arguments after the existing ones.
    pub fn extend<I, S>(&mut self, more: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(more.into_iter().map(Into::into));
    }

    /// The arguments in order.
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    /// Looks up `+name=value`; the last occurrence wins.
    pub fn plusarg(&self, name: &str) -> Option<&str> {
        self.args.iter().rev().find_map(|arg| {
            let rest = arg.strip_prefix('+')?.strip_prefix(name)?;
            rest.strip_prefix('=')
        })
    }
}
