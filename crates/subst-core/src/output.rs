//! User-facing command output.
//!
//! Listing and status output goes to stdout through a [`Printer`] that
//! carries its indentation explicitly; diagnostics go through the `log`
//! macros instead.

/// Stdout writer with a fixed indentation carried by value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    indent: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A printer indented one level deeper than this one.
    pub fn indented(&self) -> Printer {
        Printer {
            indent: self.indent + 4,
        }
    }

    /// Print `message`, indenting every line of it.
    pub fn line(&self, message: &str) {
        if message.is_empty() {
            println!();
            return;
        }
        for line in message.lines() {
            println!("{:indent$}{}", "", line, indent = self.indent);
        }
    }
}

/// Column width needed to align `items` in a table.
pub fn pad_width<'a, I>(items: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    items.into_iter().map(str::len).max().unwrap_or(0)
}
