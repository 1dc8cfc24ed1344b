//! Code text emitter with sticky errors.
//!
//! A [`Printer`] accumulates generated lines at the current indentation.
//! The first error recorded with [`Printer::fail`] sticks: later lines are
//! dropped, but every block opened before the failure is still closed, so
//! traversal can run to completion and the partial output stays balanced.
//! [`Printer::finish`] hands the error back to the caller.

use crate::error::GeneratorError;
use crate::generator::IndentStyle;

/// Accumulating code sink.
#[derive(Debug)]
pub struct Printer {
    out: String,
    depth: usize,
    indent: IndentStyle,
    /// One entry per open block: whether its opening line was written.
    blocks: Vec<bool>,
    err: Option<GeneratorError>,
}

impl Printer {
    /// Create an empty printer.
    pub fn new(indent: IndentStyle) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            indent,
            blocks: Vec::new(),
            err: None,
        }
    }

    /// Whether no error has been recorded.
    pub fn ok(&self) -> bool {
        self.err.is_none()
    }

    /// Record an error. Only the first one is kept.
    pub fn fail(&mut self, err: GeneratorError) {
        if self.err.is_none() {
            tracing::trace!(error = %err, "printer error recorded");
            self.err = Some(err);
        }
    }

    /// The recorded error, if any.
    pub fn error(&self) -> Option<&GeneratorError> {
        self.err.as_ref()
    }

    fn push_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(self.indent.as_str());
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Emit one line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        if self.ok() {
            self.push_line(text.as_ref());
        }
    }

    /// Emit an empty line.
    pub fn blank(&mut self) {
        if self.ok() {
            self.out.push('\n');
        }
    }

    /// Emit a comment line.
    pub fn comment(&mut self, text: impl AsRef<str>) {
        if self.ok() {
            self.push_line(&format!("// {}", text.as_ref()));
        }
    }

    /// Emit `head {` and indent what follows.
    pub fn open(&mut self, head: impl AsRef<str>) {
        let written = self.ok();
        if written {
            let head = head.as_ref();
            if head.is_empty() {
                self.push_line("{");
            } else {
                self.push_line(&format!("{} {{", head));
            }
        }
        self.blocks.push(written);
        self.depth += 1;
    }

    /// Close the innermost block.
    pub fn close(&mut self) {
        self.close_with("");
    }

    /// Close the innermost block and emit `suffix` after the brace.
    pub fn close_with(&mut self, suffix: &str) {
        self.depth = self.depth.saturating_sub(1);
        if self.blocks.pop().unwrap_or(false) {
            self.push_line(&format!("}}{}", suffix));
        }
    }

    /// Close the innermost block and open another on the same line, as in
    /// `} else {`.
    pub fn reopen(&mut self, head: impl AsRef<str>) {
        let written = self.blocks.last().copied().unwrap_or(false);
        self.depth = self.depth.saturating_sub(1);
        if written && self.ok() {
            self.push_line(&format!("}} {} {{", head.as_ref()));
            self.depth += 1;
            return;
        }
        self.close_pending(written);
        self.depth += 1;
        self.blocks.push(false);
    }

    fn close_pending(&mut self, written: bool) {
        self.blocks.pop();
        if written {
            self.push_line("}");
        }
    }

    /// Declare a temporary initialized to its default value.
    pub fn declare(&mut self, name: &str, ty: &str) {
        self.line(format!("let mut {}: {} = Default::default();", name, ty));
    }

    /// Emit a statement whose expression returns a `Result`, propagating
    /// its error.
    pub fn read(&mut self, stmt: impl AsRef<str>) {
        self.line(format!("{}?;", stmt.as_ref()));
    }

    /// Emit a check that a decoded length equals a fixed count.
    pub fn array_check(&mut self, size_var: &str, expected: usize) {
        self.open(format!("if {} != {}", size_var, expected));
        self.line(format!(
            "return Err(msgp_rs::Error::ArraySize {{ expected: {}, found: {} }});",
            expected, size_var
        ));
        self.close();
    }

    /// Current indentation depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Return the generated text, or the first recorded error.
    pub fn finish(self) -> Result<String, GeneratorError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    /// Return the text generated so far, even after an error.
    pub fn into_partial(self) -> String {
        self.out
    }
}

/// Render bytes as a byte string literal such as `b"lat"`.
pub fn byte_str_literal(bytes: &[u8]) -> String {
    let escaped: String = bytes
        .iter()
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect();
    format!("b\"{}\"", escaped)
}

/// Render bytes as an array literal such as `[0x84, 0xa3, 0x6c]`.
pub fn byte_array_literal(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| format!("0x{:02x}", b)).collect();
    format!("[{}]", items.join(", "))
}
