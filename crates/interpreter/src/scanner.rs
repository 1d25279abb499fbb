//! Quote and escape aware bracket balancing.

/// Incremental balance tracker for a `{`-opened span.
///
/// State survives across chunk boundaries so a span may be split anywhere,
/// including between a backslash and the character it escapes.
#[derive(Debug, Default, Clone)]
pub struct BalanceScanner {
    /// Expected closer for each open bracket, innermost last.
    open: Vec<u8>,
    in_string: bool,
    escaped: bool,
}

impl BalanceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn in_string(&self) -> bool {
        self.in_string
    }

    /// Advance by one byte. Returns `true` when the outermost bracket closes.
    pub fn step(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return false;
        }

        match byte {
            b'"' => {
                self.in_string = true;
                false
            }
            b'{' => {
                self.open.push(b'}');
                false
            }
            b'[' => {
                self.open.push(b']');
                false
            }
            // A closer that does not match the innermost opener is ordinary text.
            b'}' | b']' if self.open.last() == Some(&byte) => {
                self.open.pop();
                self.open.is_empty()
            }
            _ => false,
        }
    }
}

/// Byte index of the bracket closing the one at the start of `s`.
pub fn balanced_end(s: &str) -> Option<usize> {
    let first = *s.as_bytes().first()?;
    if first != b'{' && first != b'[' {
        return None;
    }
    let mut scanner = BalanceScanner::new();
    s.bytes().position(|b| scanner.step(b))
}
