/// Cursor over an immutable token slice.
///
/// Specs consume from the front by advancing the cursor; the slice itself is never
/// modified, so a failed parse leaves the caller's tokens untouched.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    items: &'a [String],
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(items: &'a [String]) -> Self {
        Self { items, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.items.get(self.pos).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.items.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Everything not yet consumed.
    pub fn remaining(&self) -> &'a [String] {
        &self.items[self.pos.min(self.items.len())..]
    }

    /// Consume everything left.
    pub fn take_rest(&mut self) -> &'a [String] {
        let rest = self.remaining();
        self.pos = self.items.len();
        rest
    }

    /// Move every leading token that does not start with `-` into `out`.
    pub(crate) fn sweep_bare_into(&mut self, out: &mut Vec<String>) {
        while let Some(tok) = self.peek() {
            if tok.starts_with('-') {
                break;
            }
            out.push(tok.to_string());
            self.pos += 1;
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }
}

/// A token that stops variable-arity collection: starts with `-` and is not a lone `-`.
pub fn looks_like_option(tok: &str) -> bool {
    tok.starts_with('-') && tok != "-"
}

/// A token that the parser treats as a named-option spelling (`--` is a separator).
pub fn is_option_spelling(tok: &str) -> bool {
    looks_like_option(tok) && tok != "--"
}
