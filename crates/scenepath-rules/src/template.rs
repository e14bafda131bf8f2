//! Positional placeholder substitution for field templates.

/// Strings captured by a matched rule, indexable as `#0`, `#1`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<String>);

impl Captures {
    /// Wrap an ordered list of captured values.
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Captured value at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Number of captured values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate captured values in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Append the captures of the next pattern position.
    pub fn extend(&mut self, values: Vec<String>) {
        self.0.extend(values);
    }

    /// Substitute `#N` placeholders with captured values.
    ///
    /// Each placeholder consumes the longest run of digits after `#`, so
    /// `#10` is never read as `#1` followed by `0`. Placeholders whose index
    /// is out of range are left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use scenepath_rules::Captures;
    ///
    /// let caps = Captures::new(vec!["Studio".into(), "Title".into()]);
    /// assert_eq!(caps.substitute("#1 by #0"), "Title by Studio");
    /// assert_eq!(caps.substitute("#5"), "#5");
    /// ```
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('#') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();

            let value = after[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.get(index));

            match value {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[pos..pos + 1 + digits]),
            }
            rest = &after[digits..];
        }

        out.push_str(rest);
        out
    }
}

impl From<Vec<String>> for Captures {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}
