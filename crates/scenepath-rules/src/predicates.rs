//! Named predicates that rule specifications can refer to.

use std::collections::HashMap;

use crate::pattern::Predicate;

/// Registry of predicates addressable by name from rule specifications.
#[derive(Debug, Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in predicates:
    ///
    /// - `number`: the token is an integer; captures it.
    /// - `year`: the token is a year between 1900 and 2099; captures it.
    /// - `date`: the token is a date written `YYYY-MM-DD`, `YYYY.MM.DD` or
    ///   `YYYY_MM_DD`; captures it normalized to `YYYY-MM-DD`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Predicate::new("number", |token: &str| {
            Ok(is_number(token).then(|| vec![token.to_string()]))
        }));
        registry.register(Predicate::new("year", |token: &str| {
            let ok = token.len() == 4
                && is_number(token)
                && (token.starts_with("19") || token.starts_with("20"));
            Ok(ok.then(|| vec![token.to_string()]))
        }));
        registry.register(Predicate::new("date", |token: &str| Ok(parse_date(token).map(|d| vec![d]))));
        registry
    }

    /// Register a predicate, replacing any previous one with the same name.
    pub fn register(&mut self, predicate: Predicate) {
        self.predicates.insert(predicate.name().to_string(), predicate);
    }

    /// Look up a predicate by name.
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    /// Registered predicate names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(token: &str) -> Option<String> {
    let bytes = token.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let sep = bytes[4];
    if !matches!(sep, b'-' | b'.' | b'_') || bytes[7] != sep {
        return None;
    }
    let (year, month, day) = (&token[0..4], &token[5..7], &token[8..10]);
    if !(is_number(year) && is_number(month) && is_number(day)) {
        return None;
    }
    let month_ok = matches!(month.parse::<u8>(), Ok(1..=12));
    let day_ok = matches!(day.parse::<u8>(), Ok(1..=31));
    (month_ok && day_ok).then(|| format!("{}-{}-{}", year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, token: &str) -> Option<Vec<String>> {
        PredicateRegistry::with_builtins()
            .get(name)
            .unwrap()
            .call(token)
            .unwrap()
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            PredicateRegistry::with_builtins().names(),
            vec!["date", "number", "year"]
        );
    }

    #[test]
    fn test_number() {
        assert_eq!(call("number", "0042"), Some(vec!["0042".to_string()]));
        assert_eq!(call("number", "4a"), None);
        assert_eq!(call("number", ""), None);
    }

    #[test]
    fn test_year() {
        assert_eq!(call("year", "2021"), Some(vec!["2021".to_string()]));
        assert_eq!(call("year", "1850"), None);
        assert_eq!(call("year", "20210"), None);
    }

    #[test]
    fn test_date() {
        assert_eq!(call("date", "2021.03.04"), Some(vec!["2021-03-04".to_string()]));
        assert_eq!(call("date", "2021_12_31"), Some(vec!["2021-12-31".to_string()]));
        assert_eq!(call("date", "2021-13-01"), None);
        assert_eq!(call("date", "2021-03.04"), None);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = PredicateRegistry::with_builtins();
        registry.register(Predicate::new("number", |_: &str| Ok(None)));
        assert_eq!(registry.get("number").unwrap().call("1").unwrap(), None);
    }
}
