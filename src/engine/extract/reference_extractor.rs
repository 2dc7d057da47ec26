use crate::engine::index::Index;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// `at com.foo.Bar.method(` captures `com.foo.Bar`.
static FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bat\s+([\w$-]+(?:\.[\w$-]+)*)\.[\w$<>-]+\(").unwrap()
});

/// `Caused by: com.foo.BarException:`
static CAUSED_BY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Caused by:\s*([\w$-]+(?:\.[\w$-]+)*):").unwrap());

/// `com.foo.BarException: message` at the start of a line.
static LEADING_THROWABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w$-]+(?:\.[\w$-]+)*(?:Exception|Error|Throwable)): ").unwrap()
});

/// Any lowercase-leading dotted token.
static DOTTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z][\w$-]*(?:\.[\w$-]+)+").unwrap());

const MAX_FALLBACK_LEN: usize = 200;

/// Finds the obfuscated class names a stack trace may reference.
///
/// Detection is deliberately loose; the index decides which candidates are
/// real classes.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    /// Candidate names from `lines` that are present in `index`.
    pub fn extract<S: AsRef<str>>(lines: &[S], index: &Index) -> HashSet<String> {
        let mut found = HashSet::new();
        for line in lines {
            for candidate in Self::candidates(line.as_ref()) {
                if index.contains(&candidate) {
                    found.insert(candidate);
                }
            }
        }
        found
    }

    /// Every name a single line could refer to, with enclosing classes,
    /// before filtering. Lines matching nothing yield an empty set.
    pub fn candidates(line: &str) -> HashSet<String> {
        let mut out = HashSet::new();

        for caps in FRAME.captures_iter(line) {
            add_with_enclosing(&mut out, &caps[1]);
        }
        for caps in CAUSED_BY.captures_iter(line) {
            add_with_enclosing(&mut out, &caps[1]);
        }
        if let Some(caps) = LEADING_THROWABLE.captures(line) {
            add_with_enclosing(&mut out, &caps[1]);
        }
        for m in DOTTED.find_iter(line) {
            if m.as_str().len() < MAX_FALLBACK_LEN {
                add_with_enclosing(&mut out, m.as_str());
            }
        }

        out
    }

    /// `a.b.Outer$Mid$Inner` yields `a.b.Outer$Mid` then `a.b.Outer`.
    pub fn enclosing_classes(name: &str) -> impl Iterator<Item = &str> {
        let mut current = name;
        std::iter::from_fn(move || {
            let cut = current.rfind('$')?;
            current = &current[..cut];
            Some(current)
        })
        .filter(|outer| !outer.is_empty() && !outer.ends_with('.') && !outer.ends_with('$'))
    }
}

pub(crate) fn add_with_enclosing(out: &mut HashSet<String>, name: &str) {
    out.insert(name.to_string());
    for outer in ReferenceExtractor::enclosing_classes(name) {
        out.insert(outer.to_string());
    }
}
