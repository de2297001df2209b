// redact.rs — Rewrite sandbox paths back to the user's original paths.
//
// Commands run against the staged copy, so tool output mentions paths
// under the sandbox root. Before display each occurrence is replaced with
// where the files really live, so error messages point at files the user
// can actually open.
//
// Rules are tried in order at every position and the first match wins, so
// a specific rule (`<root>/<name>` → package dir) shadows a general one
// (`<root>` → its parent). Replacement text is never rescanned.

use std::borrow::Cow;
use std::path::Path;

/// Ordered literal path substitutions applied to command output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Redactor {
    rules: Vec<(String, String)>,
}

impl Redactor {
    /// Replace `sandbox_root` with `original` in every line.
    pub fn new(sandbox_root: &Path, original: &Path) -> Self {
        Self::from_pairs([(sandbox_root, original)])
    }

    /// Build from `(from, to)` pairs, highest priority first. Empty `from`
    /// paths are ignored.
    pub fn from_pairs<F, T>(pairs: impl IntoIterator<Item = (F, T)>) -> Self
    where
        F: AsRef<Path>,
        T: AsRef<Path>,
    {
        let rules = pairs
            .into_iter()
            .map(|(from, to)| {
                (
                    from.as_ref().display().to_string(),
                    to.as_ref().display().to_string(),
                )
            })
            .filter(|(from, _)| !from.is_empty())
            .collect();
        Self { rules }
    }

    /// A redactor that leaves lines untouched.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn apply<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if !self.rules.iter().any(|(from, _)| line.contains(from.as_str())) {
            return Cow::Borrowed(line);
        }

        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        'scan: while !rest.is_empty() {
            for (from, to) in &self.rules {
                if let Some(after) = rest.strip_prefix(from.as_str()) {
                    if ends_path_segment(after) {
                        out.push_str(to);
                        rest = after;
                        continue 'scan;
                    }
                }
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
        Cow::Owned(out)
    }
}

/// A match must end where the path segment ends: `/sb/demo` is not a
/// prefix of `/sb/demo-extra`.
fn ends_path_segment(after: &str) -> bool {
    match after.chars().next() {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '-' || c == '_'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_every_occurrence() {
        let redactor = Redactor::new(Path::new("/tmp/sieve/sandbox"), Path::new("/home/me/pkgs"));
        let line = "/tmp/sieve/sandbox/demo/a.rb:3 and /tmp/sieve/sandbox/demo/b.rb:9";
        assert_eq!(
            redactor.apply(line),
            "/home/me/pkgs/demo/a.rb:3 and /home/me/pkgs/demo/b.rb:9"
        );
    }

    #[test]
    fn untouched_lines_are_borrowed() {
        let redactor = Redactor::new(Path::new("/tmp/sieve/sandbox"), Path::new("/home/me"));
        assert!(matches!(redactor.apply("all good"), Cow::Borrowed("all good")));
        assert!(matches!(Redactor::none().apply("x"), Cow::Borrowed("x")));
    }

    #[test]
    fn earlier_rules_win() {
        let redactor = Redactor::from_pairs([
            ("/sb/demo", "/home/me/checkout"),
            ("/sb", "/home/me/store"),
        ]);
        assert_eq!(
            redactor.apply("/sb/demo/a.rb /sb/base/b.rb /sb/demo"),
            "/home/me/checkout/a.rb /home/me/store/base/b.rb /home/me/checkout"
        );
    }

    #[test]
    fn partial_segments_are_not_rewritten_by_the_specific_rule() {
        let redactor = Redactor::from_pairs([("/sb/demo", "/real/demo"), ("/sb", "/store")]);
        assert_eq!(redactor.apply("/sb/demo-extra/x"), "/store/demo-extra/x");
    }

    #[test]
    fn replacement_is_not_rescanned() {
        let redactor = Redactor::from_pairs([("/a", "/a/a"), ("/b", "/a")]);
        assert_eq!(redactor.apply("/a /b"), "/a/a /a");
    }
}
