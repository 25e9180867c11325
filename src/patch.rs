//! A small line-oriented rewrite engine for `Key=Value` settings files.
//!
//! Rules only ever see the text of a line without its terminator, and every line that
//! no rule touches is passed through byte for byte.
use core::fmt;

/// Rewrites a single line, returning `None` if the rule does not apply to it
type Rewrite = Box<dyn Fn(&str) -> Option<String>>;

/// A named line rewrite that fires a limited number of times
pub struct LineRule {
    name: &'static str,
    rewrite: Rewrite,
    max_applications: usize,
}

impl fmt::Debug for LineRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineRule")
            .field("name", &self.name)
            .field("max_applications", &self.max_applications)
            .finish()
    }
}

impl LineRule {
    /// Creates a rule that fires at most once
    pub fn new(name: &'static str, rewrite: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            name,
            rewrite: Box::new(rewrite),
            max_applications: 1,
        }
    }

    /// Replaces a line that is exactly `from` with `to`
    pub fn exact(name: &'static str, from: &'static str, to: &'static str) -> Self {
        Self::new(name, move |line| (line == from).then(|| to.to_string()))
    }

    pub fn max_applications(mut self, max: usize) -> Self {
        self.max_applications = max;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A line that was rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// Zero based line index
    pub line: usize,
    pub rule: &'static str,
    pub before: String,
    pub after: String,
}

impl fmt::Display for LineChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} ({}): `{}` -> `{}`",
            self.line + 1,
            self.rule,
            self.before,
            self.after
        )
    }
}

/// Splits a line into its content and its terminator (`\r\n`, `\n` or nothing)
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Applies `rules` to `text` in a single pass.
///
/// Each line gets the first rule that matches it and still has applications left.
/// Returns the rewritten text together with the changes made, in line order.
pub fn apply_rules(text: &str, rules: &[LineRule]) -> (String, Vec<LineChange>) {
    let mut applied = vec![0usize; rules.len()];
    let mut changes = Vec::new();
    let mut out = String::with_capacity(text.len());

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let (body, terminator) = split_terminator(line);

        let rewritten = rules
            .iter()
            .enumerate()
            .filter(|(i, rule)| applied[*i] < rule.max_applications)
            .find_map(|(i, rule)| (rule.rewrite)(body).map(|new| (i, rule.name, new)));

        match rewritten {
            Some((i, rule, new)) => {
                applied[i] += 1;
                out.push_str(&new);
                out.push_str(terminator);
                changes.push(LineChange {
                    line: index,
                    rule,
                    before: body.to_string(),
                    after: new,
                });
            }
            None => out.push_str(line),
        }
    }

    (out, changes)
}

/// The rules that turn the game's display settings into borderless windowed mode
/// spanning `width * 2` pixels
pub fn settings_rules(width: u32) -> Vec<LineRule> {
    let res_x = format!("ResX={}", u64::from(width) * 2);

    vec![
        LineRule::exact("fullscreen", "Fullscreen=True", "Fullscreen=False"),
        LineRule::new("resolution", move |line| {
            (line.starts_with("ResX=") && line != res_x).then(|| res_x.clone())
        }),
        LineRule::exact("borderless", "Borderless=False", "Borderless=True"),
    ]
}
