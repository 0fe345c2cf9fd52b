// JSDoc block parsing
//
// Only the pieces the documentation output needs are kept: the free-text
// description and the block tags, with `@param` tags split into the
// parameter name and its text.

/// A parsed `/** ... */` block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsDoc {
    /// Line the comment starts on (1-based)
    pub start_line: usize,
    /// Text before the first tag, lines joined with `\n`
    pub description: String,
    pub tags: Vec<JsDocTag>,
}

/// A block tag like `@param x the value`
#[derive(Debug, Clone, PartialEq)]
pub struct JsDocTag {
    /// Tag name without the `@`
    pub name: String,
    /// Parameter name for `@param`/`@arg`/`@argument`
    pub target: Option<String>,
    pub text: String,
}

impl JsDoc {
    /// Text of the `@param` tag documenting `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| is_param_tag(&t.name))
            .find(|t| t.target.as_deref() == Some(name))
            .map(|t| t.text.as_str())
    }

    pub fn tag(&self, name: &str) -> Option<&JsDocTag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

/// Check whether comment text is a JSDoc block rather than a plain comment
pub fn is_jsdoc(comment: &str) -> bool {
    comment.starts_with("/**") && !comment.starts_with("/**/")
}

/// Parse a JSDoc comment starting at `start_line`
pub fn parse(comment: &str, start_line: usize) -> JsDoc {
    let body = comment
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let mut description: Vec<&str> = Vec::new();
    let mut tags: Vec<(String, Vec<String>)> = Vec::new();

    for line in body.lines() {
        let line = clean_line(line);
        if let Some(rest) = line.strip_prefix('@') {
            let (name, text) = match rest.find(char::is_whitespace) {
                Some(i) => (&rest[..i], rest[i..].trim()),
                None => (rest, ""),
            };
            tags.push((name.to_string(), vec![text.to_string()]));
        } else if let Some((_, lines)) = tags.last_mut() {
            lines.push(line.to_string());
        } else {
            description.push(line);
        }
    }

    JsDoc {
        start_line,
        description: join_lines(&description),
        tags: tags
            .into_iter()
            .map(|(name, lines)| build_tag(name, &lines))
            .collect(),
    }
}

fn clean_line(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('*').unwrap_or(line).trim()
}

/// Join lines and drop blank lines at either end
fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let lines: Vec<&str> = lines.iter().map(|l| l.as_ref()).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

fn is_param_tag(name: &str) -> bool {
    matches!(name, "param" | "arg" | "argument")
}

fn build_tag(name: String, lines: &[String]) -> JsDocTag {
    let text = join_lines(lines);
    if !is_param_tag(&name) {
        return JsDocTag {
            name,
            target: None,
            text,
        };
    }

    let mut rest = text.as_str();
    // Skip a `{type}` annotation
    if rest.starts_with('{') {
        if let Some(end) = rest.find('}') {
            rest = rest[end + 1..].trim_start();
        }
    }

    let (raw_name, desc) = match rest.find(char::is_whitespace) {
        Some(i) => (&rest[..i], rest[i..].trim_start()),
        None => (rest, ""),
    };

    // `[name]` and `[name=default]` mark optional parameters
    let target = raw_name
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split('=')
        .next()
        .unwrap_or("")
        .to_string();
    let desc = desc.strip_prefix("- ").unwrap_or(desc).trim().to_string();

    JsDocTag {
        name,
        target: (!target.is_empty()).then_some(target),
        text: desc,
    }
}
