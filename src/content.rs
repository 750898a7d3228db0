use crate::error::{GenError, Result};
use crate::faker::Faker;
use serde_json::Value;
use std::path::Path;

/// Subject plus the two alternative bodies of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl MessageContent {
    pub fn new(subject: impl Into<String>, text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: text.into(),
            html: html.into(),
        }
    }

    /// Builds content from loosely typed JSON values, rejecting non-strings.
    pub fn from_values(subject: &Value, text: &Value, html: &Value) -> Result<Self> {
        Ok(Self {
            subject: expect_string("subject", subject)?,
            text: expect_string("text", text)?,
            html: expect_string("html", html)?,
        })
    }
}

fn expect_string(field: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(GenError::TypeMismatch {
            field,
            found: json_type(other).to_string(),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON template file: `{"subject": "...", "text": "...", "html": "..."}`.
pub struct Template;

impl Template {
    pub const REQUIRED_KEYS: [&'static str; 3] = ["subject", "text", "html"];

    pub fn load(path: &Path) -> Result<MessageContent> {
        let malformed = |reason: String| GenError::MalformedTemplate {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        Self::parse(&raw).map_err(|e| match e {
            GenError::MalformedTemplate { reason, .. } => malformed(reason),
            GenError::TypeMismatch { field, found } => {
                malformed(format!("key `{field}` must be a string, got {found}"))
            }
            other => other,
        })
    }

    /// Parses template JSON; errors carry an empty path for [`load`](Self::load) to fill.
    pub fn parse(raw: &str) -> Result<MessageContent> {
        let malformed = |reason: String| GenError::MalformedTemplate {
            path: Default::default(),
            reason,
        };
        let value: Value = serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(malformed(format!(
                "expected a JSON object, got {}",
                json_type(&value)
            )));
        };
        if let Some(missing) = Self::REQUIRED_KEYS.iter().find(|k| !map.contains_key(**k)) {
            return Err(malformed(format!("missing required key `{missing}`")));
        }
        MessageContent::from_values(&map["subject"], &map["text"], &map["html"])
    }
}

/// Generates a subject with matching plain-text and HTML bodies.
pub struct ContentGenerator<'a> {
    faker: &'a mut Faker,
}

impl<'a> ContentGenerator<'a> {
    pub fn new(faker: &'a mut Faker) -> Self {
        Self { faker }
    }

    pub fn generate(&mut self) -> MessageContent {
        let subject = self.faker.subject();
        let paragraphs = self.faker.paragraphs(2..5);
        let text = paragraphs.join("\n\n") + "\n";
        let html = render_html(&subject, &paragraphs);
        MessageContent {
            subject,
            text,
            html,
        }
    }
}

fn render_html(title: &str, paragraphs: &[String]) -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n",
        escape_html(title)
    );
    for p in paragraphs {
        html.push_str("<p>");
        html.push_str(&escape_html(p));
        html.push_str("</p>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faker::Locale;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_template_parse_ok() {
        let content = Template::parse(r#"{"subject": "Hi", "text": "plain", "html": "<p>x</p>"}"#).unwrap();
        assert_eq!(content, MessageContent::new("Hi", "plain", "<p>x</p>"));
    }

    #[test]
    fn test_template_missing_key() {
        let err = Template::parse(r#"{"subject": "Hi", "text": "plain"}"#).unwrap_err();
        assert!(matches!(err, GenError::MalformedTemplate { ref reason, .. } if reason.contains("html")));
    }

    #[test]
    fn test_template_not_an_object() {
        assert!(matches!(
            Template::parse("[1, 2]"),
            Err(GenError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            Template::parse("{not json"),
            Err(GenError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn test_template_non_string_value_is_type_mismatch() {
        let err = Template::parse(r#"{"subject": 5, "text": "a", "html": "b"}"#).unwrap_err();
        assert!(matches!(err, GenError::TypeMismatch { field: "subject", .. }));
    }

    #[test]
    fn test_template_load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"subject": "s", "text": ["x"], "html": "h"}}"#).unwrap();
        let err = Template::load(file.path()).unwrap_err();
        match err {
            GenError::MalformedTemplate { path, reason } => {
                assert_eq!(path, file.path());
                assert!(reason.contains("text"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_demo_template_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/template.json");
        let content = Template::load(&path).unwrap();
        assert!(content.subject.starts_with("Potwierdzenie"));
        assert!(content.html.contains("<p>"));
    }

    #[test]
    fn test_template_load_missing_file() {
        let err = Template::load(Path::new("/nonexistent/template.json")).unwrap_err();
        assert!(matches!(err, GenError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_from_values_type_mismatch() {
        let err = MessageContent::from_values(&json!("s"), &json!("t"), &json!(null)).unwrap_err();
        assert!(matches!(err, GenError::TypeMismatch { field: "html", ref found } if found == "null"));
    }

    #[test]
    fn test_generated_html_mirrors_text() {
        let mut faker = Faker::with_seed(Locale::PlPl, 8);
        let content = ContentGenerator::new(&mut faker).generate();
        assert!(!content.subject.is_empty());
        let first_line = content.text.lines().next().unwrap();
        assert!(content.html.contains(&escape_html(first_line)));
        assert!(content.html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
