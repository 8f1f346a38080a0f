//! The directive mini-language embedded in compiled templates.
//!
//! Exactly two directive forms exist, plus interpolation:
//!
//! ```text
//! {% if user %} ... {% else %} ... {% endif %}
//! {% for product in products %} ... {% endfor %}
//! {{ site.name }}
//! ```
//!
//! Directives are resolved at render-to-HTML time against a JSON context
//! supplied by the surrounding page (site settings, menus, listings, the
//! signed-in user). Paths are dot-separated; a path that resolves to
//! nothing interpolates as the empty string. The set is closed: templates
//! carry no user-supplied logic.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("Unclosed directive: {0}")]
    Unclosed(String),

    #[error("Unexpected directive tag: {0}")]
    UnexpectedTag(String),

    #[error("Malformed for directive: {0}")]
    MalformedFor(String),
}

/// Build an interpolation marker.
pub fn var(path: &str) -> String {
    format!("{{{{ {path} }}}}")
}

/// Build a conditional directive.
pub fn if_else(condition: &str, then_body: &str, else_body: Option<&str>) -> String {
    match else_body {
        Some(els) => {
            format!("{{% if {condition} %}}{then_body}{{% else %}}{els}{{% endif %}}")
        }
        None => format!("{{% if {condition} %}}{then_body}{{% endif %}}"),
    }
}

/// Build an iteration directive over a named collection.
pub fn for_each(item: &str, collection: &str, body: &str) -> String {
    format!("{{% for {item} in {collection} %}}{body}{{% endfor %}}")
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Interp(String),
    If {
        condition: String,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
    },
    For {
        item: String,
        collection: String,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Interp(String),
    Tag(String),
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = template;

    loop {
        let tag_at = rest.find("{%");
        let interp_at = rest.find("{{");

        let (at, is_tag) = match (tag_at, interp_at) {
            (Some(t), Some(i)) if t <= i => (t, true),
            (_, Some(i)) => (i, false),
            (Some(t), None) => (t, true),
            (None, None) => {
                if !rest.is_empty() {
                    tokens.push(Token::Text(rest.to_string()));
                }
                return tokens;
            }
        };

        if at > 0 {
            tokens.push(Token::Text(rest[..at].to_string()));
        }
        let after = &rest[at + 2..];
        let close = if is_tag { "%}" } else { "}}" };
        match after.find(close) {
            Some(end) => {
                let inner = after[..end].trim().to_string();
                tokens.push(if is_tag {
                    Token::Tag(inner)
                } else {
                    Token::Interp(inner)
                });
                rest = &after[end + 2..];
            }
            None => {
                // Dangling opener; treat the remainder as text.
                tokens.push(Token::Text(rest[at..].to_string()));
                return tokens;
            }
        }
    }
}

fn parse(tokens: &[Token], pos: &mut usize, terminators: &[&str]) -> Result<Vec<Node>, DirectiveError> {
    let mut nodes = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::Text(text) => {
                nodes.push(Node::Text(text.clone()));
                *pos += 1;
            }
            Token::Interp(path) => {
                nodes.push(Node::Interp(path.clone()));
                *pos += 1;
            }
            Token::Tag(tag) => {
                let keyword = tag.split_whitespace().next().unwrap_or("");
                if terminators.contains(&keyword) {
                    return Ok(nodes);
                }
                match keyword {
                    "if" => {
                        let condition = tag["if".len()..].trim().to_string();
                        *pos += 1;
                        let then_body = parse(tokens, pos, &["else", "endif"])?;
                        let mut else_body = Vec::new();
                        match tokens.get(*pos) {
                            Some(Token::Tag(t)) if t == "else" => {
                                *pos += 1;
                                else_body = parse(tokens, pos, &["endif"])?;
                                match tokens.get(*pos) {
                                    Some(Token::Tag(t)) if t == "endif" => *pos += 1,
                                    _ => return Err(DirectiveError::Unclosed(format!("if {condition}"))),
                                }
                            }
                            Some(Token::Tag(t)) if t == "endif" => *pos += 1,
                            _ => return Err(DirectiveError::Unclosed(format!("if {condition}"))),
                        }
                        nodes.push(Node::If {
                            condition,
                            then_body,
                            else_body,
                        });
                    }
                    "for" => {
                        let spec = tag["for".len()..].trim();
                        let mut parts = spec.splitn(2, " in ");
                        let item = parts.next().unwrap_or("").trim().to_string();
                        let collection = parts
                            .next()
                            .ok_or_else(|| DirectiveError::MalformedFor(spec.to_string()))?
                            .trim()
                            .to_string();
                        if item.is_empty() || collection.is_empty() {
                            return Err(DirectiveError::MalformedFor(spec.to_string()));
                        }
                        *pos += 1;
                        let body = parse(tokens, pos, &["endfor"])?;
                        match tokens.get(*pos) {
                            Some(Token::Tag(t)) if t == "endfor" => *pos += 1,
                            _ => return Err(DirectiveError::Unclosed(format!("for {spec}"))),
                        }
                        nodes.push(Node::For {
                            item,
                            collection,
                            body,
                        });
                    }
                    other => return Err(DirectiveError::UnexpectedTag(other.to_string())),
                }
            }
        }
    }

    if terminators.is_empty() {
        Ok(nodes)
    } else {
        Err(DirectiveError::Unclosed(terminators.join("/")))
    }
}

fn lookup<'a>(path: &str, scopes: &'a [(String, Value)], root: &'a Value) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;

    let mut current = scopes
        .iter()
        .rev()
        .find(|(name, _)| name == first)
        .map(|(_, value)| value)
        .or_else(|| root.get(first))?;

    for segment in segments {
        current = current.get(segment)?;
    }
    Some(current)
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn eval(nodes: &[Node], scopes: &mut Vec<(String, Value)>, root: &Value, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Interp(path) => {
                if let Some(value) = lookup(path, scopes, root) {
                    out.push_str(&to_text(value));
                }
            }
            Node::If {
                condition,
                then_body,
                else_body,
            } => {
                if truthy(lookup(condition, scopes, root)) {
                    eval(then_body, scopes, root, out);
                } else {
                    eval(else_body, scopes, root, out);
                }
            }
            Node::For {
                item,
                collection,
                body,
            } => {
                let items: Vec<Value> = match lookup(collection, scopes, root) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                for value in items {
                    scopes.push((item.clone(), value));
                    eval(body, scopes, root, out);
                    scopes.pop();
                }
            }
        }
    }
}

/// Resolve a compiled template against a runtime context.
pub fn resolve(template: &str, context: &Value) -> Result<String, DirectiveError> {
    let tokens = tokenize(template);
    let mut pos = 0;
    let nodes = parse(&tokens, &mut pos, &[])?;

    let mut out = String::with_capacity(template.len());
    let mut scopes = Vec::new();
    eval(&nodes, &mut scopes, context, &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolates_dotted_paths() {
        let ctx = json!({ "site": { "name": "Learn Online" }, "year": 2026 });
        let out = resolve("<h1>{{ site.name }}</h1> © {{ year }}", &ctx).unwrap();
        assert_eq!(out, "<h1>Learn Online</h1> © 2026");
    }

    #[test]
    fn missing_paths_resolve_empty() {
        let out = resolve("[{{ nothing.here }}]", &json!({})).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn conditional_takes_then_branch() {
        let template = if_else("user", "Hi {{ user.name }}", Some("Sign in"));
        let out = resolve(&template, &json!({ "user": { "name": "Ada" } })).unwrap();
        assert_eq!(out, "Hi Ada");
    }

    #[test]
    fn conditional_takes_else_branch() {
        let template = if_else("user", "Hi {{ user.name }}", Some("Sign in"));
        let out = resolve(&template, &json!({})).unwrap();
        assert_eq!(out, "Sign in");

        // Empty string and empty array are falsy.
        let out = resolve(&template, &json!({ "user": "" })).unwrap();
        assert_eq!(out, "Sign in");
    }

    #[test]
    fn iterates_collections_with_scoping() {
        let template = for_each("p", "products", "<li>{{ p.name }}: {{ p.price }}</li>");
        let ctx = json!({
            "products": [
                { "name": "Mug", "price": 12 },
                { "name": "Tee", "price": 25 }
            ]
        });
        let out = resolve(&template, &ctx).unwrap();
        assert_eq!(out, "<li>Mug: 12</li><li>Tee: 25</li>");
    }

    #[test]
    fn loop_variable_shadows_context() {
        let ctx = json!({ "item": "outer", "items": ["a", "b"] });
        let out = resolve("{% for item in items %}{{ item }}{% endfor %}{{ item }}", &ctx).unwrap();
        assert_eq!(out, "abouter");
    }

    #[test]
    fn nested_directives() {
        let template = "{% for p in products %}{% if p.featured %}{{ p.name }};{% endif %}{% endfor %}";
        let ctx = json!({
            "products": [
                { "name": "Mug", "featured": true },
                { "name": "Tee", "featured": false },
                { "name": "Cap", "featured": true }
            ]
        });
        let out = resolve(template, &ctx).unwrap();
        assert_eq!(out, "Mug;Cap;");
    }

    #[test]
    fn missing_collection_iterates_zero_times() {
        let template = for_each("c", "courses", "x");
        assert_eq!(resolve(&template, &json!({})).unwrap(), "");
    }

    #[test]
    fn unclosed_if_is_an_error() {
        let err = resolve("{% if user %}hi", &json!({})).unwrap_err();
        assert!(matches!(err, DirectiveError::Unclosed(_)));
    }

    #[test]
    fn malformed_for_is_an_error() {
        let err = resolve("{% for products %}x{% endfor %}", &json!({})).unwrap_err();
        assert!(matches!(err, DirectiveError::MalformedFor(_)));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = resolve("{% include foo %}", &json!({})).unwrap_err();
        assert!(matches!(err, DirectiveError::UnexpectedTag(tag) if tag == "include"));
    }

    #[test]
    fn dangling_opener_is_literal_text() {
        let out = resolve("price: {{ broken", &json!({})).unwrap();
        assert_eq!(out, "price: {{ broken");
    }
}
