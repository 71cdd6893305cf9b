//! Annotation grammar for doc comment lines.
//!
//! Every line is parsed on its own. A line is either ignored (empty, prose, unknown tag) or
//! yields one [`Annotation`]; a line whose tag is known but whose arguments do not fit the
//! tag's grammar yields an [`AnnotationError`]. Parsing is total: no line aborts the run.
//!
//! ```text
//! @router   /pets/{id} [get]
//! @resource pets "Pet operations"
//! @title    Find a pet
//! @param    id path int true "pet id"
//! @success  200 {object} models.Pet "the pet"
//! @accept   json, xml
//! ```

use crate::error::AnnotationError;
use log::debug;

/// HTTP methods an operation can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// Case-insensitive lookup
    pub fn from_token(token: &str) -> Option<Self> {
        let method = match token.to_ascii_lowercase().as_str() {
            "get" => HttpMethod::Get,
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "patch" => HttpMethod::Patch,
            "delete" => HttpMethod::Delete,
            "options" => HttpMethod::Options,
            "head" => HttpMethod::Head,
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Header,
    FormData,
}

impl ParameterLocation {
    /// Case-insensitive lookup; `form` is accepted for `formData`
    pub fn from_token(token: &str) -> Option<Self> {
        let location = match token.to_ascii_lowercase().as_str() {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "body" => ParameterLocation::Body,
            "header" => ParameterLocation::Header,
            "form" | "formdata" => ParameterLocation::FormData,
            _ => return None,
        };
        Some(location)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
            ParameterLocation::Header => "header",
            ParameterLocation::FormData => "formData",
        }
    }
}

/// One parsed annotation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Router {
        path: String,
        method: HttpMethod,
    },
    Resource {
        name: String,
        description: Option<String>,
    },
    Title(String),
    Description(String),
    /// `@success` or `@failure`
    Response {
        code: u16,
        /// Kind written between braces, e.g. `array`
        kind: String,
        type_name: String,
        description: Option<String>,
    },
    Param {
        name: String,
        location: ParameterLocation,
        type_name: String,
        required: bool,
        description: Option<String>,
    },
    /// Full media types, unknown tokens already dropped
    Accept(Vec<String>),
    Produce(Vec<String>),
}

/// A whitespace-separated word of an annotation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Written between double quotes (which are not part of `text`)
    pub quoted: bool,
}

impl Token {
    fn plain(text: String) -> Self {
        Token {
            text,
            quoted: false,
        }
    }

    /// Inner text of a `[x]` token
    pub fn bracketed(&self) -> Option<&str> {
        self.enclosed('[', ']')
    }

    /// Inner text of a `{x}` token
    pub fn braced(&self) -> Option<&str> {
        self.enclosed('{', '}')
    }

    fn enclosed(&self, open: char, close: char) -> Option<&str> {
        if self.quoted {
            return None;
        }
        self.text
            .strip_prefix(open)?
            .strip_suffix(close)
            .map(str::trim)
    }
}

/// Splits an annotation argument string into tokens.
///
/// A double-quoted string is one token even when it contains spaces; an unterminated quote runs
/// to the end of the line. A token starting with `[` or `{` runs to the matching close.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut current = String::new();
        match c {
            '"' => {
                chars.next();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    current.push(c);
                }
                tokens.push(Token {
                    text: current,
                    quoted: true,
                });
            }
            _ => {
                if c == '[' || c == '{' {
                    let close = if c == '[' { ']' } else { '}' };
                    for c in chars.by_ref() {
                        current.push(c);
                        if c == close {
                            break;
                        }
                    }
                }
                // `[]Pet` continues past the brackets
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '"' {
                        break;
                    }
                    current.push(c);
                    chars.next();
                }
                tokens.push(Token::plain(current));
            }
        }
    }

    tokens
}

/// Removes comment markers and surrounding whitespace from a comment line.
pub fn strip_comment_markers(line: &str) -> &str {
    let mut text = line.trim();
    for marker in ["///", "//!", "//", "/**", "/*"] {
        if let Some(rest) = text.strip_prefix(marker) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("*/") {
        text = rest;
    }
    let text = text.trim();
    text.strip_prefix('*').unwrap_or(text).trim()
}

/// Splits `@tag rest` into the lowercased tag and the trimmed rest.
fn split_tag(line: &str) -> Option<(String, &str)> {
    if !line.starts_with('@') {
        return None;
    }
    let (tag, rest) = match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    };
    Some((tag.to_ascii_lowercase(), rest.trim()))
}

/// Parses one comment line of a declaration.
///
/// Returns `Ok(None)` for lines carrying no annotation.
pub fn parse_line(raw: &str) -> Result<Option<Annotation>, AnnotationError> {
    let line = strip_comment_markers(raw);
    let Some((tag, rest)) = split_tag(line) else {
        return Ok(None);
    };
    let original_tag = line.split_whitespace().next().unwrap_or_default();
    let fail = |reason: &str| AnnotationError::new(original_tag, line, reason);

    let annotation = match tag.as_str() {
        "@router" => parse_router(rest).map_err(fail)?,
        "@resource" => parse_resource(rest),
        "@title" => Annotation::Title(rest.to_string()),
        "@description" => Annotation::Description(rest.to_string()),
        "@success" | "@failure" => parse_response(rest).map_err(fail)?,
        "@param" => parse_param(rest).map_err(fail)?,
        "@accept" | "@consume" | "@consumes" => Annotation::Accept(media_types(rest)),
        "@produce" | "@produces" => Annotation::Produce(media_types(rest)),
        _ => {
            debug!("Ignoring unknown annotation {}", original_tag);
            return Ok(None);
        }
    };
    Ok(Some(annotation))
}

fn parse_router(rest: &str) -> Result<Annotation, &'static str> {
    let tokens = tokenize(rest);
    let path = match tokens.first() {
        Some(token) if !token.quoted && token.bracketed().is_none() => token.text.clone(),
        _ => return Err("expected a path"),
    };
    let method = tokens[1..]
        .iter()
        .find_map(Token::bracketed)
        .ok_or("expected [method] after the path")?;
    let method = HttpMethod::from_token(method).ok_or("unknown http method")?;
    Ok(Annotation::Router { path, method })
}

fn parse_resource(rest: &str) -> Annotation {
    let tokens = tokenize(rest);
    let (name, remaining) = match tokens.split_first() {
        Some((first, remaining)) if !first.quoted => (first.text.clone(), remaining),
        _ => (String::new(), tokens.as_slice()),
    };
    let name = if name.is_empty() {
        "others".to_string()
    } else {
        name
    };
    let description = remaining
        .iter()
        .find(|token| token.quoted)
        .map(|token| token.text.clone());
    Annotation::Resource { name, description }
}

fn parse_response(rest: &str) -> Result<Annotation, &'static str> {
    let tokens = tokenize(rest);
    let code = tokens
        .first()
        .filter(|token| !token.quoted)
        .ok_or("expected a status code")?
        .text
        .parse::<u16>()
        .map_err(|_| "status code must be an integer")?;
    let kind = tokens
        .get(1)
        .and_then(Token::braced)
        .ok_or("expected {kind} after the status code")?
        .to_string();
    let type_name = match tokens.get(2) {
        Some(token) if !token.quoted => token.text.clone(),
        _ => return Err("expected a type name after {kind}"),
    };
    let description = tokens[3..]
        .iter()
        .find(|token| token.quoted)
        .map(|token| token.text.clone());

    Ok(Annotation::Response {
        code,
        kind,
        type_name,
        description,
    })
}

fn parse_param(rest: &str) -> Result<Annotation, &'static str> {
    let tokens = tokenize(rest);
    if tokens.len() < 4 || tokens[..4].iter().any(|token| token.quoted) {
        return Err("expected <name> <in> <type> <required>");
    }

    let location =
        ParameterLocation::from_token(&tokens[1].text).ok_or("unknown parameter location")?;
    let required = matches!(
        tokens[3].text.to_ascii_lowercase().as_str(),
        "true" | "required"
    );
    let description = match tokens.get(4) {
        Some(token) if token.quoted => Some(token.text.clone()),
        Some(_) => Some(
            tokens[4..]
                .iter()
                .map(|token| token.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        None => None,
    };

    Ok(Annotation::Param {
        name: tokens[0].text.clone(),
        location,
        type_name: tokens[2].text.clone(),
        required,
        description,
    })
}

/// Maps a comma-separated media list to full media types, dropping unknown tokens.
pub fn media_types(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let media = media_type(token);
            if media.is_none() {
                debug!("Ignoring unknown media type {}", token);
            }
            media
        })
        .collect()
}

fn media_type(token: &str) -> Option<String> {
    let media = match token.to_ascii_lowercase().as_str() {
        "json" => "application/json",
        "xml" | "text/xml" | "application/xml" => "application/xml",
        "plain" => "text/plain",
        "html" => "text/html",
        "mpfd" => "multipart/form-data",
        "x-www-form-urlencoded" => "application/x-www-form-urlencoded",
        _ if token.contains('/') => return Some(token.to_string()),
        _ => return None,
    };
    Some(media.to_string())
}

/// Document-level fields read from the main file's comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoBlock {
    pub version: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_url: Option<String>,
    pub license_name: Option<String>,
    pub license_url: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
}

impl InfoBlock {
    /// Parses every line; lines without a document-level tag are skipped.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut info = InfoBlock::default();
        for line in lines {
            info.apply_line(line.as_ref());
        }
        info
    }

    /// Applies one comment line. Returns whether it carried a document-level tag.
    pub fn apply_line(&mut self, raw: &str) -> bool {
        let line = strip_comment_markers(raw);
        let Some((tag, rest)) = split_tag(line) else {
            return false;
        };
        let value = Some(rest.to_string());

        match tag.as_str() {
            "@version" => self.version = value,
            "@title" => self.title = value,
            "@description" => self.description = value,
            "@termsofserviceurl" => self.terms_of_service = value,
            "@contactname" => self.contact_name = value,
            "@contactemail" => self.contact_email = value,
            "@contacturl" => self.contact_url = value,
            "@licensename" => self.license_name = value,
            "@licenseurl" => self.license_url = value,
            "@basepath" => self.base_path = value,
            "@schemes" => {
                self.schemes = rest
                    .replace(' ', "")
                    .split(',')
                    .filter(|scheme| !scheme.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => return false,
        }
        true
    }
}
