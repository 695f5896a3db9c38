//! Front-matter parsing
//!
//! A content file starts with a delimited header block followed by the body:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-06-01
//! ---
//! Body text.
//! ```
//!
//! `---` opens a YAML block (or `---toml` / `---json` to pick another
//! language), `+++` opens TOML and `;;;` opens JSON. The header is decoded
//! into a generic [`serde_json::Value`] tree; binding it to a category schema
//! happens in the reader.

use serde_json::{Map, Value};
use thiserror::Error;

/// Why a file's header could not be turned into a structured value
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("no front-matter block at the start of the file")]
    Missing,

    #[error("front-matter block opened with {0:?} is never closed")]
    Unterminated(&'static str),

    #[error("unsupported front-matter language {0:?}")]
    UnknownLanguage(String),

    #[error("{format} syntax error: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },

    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,

    #[error("front matter does not match the schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// A file split into its structured header and raw body
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    pub header: Value,
    pub body: &'a str,
}

/// Capability: split raw text into a structured header and a body
///
/// The reader only depends on this trait, so any conforming implementation
/// can replace [`MatterParser`].
pub trait FrontMatterParser: Send + Sync {
    fn parse<'a>(&self, raw: &'a str) -> Result<Document<'a>, FrontMatterError>;
}

/// Header languages understood by [`MatterParser`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Yaml,
    Toml,
    Json,
}

impl Language {
    fn from_info(info: &str, default: Language) -> Result<Self, FrontMatterError> {
        match info.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "yaml" | "yml" => Ok(Language::Yaml),
            "toml" => Ok(Language::Toml),
            "json" => Ok(Language::Json),
            other => Err(FrontMatterError::UnknownLanguage(other.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Language::Yaml => "YAML",
            Language::Toml => "TOML",
            Language::Json => "JSON",
        }
    }
}

/// Default parser handling YAML, TOML and JSON headers
#[derive(Debug, Clone, Copy, Default)]
pub struct MatterParser;

impl FrontMatterParser for MatterParser {
    fn parse<'a>(&self, raw: &'a str) -> Result<Document<'a>, FrontMatterError> {
        let content = raw.trim_start_matches('\u{feff}').trim_start();

        let (fence, default) = if content.starts_with("---") {
            ("---", Language::Yaml)
        } else if content.starts_with("+++") {
            ("+++", Language::Toml)
        } else if content.starts_with(";;;") {
            (";;;", Language::Json)
        } else {
            return Err(FrontMatterError::Missing);
        };

        let block = split_block(content, fence)?;
        let language = Language::from_info(block.info, default)?;
        let header = decode(language, block.header)?;

        Ok(Document {
            header,
            body: block.body,
        })
    }
}

struct Block<'a> {
    info: &'a str,
    header: &'a str,
    body: &'a str,
}

/// Locate the header between the opening fence line and the next line that
/// is exactly the fence
fn split_block<'a>(content: &'a str, fence: &'static str) -> Result<Block<'a>, FrontMatterError> {
    let first_newline = content
        .find('\n')
        .ok_or(FrontMatterError::Unterminated(fence))?;
    let info = content[fence.len()..first_newline].trim();
    let header_start = first_newline + 1;

    let mut offset = header_start;
    for line in content[header_start..].split_inclusive('\n') {
        if line.trim_end() == fence {
            let body = &content[offset + line.len()..];
            return Ok(Block {
                info,
                header: &content[header_start..offset],
                body: body.trim_start_matches(['\n', '\r']),
            });
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated(fence))
}

fn decode(language: Language, header: &str) -> Result<Value, FrontMatterError> {
    if header.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let syntax = |message: String| FrontMatterError::Syntax {
        format: language.name(),
        message,
    };

    let value = match language {
        Language::Yaml => {
            serde_yaml::from_str::<Value>(header).map_err(|e| syntax(e.to_string()))?
        }
        Language::Json => {
            serde_json::from_str::<Value>(header).map_err(|e| syntax(e.to_string()))?
        }
        Language::Toml => {
            let table = header
                .parse::<toml::Table>()
                .map_err(|e| syntax(e.to_string()))?;
            toml_to_json(toml::Value::Table(table))
        }
    };

    match value {
        Value::Object(_) => Ok(value),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// TOML datetimes become their string form so they read like YAML dates
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
