//! Logical addressing of production file artifacts.
//!
//! Output files are located by naming convention, not by hard-coded paths: a
//! template maps {project, shot, step, output type/name, version} tuples to
//! directories and back. Code above this layer only handles field tuples.

use std::path::{Path, PathBuf};

use ahash::HashMap;
use thiserror::Error;

/// The logical address of one output version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFields {
    pub project: String,
    pub shot: String,
    pub step: String,
    pub output_type: String,
    pub output_name: String,
    pub version: u32,
}

impl OutputFields {
    pub fn new(
        project: impl Into<String>,
        shot: impl Into<String>,
        step: impl Into<String>,
        output_type: impl Into<String>,
        output_name: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            project: project.into(),
            shot: shot.into(),
            step: step.into(),
            output_type: output_type.into(),
            output_name: output_name.into(),
            version,
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Path does not match template ({0:?})")]
    Mismatch(PathBuf),

    #[error("Unknown template field ({0})")]
    UnknownField(String),

    #[error("Template is missing field ({0})")]
    MissingField(&'static str),

    #[error("Bad version token ({0})")]
    BadVersion(String),
}

/// Maps logical output fields to file-system paths and back.
pub trait PathResolver {
    fn resolve(&self, fields: &OutputFields) -> Result<PathBuf, TemplateError>;
    fn parse(&self, path: &Path) -> Result<OutputFields, TemplateError>;
}

#[derive(Clone, Copy)]
enum Token<'a> {
    Literal(&'a str),
    Field(&'a str),
}

fn tokenize(segment: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = segment;
    while !rest.is_empty() {
        match rest.find('{') {
            None => {
                tokens.push(Token::Literal(rest));
                break;
            }
            Some(open) => {
                if open > 0 {
                    tokens.push(Token::Literal(&rest[..open]));
                }
                let Some(close) = rest[open..].find('}') else {
                    tokens.push(Token::Literal(&rest[open..]));
                    break;
                };
                tokens.push(Token::Field(&rest[open + 1..open + close]));
                rest = &rest[open + close + 1..];
                continue;
            }
        }
    }
    tokens
}

/// A pattern-string resolver rooted at a projects directory.
///
/// Pattern segments mix literals and `{field}` tokens; the version field
/// formats as three zero-padded digits.
pub struct TemplateResolver {
    root: PathBuf,
    pattern: String,
}

impl TemplateResolver {
    pub const DEFAULT_PATTERN: &'static str =
        "{project}/sequences/{shot}/{step}/output/{output_type}/{output_name}/v{version}";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_pattern(root, Self::DEFAULT_PATTERN)
    }

    pub fn with_pattern(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
        }
    }

    fn field_value(fields: &OutputFields, name: &str) -> Result<String, TemplateError> {
        match name {
            "project" => Ok(fields.project.clone()),
            "shot" => Ok(fields.shot.clone()),
            "step" => Ok(fields.step.clone()),
            "output_type" => Ok(fields.output_type.clone()),
            "output_name" => Ok(fields.output_name.clone()),
            "version" => Ok(format!("{:03}", fields.version)),
            other => Err(TemplateError::UnknownField(other.to_string())),
        }
    }

    fn match_segment(segment: &str, value: &str, out: &mut HashMap<String, String>) -> bool {
        let tokens = tokenize(segment);
        let mut rest = value;
        for (i, token) in tokens.iter().copied().enumerate() {
            match token {
                Token::Literal(lit) => {
                    let Some(after) = rest.strip_prefix(lit) else {
                        return false;
                    };
                    rest = after;
                }
                Token::Field(name) => {
                    // A field matches up to the next literal, or the rest of
                    // the segment.
                    let matched = match tokens.get(i + 1).copied() {
                        Some(Token::Literal(lit)) => match rest.find(lit) {
                            Some(at) => {
                                let (m, tail) = rest.split_at(at);
                                rest = tail;
                                m
                            }
                            None => return false,
                        },
                        _ => std::mem::take(&mut rest),
                    };
                    if matched.is_empty() {
                        return false;
                    }
                    out.insert(name.to_string(), matched.to_string());
                }
            }
        }
        rest.is_empty()
    }
}

impl PathResolver for TemplateResolver {
    fn resolve(&self, fields: &OutputFields) -> Result<PathBuf, TemplateError> {
        let mut path = self.root.clone();
        for segment in self.pattern.split('/') {
            let mut rendered = String::new();
            for token in tokenize(segment) {
                match token {
                    Token::Literal(lit) => rendered.push_str(lit),
                    Token::Field(name) => rendered.push_str(&Self::field_value(fields, name)?),
                }
            }
            path.push(rendered);
        }
        Ok(path)
    }

    fn parse(&self, path: &Path) -> Result<OutputFields, TemplateError> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| TemplateError::Mismatch(path.to_path_buf()))?;

        let segments: Vec<&str> = self.pattern.split('/').collect();
        let components: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.len() != components.len() {
            return Err(TemplateError::Mismatch(path.to_path_buf()));
        }

        let mut values = HashMap::default();
        for (segment, component) in segments.iter().zip(&components) {
            if !Self::match_segment(segment, component, &mut values) {
                return Err(TemplateError::Mismatch(path.to_path_buf()));
            }
        }

        let take = |values: &HashMap<String, String>, name: &'static str| {
            values
                .get(name)
                .cloned()
                .ok_or(TemplateError::MissingField(name))
        };
        let version_str = take(&values, "version")?;
        let version = version_str
            .parse::<u32>()
            .map_err(|_| TemplateError::BadVersion(version_str))?;

        Ok(OutputFields {
            project: take(&values, "project")?,
            shot: take(&values, "shot")?,
            step: take(&values, "step")?,
            output_type: take(&values, "output_type")?,
            output_name: take(&values, "output_name")?,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> OutputFields {
        OutputFields::new("totoro", "sh0120", "animation", "cache", "hero_body", 12)
    }

    #[test]
    fn resolve_formats_the_version_directory() {
        let resolver = TemplateResolver::new("/jobs");
        let path = resolver.resolve(&fields()).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/jobs/totoro/sequences/sh0120/animation/output/cache/hero_body/v012"),
        );
    }

    #[test]
    fn parse_round_trips_resolve() {
        let resolver = TemplateResolver::new("/jobs");
        let path = resolver.resolve(&fields()).unwrap();
        assert_eq!(resolver.parse(&path).unwrap(), fields());
    }

    #[test]
    fn parse_rejects_foreign_paths() {
        let resolver = TemplateResolver::new("/jobs");

        assert!(matches!(
            resolver.parse(Path::new("/elsewhere/totoro")),
            Err(TemplateError::Mismatch(_)),
        ));
        assert!(matches!(
            resolver.parse(Path::new("/jobs/totoro/sequences/sh0120")),
            Err(TemplateError::Mismatch(_)),
        ));
    }

    #[test]
    fn parse_rejects_a_bad_version_token() {
        let resolver = TemplateResolver::new("/jobs");
        let path = Path::new("/jobs/totoro/sequences/sh0120/animation/output/cache/hero_body/vFinal");

        assert!(matches!(
            resolver.parse(path),
            Err(TemplateError::BadVersion(_)),
        ));
    }

    #[test]
    fn unknown_pattern_fields_fail_resolve() {
        let resolver = TemplateResolver::with_pattern("/jobs", "{project}/{flavor}");
        assert!(matches!(
            resolver.resolve(&fields()),
            Err(TemplateError::UnknownField(_)),
        ));
    }

    #[test]
    fn custom_patterns_with_mixed_segments_round_trip() {
        let resolver = TemplateResolver::with_pattern(
            "/jobs",
            "{project}/{shot}_{step}/out/{output_type}.{output_name}/v{version}",
        );
        let path = resolver.resolve(&fields()).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/jobs/totoro/sh0120_animation/out/cache.hero_body/v012"),
        );
        assert_eq!(resolver.parse(&path).unwrap(), fields());
    }
}
