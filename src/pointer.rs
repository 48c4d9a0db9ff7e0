//! Typed `$ref` fragments.
//!
//! A ref such as `#/definitions/Foo/Bar` parses into the segment sequence
//! `["definitions", "Foo", "Bar"]`. Lookups walk that sequence against the
//! `definitions` tree and report exactly which segment failed.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::PointerError;

const DEFINITIONS: &str = "definitions";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaPointer {
    raw: String,
    segments: Vec<String>,
}

impl SchemaPointer {
    /// Parse a local fragment (`#/a/b`). `~1` and `~0` are unescaped to
    /// `/` and `~` per JSON Pointer.
    pub fn parse(reference: &str) -> Result<Self, PointerError> {
        let body = reference
            .strip_prefix('#')
            .ok_or_else(|| PointerError::NotFragment(reference.to_string()))?;
        let segments = if body.is_empty() {
            Vec::new()
        } else {
            let body = body
                .strip_prefix('/')
                .ok_or_else(|| PointerError::NotFragment(reference.to_string()))?;
            body.split('/')
                .map(|s| s.replace("~1", "/").replace("~0", "~"))
                .collect()
        };
        Ok(Self {
            raw: reference.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Segments below the `definitions` root.
    pub fn definition_path(&self) -> Result<&[String], PointerError> {
        match self.segments.split_first() {
            Some((root, rest)) if root == DEFINITIONS && !rest.is_empty() => Ok(rest),
            _ => Err(PointerError::UnsupportedRoot(self.raw.clone())),
        }
    }

    /// The last segment, e.g. `User` for `#/definitions/User`.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Walk `definitions` along this pointer.
    pub fn lookup<'a>(&self, definitions: &'a Map<String, Value>) -> Result<&'a Value, PointerError> {
        let path = self.definition_path()?;
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| PointerError::UnsupportedRoot(self.raw.clone()))?;

        let mut node = definitions
            .get(first)
            .ok_or_else(|| self.missing(first, 1))?;

        for (i, segment) in rest.iter().enumerate() {
            // +2: the `definitions` root and the first segment are behind us.
            let depth = i + 2;
            node = match node {
                Value::Object(obj) => obj.get(segment).ok_or_else(|| self.missing(segment, depth))?,
                Value::Array(arr) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| arr.get(idx))
                    .ok_or_else(|| self.missing(segment, depth))?,
                _ => {
                    return Err(PointerError::NotAContainer {
                        pointer: self.raw.clone(),
                        depth,
                    });
                }
            };
        }
        Ok(node)
    }

    fn missing(&self, segment: &str, depth: usize) -> PointerError {
        PointerError::MissingSegment {
            pointer: self.raw.clone(),
            segment: segment.to_string(),
            depth,
        }
    }
}

impl fmt::Display for SchemaPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
