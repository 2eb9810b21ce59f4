//! In-memory result pages
//!
//! A page is replaced wholesale on every fetch and consumed from the front;
//! the opaque next-page URL rides along with it.

use super::link::next_link;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;

/// One fetched page of raw result items plus the link to the next page
#[derive(Debug, Default)]
pub struct Page {
    items: VecDeque<JsonValue>,
    next: Option<String>,
}

impl Page {
    /// An exhausted page with no next link
    pub fn empty() -> Self {
        Self::default()
    }

    /// An empty page whose next link points at the first fetch
    pub fn seed(first_url: impl Into<String>) -> Self {
        Self {
            items: VecDeque::new(),
            next: Some(first_url.into()),
        }
    }

    /// Build a page from a response body and headers.
    ///
    /// `field` names the array carrying the raw results; a body without it
    /// is a contract violation by the remote API and fails the whole walk.
    pub fn from_response(body: JsonValue, headers: &HeaderMap, field: &str) -> Result<Self> {
        let next = next_link(headers)?;

        let items = match body {
            JsonValue::Object(mut map) => match map.remove(field) {
                Some(JsonValue::Array(items)) => items,
                _ => return Err(Error::missing_results(field)),
            },
            _ => return Err(Error::missing_results(field)),
        };

        Ok(Self {
            items: items.into(),
            next,
        })
    }

    /// Remove and return the item at the front of the page
    pub fn pop(&mut self) -> Option<JsonValue> {
        self.items.pop_front()
    }

    /// The next-page URL, if the response advertised one
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Remaining items in this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Is the page exhausted?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
