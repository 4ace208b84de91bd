use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a story or comment
///
/// The API reports ids as JSON numbers; older documents and placeholders may
/// carry them as strings. Whichever form was read is kept so a cached
/// record serializes back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Numeric(u64),
    Text(String),
}

impl ItemId {
    /// Builds an id from a raw identifier scraped from a listing page
    pub fn from_raw(raw: &str) -> Self {
        match raw.parse::<u64>() {
            Ok(n) => ItemId::Numeric(n),
            Err(_) => ItemId::Text(raw.to_string()),
        }
    }

    /// String form used for lookups, URLs, and file names
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Numeric(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// Item type as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
}

/// A story or comment record
///
/// Known API fields are typed and optional; anything else the API returns is
/// kept in `extra` and written back untouched. The `kids` relation is never
/// present: the fetcher strips it before a record is built.
///
/// Fields are declared, and serialized, in the API's alphabetical key order.
/// Keys from `extra` are merged into that order, so a record read from the
/// API or a cache file writes back with the same bytes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub by: Option<String>,

    #[serde(default)]
    pub dead: Option<bool>,

    #[serde(default)]
    pub deleted: Option<bool>,

    #[serde(default)]
    pub descendants: Option<i64>,

    pub id: ItemId,

    /// Parent item of a comment
    #[serde(default)]
    pub parent: Option<u64>,

    #[serde(default)]
    pub score: Option<i64>,

    /// HTML body of comments and text posts
    #[serde(default)]
    pub text: Option<String>,

    /// Creation time, Unix seconds
    #[serde(default)]
    pub time: Option<i64>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<ItemKind>,

    /// Absent for text-only posts and comments
    #[serde(default)]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Borrowed view of the typed fields, used to serialize an [`Item`]
#[derive(Serialize)]
struct TypedFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    by: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dead: Option<&'a bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<&'a bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descendants: Option<&'a i64>,
    id: &'a ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<&'a i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<&'a i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a String>,
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let typed = serde_json::to_value(TypedFields {
            by: self.by.as_ref(),
            dead: self.dead.as_ref(),
            deleted: self.deleted.as_ref(),
            descendants: self.descendants.as_ref(),
            id: &self.id,
            parent: self.parent.as_ref(),
            score: self.score.as_ref(),
            text: self.text.as_ref(),
            time: self.time.as_ref(),
            title: self.title.as_ref(),
            kind: self.kind.as_ref(),
            url: self.url.as_ref(),
        })
        .map_err(S::Error::custom)?;

        // Merge typed and unknown keys, sorted
        let mut fields: BTreeMap<&str, &Value> =
            self.extra.iter().map(|(k, v)| (k.as_str(), v)).collect();
        if let Value::Object(typed) = &typed {
            fields.extend(typed.iter().map(|(k, v)| (k.as_str(), v)));
        }
        fields.serialize(serializer)
    }
}

impl Item {
    /// Minimal record standing in for an item the API could not deliver
    pub fn placeholder(raw_id: &str) -> Self {
        Self {
            by: None,
            dead: None,
            deleted: None,
            descendants: None,
            id: ItemId::from_raw(raw_id),
            parent: None,
            score: None,
            text: None,
            time: None,
            title: Some(placeholder_title(raw_id)),
            kind: None,
            url: None,
            extra: Map::new(),
        }
    }

    /// Whether this record was synthesized by [`Item::placeholder`]
    pub fn is_placeholder(&self) -> bool {
        self.kind.is_none()
            && self.by.is_none()
            && self.url.is_none()
            && self.extra.is_empty()
            && self.title.as_deref() == Some(placeholder_title(&self.id.key()).as_str())
    }

    /// Link to the discussion thread of this item on the site
    pub fn discussion_url(&self, site_base: &url::Url) -> Result<url::Url, url::ParseError> {
        let mut url = site_base.join("item")?;
        url.query_pairs_mut().append_pair("id", &self.id.key());
        Ok(url)
    }
}

fn placeholder_title(raw_id: &str) -> String {
    format!("Item {} could not be retrieved", raw_id)
}
