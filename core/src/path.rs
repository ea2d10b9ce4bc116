//! Path and query-string construction for Zotero API requests.
//!
//! # Design
//! The builder tracks which resource is currently open as an explicit
//! `Scope` and validates every segment call against a transition table,
//! instead of sniffing the accumulated path for substrings. Resource keys
//! that happen to contain words like `items` or `collections` therefore
//! cannot confuse the validation.
//!
//! Query parameters never change the scope, so `versions()` stays valid
//! after `limit()` on a listing. Rejected calls leave both the path and the
//! scope untouched.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Result, ZoteroError};
use crate::types::{Direction, NumericArg, SortField};

/// Characters kept verbatim in an encoded key or tag: the RFC 3986
/// unreserved set.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Which kind of library a path is rooted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    User,
    Group,
}

/// The resource currently open at the end of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Nothing has been set yet.
    #[default]
    Unset,
    /// Path set verbatim; further appends are not validated.
    Raw,
    /// `keys/{key}`
    Key,
    /// `users/{id}` or `groups/{id}`
    Library(Library),
    Items,
    Item,
    TopItems,
    Trash,
    Children,
    Collections,
    Collection,
    TopCollections,
    SubCollections,
    Tags,
    Tag,
    Searches,
    Search,
    Groups,
}

/// A path segment requested by one of the builder methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Items,
    Item,
    Top,
    Trash,
    Children,
    Tags,
    Tag,
    Collections,
    Collection,
    SubCollections,
    Searches,
    Search,
    Groups,
}

impl Segment {
    /// Explanation attached to the error when this segment is rejected.
    fn misuse(self) -> &'static str {
        match self {
            Segment::Items | Segment::Item => {
                "items() has to be called after user(), group() or collection(key)"
            }
            Segment::Top => "top() has to be called after items(), collections() or sub_collections()",
            Segment::Trash => "trash() has to be called after items() without a key",
            Segment::Children => "children() has to be called after item(key)",
            Segment::Tags => {
                "tags() has to be called after user(), group(), item(key), collection(key), top() or trash()"
            }
            Segment::Tag => "tag(tag) has to be called just after user() or group()",
            Segment::Collections | Segment::Collection => {
                "collections() has to be called just after user() or group()"
            }
            Segment::SubCollections => "sub_collections() has to be called after collection(key)",
            Segment::Searches | Segment::Search => {
                "searches() has to be called just after user() or group()"
            }
            Segment::Groups => "groups() has to be called just after user()",
        }
    }
}

impl Scope {
    /// The scope reached by appending `segment`, or `None` if the transition
    /// is not allowed.
    fn append(self, segment: Segment) -> Option<Scope> {
        use Scope as S;
        use Segment as G;

        match (self, segment) {
            (S::Raw, _) => Some(S::Raw),

            (S::Library(_) | S::Collection, G::Items) => Some(S::Items),
            (S::Library(_) | S::Collection, G::Item) => Some(S::Item),

            (S::Items, G::Top) => Some(S::TopItems),
            (S::Collections | S::SubCollections, G::Top) => Some(S::TopCollections),

            (S::Items, G::Trash) => Some(S::Trash),
            (S::Item, G::Children) => Some(S::Children),

            (S::Library(_), G::Tag) => Some(S::Tag),
            (S::Library(_) | S::Item | S::Collection | S::TopItems | S::Trash, G::Tags) => {
                Some(S::Tags)
            }

            (S::Library(_), G::Collections) => Some(S::Collections),
            (S::Library(_), G::Collection) => Some(S::Collection),
            (S::Collection, G::SubCollections) => Some(S::SubCollections),

            (S::Library(_), G::Searches) => Some(S::Searches),
            (S::Library(_), G::Search) => Some(S::Search),

            (S::Library(Library::User), G::Groups) => Some(S::Groups),

            _ => None,
        }
    }

    /// Whether the open resource is a multi-object listing.
    fn is_listing(self) -> bool {
        matches!(
            self,
            Scope::Items | Scope::Collections | Scope::SubCollections | Scope::Raw
        )
    }
}

/// Builds the path of one API request through a sequence of validated calls.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    path: Option<String>,
    scope: Scope,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Replace the path unconditionally. The result is not validated further.
    pub fn set_path(&mut self, path: &str) {
        self.replace(path.to_string(), Scope::Raw);
    }

    /// Set the path verbatim. Only allowed before any other call.
    pub fn raw(&mut self, path: &str) -> Result<()> {
        if self.path.is_some() {
            return Err(ZoteroError::BadMethodCall(
                "raw() has to be called before any other method".to_string(),
            ));
        }
        self.replace(path.to_string(), Scope::Raw);
        Ok(())
    }

    pub fn user(&mut self, user_id: u64) -> Result<()> {
        self.root(Library::User, user_id)
    }

    pub fn group(&mut self, group_id: u64) -> Result<()> {
        self.root(Library::Group, group_id)
    }

    /// Point the path at the key-information endpoint, replacing whatever
    /// was built before.
    pub fn key(&mut self, api_key: &str) -> Result<()> {
        let api_key = encoded_key("key", api_key)?;
        self.replace(format!("keys/{api_key}"), Scope::Key);
        Ok(())
    }

    pub fn items(&mut self) -> Result<()> {
        self.push(Segment::Items, "/items")
    }

    pub fn item(&mut self, key: &str) -> Result<()> {
        let key = encoded_key("item", key)?;
        self.push(Segment::Item, &format!("/items/{key}"))
    }

    pub fn top(&mut self) -> Result<()> {
        self.push(Segment::Top, "/top")
    }

    pub fn trash(&mut self) -> Result<()> {
        self.push(Segment::Trash, "/trash")
    }

    pub fn children(&mut self) -> Result<()> {
        self.push(Segment::Children, "/children")
    }

    pub fn tags(&mut self) -> Result<()> {
        self.push(Segment::Tags, "/tags")
    }

    /// Select a single tag. The tag is percent-encoded the way
    /// `rawurlencode` does it (spaces become `%20`).
    pub fn tag(&mut self, tag: &str) -> Result<()> {
        let tag = encoded_key("tag", tag)?;
        self.push(Segment::Tag, &format!("/tags/{tag}"))
    }

    pub fn collections(&mut self) -> Result<()> {
        self.push(Segment::Collections, "/collections")
    }

    pub fn collection(&mut self, key: &str) -> Result<()> {
        let key = encoded_key("collection", key)?;
        self.push(Segment::Collection, &format!("/collections/{key}"))
    }

    pub fn sub_collections(&mut self) -> Result<()> {
        self.push(Segment::SubCollections, "/collections")
    }

    pub fn searches(&mut self) -> Result<()> {
        self.push(Segment::Searches, "/searches")
    }

    pub fn search(&mut self, key: &str) -> Result<()> {
        let key = encoded_key("search", key)?;
        self.push(Segment::Search, &format!("/searches/{key}"))
    }

    pub fn groups(&mut self) -> Result<()> {
        self.push(Segment::Groups, "/groups")
    }

    pub fn sort_by(&mut self, field: &str) -> Result<()> {
        let field: SortField = field.parse().map_err(|_| {
            let names: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
            ZoteroError::InvalidParameter(format!(
                "sort_by(field) parameter has to be one of {}, got {field:?}",
                names.join(", ")
            ))
        })?;
        self.query("sort", field.as_str())
    }

    pub fn direction(&mut self, value: &str) -> Result<()> {
        let direction: Direction = value.parse().map_err(|_| {
            ZoteroError::InvalidParameter(format!(
                "direction(value) parameter has to be one of asc or desc, got {value:?}"
            ))
        })?;
        self.query("direction", direction.as_str())
    }

    /// Maximum number of results, between 1 and 100.
    pub fn limit(&mut self, value: impl NumericArg) -> Result<()> {
        let (_, text) = value
            .to_numeric()
            .filter(|(v, _)| *v > 0.0 && *v <= 100.0)
            .ok_or_else(|| {
                ZoteroError::InvalidParameter(
                    "limit(value) parameter has to be a number between 1 and 100".to_string(),
                )
            })?;
        self.query("limit", &text)
    }

    /// Index of the first result.
    pub fn start(&mut self, value: impl NumericArg) -> Result<()> {
        let (_, text) = value.to_numeric().ok_or_else(|| {
            ZoteroError::InvalidParameter("start(value) parameter has to be numeric".to_string())
        })?;
        self.query("start", &text)
    }

    /// Ask for a `{key: version}` object instead of full objects. Only
    /// meaningful on item and collection listings.
    pub fn versions(&mut self) -> Result<()> {
        if !self.scope.is_listing() {
            return Err(ZoteroError::BadMethodCall(
                "versions() can only be called on multi-object collections and multiple items"
                    .to_string(),
            ));
        }
        self.query("format", "versions")
    }

    /// Append `name=value` to the query string. Earlier parameters with the
    /// same name are kept.
    pub fn query(&mut self, name: &str, value: &str) -> Result<()> {
        let path = self.path.as_mut().ok_or_else(|| {
            ZoteroError::BadMethodCall(format!(
                "query parameter {name} has to be added after a path has been built"
            ))
        })?;
        let separator = if path.contains('?') { '&' } else { '?' };
        path.push(separator);
        path.push_str(name);
        path.push('=');
        path.push_str(value);
        log::trace!("path: {path}");
        Ok(())
    }

    fn root(&mut self, library: Library, id: u64) -> Result<()> {
        if self.path.is_some() {
            return Err(ZoteroError::BadMethodCall(
                "user() and group() have to be called first".to_string(),
            ));
        }
        let prefix = match library {
            Library::User => "users",
            Library::Group => "groups",
        };
        self.replace(format!("{prefix}/{id}"), Scope::Library(library));
        Ok(())
    }

    fn push(&mut self, segment: Segment, suffix: &str) -> Result<()> {
        let next = self
            .scope
            .append(segment)
            .ok_or_else(|| ZoteroError::BadMethodCall(segment.misuse().to_string()))?;
        // Every scope other than Unset has a path.
        let path = self
            .path
            .as_mut()
            .ok_or_else(|| ZoteroError::BadMethodCall(segment.misuse().to_string()))?;
        path.push_str(suffix);
        self.scope = next;
        log::trace!("path: {path} ({next:?})");
        Ok(())
    }

    fn replace(&mut self, path: String, scope: Scope) {
        log::trace!("path: {path} ({scope:?})");
        self.path = Some(path);
        self.scope = scope;
    }
}

/// Percent-encode a key or tag so it stays a single path segment.
fn encoded_key(method: &str, key: &str) -> Result<String> {
    let key = non_empty(method, key)?;
    Ok(utf8_percent_encode(key, SEGMENT_ENCODE_SET).to_string())
}

fn non_empty<'a>(method: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(ZoteroError::InvalidParameter(format!(
            "{method}() parameter cannot be empty"
        )));
    }
    Ok(value)
}
