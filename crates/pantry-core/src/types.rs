//! Domain types shared by the parser, the graph evaluator and the fusion engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Catalog-wide product identity.
///
/// Ordered numerically; ascending id is the tie-break order wherever results
/// are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amounts are kept in integer cents.
pub type Cents = u64;

/// A catalog product. Built once at load time and never mutated afterwards.
///
/// - `category`: lower-case `/`-separated path, e.g. `snacks/granola`
/// - `attributes`: canonical tags, see [`normalize_tag`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price_cents: Cents,
    pub ingredients: Vec<String>,
    pub attributes: BTreeSet<String>,
}

impl Product {
    /// The text handed to an embedder for this product.
    pub fn search_text(&self) -> String {
        let attributes: Vec<&str> = self.attributes.iter().map(String::as_str).collect();
        format!(
            "{} | {} | {} | {} | {}",
            self.name,
            self.brand,
            self.category.replace('/', " "),
            self.ingredients.join(", "),
            attributes.join(", ")
        )
    }
}

/// Canonical attribute tag: trimmed, lower-case, `_` and inner whitespace
/// collapsed into single `-`.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonical category path: lower-case segments joined by `/`, empty
/// segments dropped, whitespace inside a segment collapsed.
pub fn normalize_category<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .flat_map(|s| s.as_ref().split('/'))
        .map(|seg| seg.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|seg| !seg.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a money amount such as `5`, `$4.5` or `4.79` into cents.
///
/// At most two fractional digits are accepted; anything else is `None`.
pub fn parse_amount(raw: &str) -> Option<Cents> {
    let s = raw.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || (s.contains('.') && frac.is_empty()) {
        return None;
    }
    let dollars: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    dollars.checked_mul(100)?.checked_add(cents)
}

/// `$5` for whole dollars, `$4.50` otherwise.
pub fn format_price(cents: Cents) -> String {
    if cents % 100 == 0 {
        format!("${}", cents / 100)
    } else {
        format!("${}.{:02}", cents / 100, cents % 100)
    }
}

/// Numeric product fields a predicate can compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Price,
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericField::Price => write!(f, "price"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// `lhs <op> rhs`
    pub fn holds(self, lhs: u64, rhs: u64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }

    /// Phrase used in explanations ("priced under $5").
    pub fn phrase(self) -> &'static str {
        match self {
            Comparison::Lt => "under",
            Comparison::Le => "at most",
            Comparison::Gt => "over",
            Comparison::Ge => "at least",
        }
    }
}

/// A single structured constraint derived from query text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    AttributeEquals(String),
    CategoryEquals(String),
    NumericComparison {
        field: NumericField,
        op: Comparison,
        /// Hundredths of the field unit (cents for price).
        value: u64,
    },
}

impl Predicate {
    pub fn price(op: Comparison, cents: Cents) -> Self {
        Predicate::NumericComparison { field: NumericField::Price, op, value: cents }
    }

    /// Rejects predicates no parser would produce, such as an empty tag.
    pub fn validate(&self) -> crate::error::Result<()> {
        match self {
            Predicate::AttributeEquals(tag) if tag.trim().is_empty() => Err(
                crate::error::Error::InvalidArgument("attribute predicate with empty tag".to_string()),
            ),
            Predicate::CategoryEquals(path) if path.trim().is_empty() => Err(
                crate::error::Error::InvalidArgument("category predicate with empty path".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::AttributeEquals(tag) => write!(f, "attribute = {tag}"),
            Predicate::CategoryEquals(path) => write!(f, "category = {path}"),
            Predicate::NumericComparison { field, op, value } => {
                write!(f, "{field} {} {}", op.symbol(), format_price(*value))
            }
        }
    }
}

/// A search request after constraint parsing.
///
/// `residual` holds the words no predicate consumed; it is what the
/// embedding index sees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub raw: String,
    pub residual: String,
    pub predicates: BTreeSet<Predicate>,
}

impl Query {
    /// Text for semantic lookup; falls back to the raw text when every word
    /// was turned into a predicate.
    pub fn semantic_text(&self) -> &str {
        if self.residual.trim().is_empty() { &self.raw } else { &self.residual }
    }
}

/// Indicates which retrieval path produced a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Vector,
    Graph,
    Both,
}

impl SourceKind {
    pub fn has_vector(self) -> bool {
        matches!(self, SourceKind::Vector | SourceKind::Both)
    }
}

/// One nearest-neighbour hit from an embedding index. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub product_id: ProductId,
    pub score: f32,
}

/// A product that satisfied every predicate the graph evaluator was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMatch {
    pub product_id: ProductId,
    pub satisfied: Vec<Predicate>,
}

/// A candidate before ranking. `similarity` is set only with vector origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub product_id: ProductId,
    pub source: SourceKind,
    pub similarity: Option<f32>,
    pub satisfied: Vec<Predicate>,
}

/// Terminal output of the fusion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub candidate: CandidateMatch,
    pub score: f32,
    pub explanation: String,
}

impl RankedResult {
    pub fn product_id(&self) -> ProductId {
        self.candidate.product_id
    }
}

/// Node kinds of the product knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Product,
    Brand,
    Category,
    Ingredient,
    Attribute,
    Price,
}

/// Typed graph node identity. The payload is the node's canonical name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Product(ProductId),
    Brand(String),
    Category(String),
    Ingredient(String),
    Attribute(String),
    Price(Cents),
}

impl NodeId {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeId::Product(_) => NodeKind::Product,
            NodeId::Brand(_) => NodeKind::Brand,
            NodeId::Category(_) => NodeKind::Category,
            NodeId::Ingredient(_) => NodeKind::Ingredient,
            NodeId::Attribute(_) => NodeKind::Attribute,
            NodeId::Price(_) => NodeKind::Price,
        }
    }

    pub fn as_product(&self) -> Option<ProductId> {
        match self {
            NodeId::Product(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Product(id) => write!(f, "Product({id})"),
            NodeId::Brand(name) => write!(f, "Brand({name})"),
            NodeId::Category(path) => write!(f, "Category({path})"),
            NodeId::Ingredient(name) => write!(f, "Ingredient({name})"),
            NodeId::Attribute(tag) => write!(f, "Attribute({tag})"),
            NodeId::Price(cents) => write!(f, "Price({})", format_price(*cents)),
        }
    }
}

/// Edge types of the product knowledge graph. Edges are undirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    MadeBy,
    InCategory,
    SubcategoryOf,
    HasIngredient,
    HasAttribute,
    Price,
}

impl EdgeType {
    pub fn label(self) -> &'static str {
        match self {
            EdgeType::MadeBy => "MADE_BY",
            EdgeType::InCategory => "IN_CATEGORY",
            EdgeType::SubcategoryOf => "SUBCATEGORY_OF",
            EdgeType::HasIngredient => "HAS_INGREDIENT",
            EdgeType::HasAttribute => "HAS_ATTRIBUTE",
            EdgeType::Price => "PRICE",
        }
    }
}
