//! Static column mappings from raw headers to warehouse columns
//!
//! Every entity has a fixed, enumerated table of [`ColumnSpec`]s. Raw headers
//! are reduced to snake_case and looked up against each spec's name and
//! aliases. Column kinds come from this table and are never inferred from the
//! data, so identifier columns like `CampaignID` are always treated as
//! numeric identifiers no matter how the source spells the header.

use crate::entity::EntityKind;
use crate::field::{DateFormats, FieldError, FieldKind, SENTINEL};
use crate::value::Value;
use serde::Serialize;

/// What a column means for the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "references")]
pub enum ColumnRole {
    /// Identity key of the entity
    PrimaryKey,
    /// Reference to a dimension's primary key
    ForeignKey(EntityKind),
    /// Plain attribute or measure
    Attribute,
}

/// Range check applied to numeric values after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConstraint {
    /// No range check
    None,
    /// Strictly greater than zero
    Positive,
    /// Zero or greater
    NonNegative,
    /// Between `min` and `max`, inclusive
    Range { min: i64, max: i64 },
}

impl ValueConstraint {
    /// Check a normalized value. Null and non-numeric values always pass.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let Some(n) = value.as_f64() else {
            return Ok(());
        };
        match self {
            ValueConstraint::None => Ok(()),
            ValueConstraint::Positive if n > 0.0 => Ok(()),
            ValueConstraint::Positive => Err(format!("{} must be greater than 0", value)),
            ValueConstraint::NonNegative if n >= 0.0 => Ok(()),
            ValueConstraint::NonNegative => Err(format!("{} must not be negative", value)),
            ValueConstraint::Range { min, max } if (*min as f64..=*max as f64).contains(&n) => {
                Ok(())
            }
            ValueConstraint::Range { min, max } => {
                Err(format!("{} must be between {} and {}", value, min, max))
            }
        }
    }
}

/// Canonical spellings of a categorical text column.
///
/// Applied after text normalization, so every entry is uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    /// Canonical values
    pub values: &'static [&'static str],
    /// Alternative spellings and the canonical value they stand for
    pub synonyms: &'static [(&'static str, &'static str)],
    /// Values outside `values` become the sentinel; otherwise they are kept
    pub closed: bool,
}

impl Vocabulary {
    /// Map a normalized value onto its canonical spelling
    pub fn canonicalize(&self, value: Value) -> Value {
        let replacement = value.as_str().and_then(|text| {
            match self.synonyms.iter().find(|(alt, _)| *alt == text) {
                Some((_, canonical)) => Some(*canonical),
                None if self.closed && text != SENTINEL && !self.values.contains(&text) => {
                    Some(SENTINEL)
                }
                None => None,
            }
        });
        replacement.map_or(value, Value::from)
    }
}

const REGIONS: Vocabulary = Vocabulary {
    values: &["EAST", "WEST", "NORTH", "SOUTH", "SOUTH-WEST"],
    synonyms: &[
        ("SOUTH WEST", "SOUTH-WEST"),
        ("SOUTHWEST", "SOUTH-WEST"),
        ("SOUTH-WESTERN", "SOUTH-WEST"),
    ],
    closed: false,
};

const LOYALTY_TIERS: Vocabulary = Vocabulary {
    values: &["BRONZE", "SILVER", "GOLD"],
    synonyms: &[],
    closed: true,
};

/// One warehouse column and how raw values map onto it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Warehouse column name (snake_case)
    pub name: &'static str,
    /// Normalization kind
    pub kind: FieldKind,
    /// Key role in the star schema
    #[serde(flatten)]
    pub role: ColumnRole,
    /// A record without a usable value is rejected
    pub required: bool,
    /// Range check on numeric values
    pub constraint: ValueConstraint,
    /// Alternative snake_case header names accepted for this column
    pub aliases: &'static [&'static str],
    /// Canonical value set for categorical text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vocabulary>,
}

impl ColumnSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            role: ColumnRole::Attribute,
            required: false,
            constraint: ValueConstraint::None,
            aliases: &[],
            vocabulary: None,
        }
    }

    const fn primary_key(mut self) -> Self {
        self.role = ColumnRole::PrimaryKey;
        self.required = true;
        self
    }

    const fn references(mut self, dimension: EntityKind) -> Self {
        self.role = ColumnRole::ForeignKey(dimension);
        self.required = true;
        self
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn constraint(mut self, constraint: ValueConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Normalize a raw cell for this column, then canonicalize categories
    pub fn normalize(&self, raw: Option<&str>, formats: &DateFormats) -> Result<Value, FieldError> {
        let value = crate::field::normalize(raw, self.kind, formats)?;
        Ok(match &self.vocabulary {
            Some(vocabulary) => vocabulary.canonicalize(value),
            None => value,
        })
    }

    /// Check a normalized value against the column type and constraint
    pub fn check(&self, value: &Value) -> Result<(), String> {
        self.kind.check_range(value)?;
        self.constraint.check(value)
    }

    /// SQL type used for this column in the warehouse
    pub fn sql_type(&self) -> &'static str {
        self.kind.sql_type()
    }

    /// True when `header` (already snake_cased) names this column
    fn matches(&self, header: &str) -> bool {
        self.name == header || self.aliases.contains(&header)
    }

    /// Like [`matches`](Self::matches) but ignoring underscores, so
    /// `customerid` still finds `customer_id`
    fn matches_compact(&self, compact: &str) -> bool {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .any(|name| name.replace('_', "") == compact)
    }
}

use FieldKind::{Date, Decimal, Flag, Integer, NumericIdentifier, Text};

const CUSTOMER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("customer_id", NumericIdentifier).primary_key(),
    ColumnSpec::new("first_name", Text),
    ColumnSpec::new("last_name", Text),
    ColumnSpec::new("customer_name", Text).aliases(&["name", "full_name"]),
    ColumnSpec::new("email", Text).aliases(&["email_address"]),
    ColumnSpec::new("city", Text),
    ColumnSpec::new("state", Text),
    ColumnSpec::new("region", Text).vocabulary(REGIONS),
    ColumnSpec::new("loyalty_tier", Text)
        .aliases(&["tier"])
        .vocabulary(LOYALTY_TIERS),
    ColumnSpec::new("join_date", Date).aliases(&["signup_date"]),
    ColumnSpec::new("reward_points", Integer).constraint(ValueConstraint::NonNegative),
];

const PRODUCT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("product_id", NumericIdentifier).primary_key(),
    ColumnSpec::new("product_name", Text).aliases(&["name"]),
    ColumnSpec::new("category", Text),
    ColumnSpec::new("price", Decimal)
        .constraint(ValueConstraint::NonNegative)
        .aliases(&["unit_price"]),
    ColumnSpec::new("rating", Decimal).constraint(ValueConstraint::Range { min: 1, max: 5 }),
    ColumnSpec::new("seasonal", Flag),
];

const SALE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("sale_id", NumericIdentifier)
        .primary_key()
        .aliases(&["transaction_id"]),
    ColumnSpec::new("sale_date", Date).required(),
    ColumnSpec::new("customer_id", NumericIdentifier).references(EntityKind::Customer),
    ColumnSpec::new("product_id", NumericIdentifier).references(EntityKind::Product),
    ColumnSpec::new("campaign_id", NumericIdentifier),
    ColumnSpec::new("quantity", Integer)
        .required()
        .constraint(ValueConstraint::Positive)
        .aliases(&["items_purchased"]),
    ColumnSpec::new("total_amount", Decimal)
        .required()
        .constraint(ValueConstraint::NonNegative)
        .aliases(&["sale_amount"]),
    ColumnSpec::new("store_id", NumericIdentifier),
    ColumnSpec::new("store_credit_card", Flag),
];

/// The static column table of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaMapping {
    entity: EntityKind,
    columns: &'static [ColumnSpec],
}

impl SchemaMapping {
    /// Mapping for an entity
    pub fn for_entity(entity: EntityKind) -> Self {
        let columns = match entity {
            EntityKind::Customer => CUSTOMER_COLUMNS,
            EntityKind::Product => PRODUCT_COLUMNS,
            EntityKind::Sale => SALE_COLUMNS,
        };
        Self { entity, columns }
    }

    /// The entity this mapping belongs to
    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// All columns in warehouse order
    pub fn columns(&self) -> &'static [ColumnSpec] {
        self.columns
    }

    /// Look up a column by warehouse name
    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key columns, in order
    pub fn primary_key(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.role == ColumnRole::PrimaryKey)
    }

    /// Foreign key columns with the dimension they reference
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static ColumnSpec, EntityKind)> {
        self.columns.iter().filter_map(|c| match c.role {
            ColumnRole::ForeignKey(dimension) => Some((c, dimension)),
            _ => None,
        })
    }

    /// Resolve a raw header to its column.
    ///
    /// Returns `None` for unmapped headers; callers drop those columns.
    pub fn resolve(&self, raw_header: &str) -> Option<&'static ColumnSpec> {
        let header = snake_case(raw_header);
        if header.is_empty() {
            return None;
        }
        if let Some(spec) = self.columns.iter().find(|c| c.matches(&header)) {
            return Some(spec);
        }
        let compact = header.replace('_', "");
        self.columns.iter().find(|c| c.matches_compact(&compact))
    }
}

/// Convert a raw header to snake_case.
///
/// Splits on whitespace and punctuation, and on lower-to-upper camel-case
/// boundaries. Runs of capitals stay together (`CampaignID` is
/// `campaign_id`, `HTTPServer` is `http_server`).
///
/// # Examples
/// ```
/// use sm_core::mapping::snake_case;
/// assert_eq!(snake_case("CampaignID"), "campaign_id");
/// assert_eq!(snake_case("Customer Name"), "customer_name");
/// assert_eq!(snake_case("JoinDate"), "join_date");
/// ```
pub fn snake_case(raw: &str) -> String {
    let chars: Vec<char> = raw.trim().trim_start_matches('\u{feff}').chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }

        out.extend(c.to_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[path = "mapping_test.rs"]
mod tests;
