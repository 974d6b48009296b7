//! Entity types of the star schema

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three record sets the pipeline knows about.
///
/// Variant order is the load order: dimensions first, then the fact table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Customer dimension
    Customer,
    /// Product dimension
    Product,
    /// Sale fact
    Sale,
}

impl EntityKind {
    /// All entities in load order
    pub const ALL: [EntityKind; 3] = [EntityKind::Customer, EntityKind::Product, EntityKind::Sale];

    /// Warehouse table name (unqualified)
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
            EntityKind::Sale => "sale",
        }
    }

    /// Measure column screened by IQR outlier removal
    pub fn outlier_column(&self) -> &'static str {
        match self {
            EntityKind::Customer => "reward_points",
            EntityKind::Product => "price",
            EntityKind::Sale => "total_amount",
        }
    }

    /// File stem used for prepared output (`customers_prepared.csv`)
    pub fn prepared_file_name(&self) -> String {
        format!("{}s_prepared.csv", self.table_name())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "customers" => Ok(EntityKind::Customer),
            "product" | "products" => Ok(EntityKind::Product),
            "sale" | "sales" => Ok(EntityKind::Sale),
            _ => Err(CoreError::UnknownEntity {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_order_puts_dimensions_first() {
        let mut kinds = vec![EntityKind::Sale, EntityKind::Product, EntityKind::Customer];
        kinds.sort();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }

    #[test]
    fn test_from_str_accepts_plural() {
        assert_eq!("Sales".parse::<EntityKind>().unwrap(), EntityKind::Sale);
        assert_eq!("customer".parse::<EntityKind>().unwrap(), EntityKind::Customer);
        assert!("campaign".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_prepared_file_name() {
        assert_eq!(
            EntityKind::Product.prepared_file_name(),
            "products_prepared.csv"
        );
    }
}
