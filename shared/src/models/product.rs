//! Product Model

use serde::{Deserialize, Deserializer, Serialize};

/// Publication status of a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    /// Map the store's integer status flag (1 = active)
    pub fn from_flag(flag: i64) -> Self {
        if flag == 1 { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Product row for one language
///
/// Price columns keep the raw text the store delivered. They may be
/// missing, zero, or malformed; parsing is left to the price converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Manufacturer part number (the store's model column)
    #[serde(default)]
    pub mpn: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, deserialize_with = "status_flag")]
    pub status: ProductStatus,
    #[serde(default, deserialize_with = "raw_amount")]
    pub price: Option<String>,
    /// Special offer price, absent when no active special exists
    #[serde(default, deserialize_with = "raw_amount")]
    pub sale_price: Option<String>,
    /// Tax rate in percentage (e.g. "21.0000" = 21%)
    #[serde(default, deserialize_with = "raw_amount")]
    pub tax_rate: Option<String>,
    /// Image path relative to the store's images directory
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl Product {
    /// Create an active product with only the identifying fields set
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            brand: None,
            mpn: None,
            quantity: 0,
            status: ProductStatus::Active,
            price: None,
            sale_price: None,
            tax_rate: None,
            image_path: String::new(),
            category_ids: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

}

/// Accept either the status name or the store's integer flag
fn status_flag<'de, D>(deserializer: D) -> Result<ProductStatus, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Named(ProductStatus),
        Flag(i64),
    }

    Ok(match Status::deserialize(deserializer)? {
        Status::Named(status) => status,
        Status::Flag(flag) => ProductStatus::from_flag(flag),
    })
}

/// Accept amounts written either as JSON numbers or as strings
fn raw_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Amount>::deserialize(deserializer)?.map(|amount| match amount {
        Amount::Text(text) => text,
        Amount::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_flag() {
        assert_eq!(ProductStatus::from_flag(1), ProductStatus::Active);
        assert_eq!(ProductStatus::from_flag(0), ProductStatus::Inactive);
        assert_eq!(ProductStatus::from_flag(2), ProductStatus::Inactive);
    }

    #[test]
    fn test_deserialize_numeric_and_text_amounts() {
        let json = r#"{
            "id": 7,
            "title": "Trail Shoe",
            "price": 49.9,
            "sale_price": null,
            "tax_rate": "21.0000",
            "status": "inactive"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.price.as_deref(), Some("49.9"));
        assert_eq!(product.sale_price, None);
        assert_eq!(product.tax_rate.as_deref(), Some("21.0000"));
        assert_eq!(product.status, ProductStatus::Inactive);
        assert!(product.category_ids.is_empty());
    }

    #[test]
    fn test_deserialize_status_flag() {
        let active: Product = serde_json::from_str(r#"{"id": 1, "title": "A", "status": 1}"#).unwrap();
        let hidden: Product = serde_json::from_str(r#"{"id": 2, "title": "B", "status": 0}"#).unwrap();
        let missing: Product = serde_json::from_str(r#"{"id": 3, "title": "C"}"#).unwrap();

        assert!(active.is_active());
        assert!(!hidden.is_active());
        assert!(missing.is_active());
    }
}
