use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::{format_count, format_currency};

/// One inventory row, using the column names of the uploaded sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Count")]
    pub count: i64,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Rows of one upload. Serializes as a plain JSON array of row objects,
/// which is the payload pushed to external systems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryBatch {
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotals {
    pub rows: usize,
    pub count: i64,
    pub value: f64,
}

impl CategoryTotals {
    pub fn display_count(&self) -> String {
        format_count(self.count)
    }

    pub fn display_value(&self) -> String {
        format_currency(self.value)
    }
}

impl InventoryBatch {
    /// Load rows from a JSON array file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse inventory file {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    pub fn filter_by_category(&self, category: &str) -> InventoryBatch {
        InventoryBatch {
            items: self
                .items
                .iter()
                .filter(|item| item.category == category)
                .cloned()
                .collect(),
        }
    }

    /// Row count, unit count and value of all rows. The unit count
    /// saturates at the `i64` bounds.
    pub fn totals(&self) -> CategoryTotals {
        self.items.iter().fold(CategoryTotals::default(), |acc, item| CategoryTotals {
            rows: acc.rows + 1,
            count: acc.count.saturating_add(item.count),
            value: acc.value + item.value,
        })
    }

    /// Total value per item, sorted by item name
    pub fn value_by_item(&self) -> Vec<(String, f64)> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for item in &self.items {
            *totals.entry(item.item.as_str()).or_insert(0.0) += item.value;
        }
        totals
            .into_iter()
            .map(|(item, value)| (item.to_string(), value))
            .collect()
    }

    /// Earliest and latest dated row, if any rows carry a date
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.items.iter().filter_map(|item| item.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> InventoryBatch {
        serde_json::from_value(json!([
            {"Item": "Widget", "Category": "Hardware", "Location": "North", "Count": 10, "Value": 150.0, "Date": "2024-03-01"},
            {"Item": "Gadget", "Category": "Electronics", "Location": "South", "Count": 4, "Value": 800.5},
            {"Item": "Widget", "Category": "Hardware", "Location": "South", "Count": 6, "Value": 90.0, "Date": "2024-01-15"},
            {"Item": "Cable", "Category": "Electronics", "Location": "North", "Count": 100, "Value": 250.0, "Date": "2024-02-10"}
        ]))
        .expect("sample rows parse")
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(sample().categories(), vec!["Hardware", "Electronics"]);
    }

    #[test]
    fn test_filter_and_totals() {
        let hardware = sample().filter_by_category("Hardware");
        assert_eq!(hardware.len(), 2);

        let totals = hardware.totals();
        assert_eq!(totals.rows, 2);
        assert_eq!(totals.count, 16);
        assert_eq!(totals.value, 240.0);
        assert_eq!(totals.display_value(), "$240.00");

        let electronics = sample().filter_by_category("Electronics").totals();
        assert_eq!(electronics.display_count(), "104");
        assert_eq!(electronics.display_value(), "$1,050.50");

        assert!(sample().filter_by_category("Toys").is_empty());
        assert_eq!(sample().filter_by_category("Toys").totals(), CategoryTotals::default());
    }

    #[test]
    fn test_totals_saturate_on_huge_counts() {
        let batch: InventoryBatch = serde_json::from_value(json!([
            {"Item": "Bolt", "Category": "Hardware", "Location": "North", "Count": i64::MAX, "Value": 1.0},
            {"Item": "Nut", "Category": "Hardware", "Location": "North", "Count": 1, "Value": 2.0}
        ]))
        .unwrap();

        let totals = batch.filter_by_category("Hardware").totals();
        assert_eq!(totals.rows, 2);
        assert_eq!(totals.count, i64::MAX);
        assert_eq!(totals.value, 3.0);
        assert_eq!(totals.display_count(), "9,223,372,036,854,775,807");
    }

    #[test]
    fn test_value_by_item() {
        assert_eq!(
            sample().value_by_item(),
            vec![
                ("Cable".to_string(), 250.0),
                ("Gadget".to_string(), 800.5),
                ("Widget".to_string(), 240.0),
            ]
        );
    }

    #[test]
    fn test_date_range() {
        let range = sample().date_range().unwrap();
        assert_eq!(range.0, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(range.1, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(sample().filter_by_category("Electronics").date_range(), Some((date, date)));
        assert!(InventoryBatch::default().date_range().is_none());
    }

    #[test]
    fn test_payload_is_array_of_rows() {
        let batch = sample().filter_by_category("Electronics");
        let payload = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            payload,
            json!([
                {"Item": "Gadget", "Category": "Electronics", "Location": "South", "Count": 4, "Value": 800.5},
                {"Item": "Cable", "Category": "Electronics", "Location": "North", "Count": 100, "Value": 250.0, "Date": "2024-02-10"}
            ])
        );
    }

    #[test]
    fn test_load_rejects_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, r#"[{"Item": "Widget", "Count": 3}]"#).unwrap();
        let err = InventoryBatch::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse inventory file"));

        assert!(InventoryBatch::load(&dir.path().join("absent.json")).is_err());
    }
}
