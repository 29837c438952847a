//! Budget table — ordered line items plus the rendered rows and total.
//!
//! Every mutation is followed by a full `render()`; nothing is diffed.

use serde_json::Value;

use crate::errors::{ClientError, MISSING_FIELDS};
use crate::models::{Amount, BudgetItem};

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetRow {
    pub index: usize,
    pub item: String,
    pub description: String,
    pub amount: String,
}

/// Rendered view of the whole table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBudget {
    pub rows: Vec<BudgetRow>,
    pub total: String,
}

/// Values captured by the add-item form, before validation.
#[derive(Debug, Clone, Default)]
pub struct BudgetItemDraft {
    pub item: String,
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetTable {
    items: Vec<BudgetItem>,
}

impl BudgetTable {
    pub fn items(&self) -> &[BudgetItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replaces the items from a service value: either a list of item
    /// records or a `{name: amount}` mapping. Returns false (leaving the
    /// table untouched) for any other shape.
    pub fn load(&mut self, budget: &Value) -> bool {
        match budget {
            Value::Array(entries) => {
                self.items = entries.iter().map(item_from_entry).collect();
                true
            }
            Value::Object(map) => {
                self.items = map
                    .iter()
                    .map(|(name, amount)| BudgetItem {
                        item: name.clone(),
                        description: String::new(),
                        amount: Amount::from(amount.clone()),
                        ..Default::default()
                    })
                    .collect();
                true
            }
            other => {
                tracing::warn!("Ignoring budget of unexpected shape: {other}");
                false
            }
        }
    }

    /// Appends a new item; every field must be filled in.
    pub fn add(&mut self, draft: BudgetItemDraft) -> Result<(), ClientError> {
        if draft.item.is_empty() || draft.description.is_empty() || draft.amount.is_empty() {
            return Err(ClientError::Validation(MISSING_FIELDS.to_string()));
        }
        self.items.push(BudgetItem {
            item: draft.item,
            description: draft.description,
            amount: Amount::Text(draft.amount),
            ..Default::default()
        });
        Ok(())
    }

    /// Removes the item at its current display index. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<BudgetItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.amount.value()).sum()
    }

    pub fn render(&self) -> RenderedBudget {
        let rows = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| BudgetRow {
                index,
                item: item.item.clone(),
                description: item.description.clone(),
                amount: format_currency(item.amount.value()),
            })
            .collect();

        RenderedBudget {
            rows,
            total: format_currency(self.total()),
        }
    }
}

pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

fn item_from_entry(entry: &Value) -> BudgetItem {
    match serde_json::from_value::<BudgetItem>(entry.clone()) {
        Ok(item) => item,
        Err(e) => {
            tracing::warn!("Budget entry is not an item record ({e}): {entry}");
            BudgetItem {
                item: match entry {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(item: &str, description: &str, amount: &str) -> BudgetItemDraft {
        BudgetItemDraft {
            item: item.to_string(),
            description: description.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_mapping_load_renders_expected_total() {
        let mut table = BudgetTable::default();
        assert!(table.load(&json!({"Printing": 150, "Travel": 75.5})));

        assert_eq!(table.len(), 2);
        for item in table.items() {
            assert!(item.description.is_empty());
        }
        let printing = table.items().iter().find(|i| i.item == "Printing").unwrap();
        assert_eq!(printing.amount, Amount::from(json!(150)));

        assert_eq!(table.render().total, "$225.50");
    }

    #[test]
    fn test_mapping_load_keeps_service_order() {
        let mut table = BudgetTable::default();
        table.load(&json!({"Travel": 75.5, "Printing": 150, "Aardvark": 10}));

        let names: Vec<String> = table.render().rows.into_iter().map(|r| r.item).collect();
        assert_eq!(names, vec!["Travel", "Printing", "Aardvark"]);
    }

    #[test]
    fn test_list_load_keeps_extra_record_keys() {
        let mut table = BudgetTable::default();
        table.load(&json!([
            {"item": "Staff", "description": "Coordinator", "amount": 1200, "category": "personnel"}
        ]));

        let item = &table.items()[0];
        assert_eq!(item.extra.get("category"), Some(&json!("personnel")));
        assert_eq!(
            serde_json::to_value(item).unwrap(),
            json!({"item": "Staff", "description": "Coordinator", "amount": 1200, "category": "personnel"})
        );
    }

    #[test]
    fn test_list_load_replaces_existing_items_in_order() {
        let mut table = BudgetTable::default();
        table.add(draft("Old", "stale", "1")).unwrap();

        table.load(&json!([
            {"item": "Staff", "description": "Coordinator", "amount": "1200"},
            {"item": "Food", "description": "Groceries", "amount": 800.25}
        ]));

        let rendered = table.render();
        assert_eq!(rendered.rows.len(), 2);
        assert_eq!(rendered.rows[0].item, "Staff");
        assert_eq!(rendered.rows[0].amount, "$1200.00");
        assert_eq!(rendered.rows[1].amount, "$800.25");
        assert_eq!(rendered.total, "$2000.25");
    }

    #[test]
    fn test_unexpected_shape_leaves_table_untouched() {
        let mut table = BudgetTable::default();
        table.add(draft("Keep", "me", "5")).unwrap();
        assert!(!table.load(&json!("no budget")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_non_numeric_amounts_count_as_zero() {
        let mut table = BudgetTable::default();
        table.add(draft("Printing", "Flyers", "150")).unwrap();
        table.add(draft("Misc", "Unknown", "TBD")).unwrap();
        table.add(draft("Travel", "Mileage", "75.5")).unwrap();

        let rendered = table.render();
        assert_eq!(rendered.rows[1].amount, "$0.00");
        assert_eq!(rendered.total, "$225.50");
    }

    #[test]
    fn test_add_requires_every_field() {
        let mut table = BudgetTable::default();
        let err = table.add(draft("Printing", "", "150")).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref m) if m == MISSING_FIELDS));
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let mut table = BudgetTable::default();
        for name in ["a", "b", "c", "d"] {
            table.add(draft(name, "x", "1")).unwrap();
        }

        let removed = table.remove(1).unwrap();
        assert_eq!(removed.item, "b");
        let names: Vec<&str> = table.items().iter().map(|i| i.item.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);

        assert!(table.remove(10).is_none());
        assert_eq!(table.len(), 3);

        let rendered = table.render();
        let indices: Vec<usize> = rendered.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
