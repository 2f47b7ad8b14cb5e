use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

/// An expense record stored as an RDF resource in a pod.
///
/// `identifier` is both where the resource lives and how it is looked up.
/// Field names follow the REST payload (`merchantProvider`, `expenseDate`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub identifier: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Links to receipt files (non-RDF resources) attached to this expense.
    #[serde(default)]
    pub receipts: BTreeSet<Url>,
}

impl Expense {
    /// An expense with only its identifier set.
    pub fn new(identifier: Url) -> Self {
        Self {
            identifier,
            merchant_provider: None,
            expense_date: None,
            description: None,
            total: None,
            currency: None,
            category: None,
            receipts: BTreeSet::new(),
        }
    }

    /// Attach a receipt link. Returns false if it was already attached.
    pub fn add_receipt(&mut self, receipt: Url) -> bool {
        self.receipts.insert(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_deserializes_minimal_payload() {
        let expense: Expense =
            serde_json::from_str(r#"{"identifier":"https://pod.example/expenses/1"}"#).unwrap();
        assert_eq!(expense.identifier.as_str(), "https://pod.example/expenses/1");
        assert!(expense.receipts.is_empty());
        assert!(expense.total.is_none());
    }

    #[test]
    fn test_expense_camel_case_fields() {
        let expense: Expense = serde_json::from_value(serde_json::json!({
            "identifier": "https://pod.example/expenses/2",
            "merchantProvider": "Example Restaurant",
            "expenseDate": "2022-12-28",
            "description": "Team Lunch",
            "total": 100.5,
            "currency": "USD",
            "category": "Travel and Entertainment",
            "receipts": ["https://pod.example/receipts/a.png"]
        }))
        .unwrap();

        assert_eq!(expense.merchant_provider.as_deref(), Some("Example Restaurant"));
        assert_eq!(expense.expense_date, NaiveDate::from_ymd_opt(2022, 12, 28));
        assert_eq!(expense.total, Some(100.5));
        assert_eq!(expense.receipts.len(), 1);

        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["merchantProvider"], "Example Restaurant");
        assert_eq!(json["expenseDate"], "2022-12-28");
    }

    #[test]
    fn test_add_receipt_keeps_one_copy() {
        let mut expense = Expense::new(Url::parse("https://pod.example/expenses/1").unwrap());
        let receipt = Url::parse("https://pod.example/receipts/r1.jpg").unwrap();

        assert!(expense.add_receipt(receipt.clone()));
        assert!(!expense.add_receipt(receipt));
        assert_eq!(expense.receipts.len(), 1);
    }

    #[test]
    fn test_expense_rejects_relative_identifier() {
        let result = serde_json::from_str::<Expense>(r#"{"identifier":"expenses/1"}"#);
        assert!(result.is_err());
    }
}
