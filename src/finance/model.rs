//! Bill tracking and budget calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of recurring bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillCategory {
    Utilities,
    RentMortgage,
    Insurance,
    Subscriptions,
    Loan,
    Other,
}

impl BillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillCategory::Utilities => "utilities",
            BillCategory::RentMortgage => "rent_mortgage",
            BillCategory::Insurance => "insurance",
            BillCategory::Subscriptions => "subscriptions",
            BillCategory::Loan => "loan",
            BillCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "utilities" => BillCategory::Utilities,
            "rent_mortgage" => BillCategory::RentMortgage,
            "insurance" => BillCategory::Insurance,
            "subscriptions" => BillCategory::Subscriptions,
            "loan" => BillCategory::Loan,
            _ => BillCategory::Other,
        }
    }
}

impl Default for BillCategory {
    fn default() -> Self {
        BillCategory::Utilities
    }
}

/// A monthly bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    /// Day of month, 1-31.
    pub due_day: u8,
    pub category: BillCategory,
    pub is_recurring: bool,
    pub paid_this_month: bool,
}

impl Bill {
    /// Create a recurring, unpaid bill. Returns `None` when the due day is
    /// outside 1-31 or the amount is negative.
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        amount: Decimal,
        due_day: u8,
        category: BillCategory,
    ) -> Option<Self> {
        if !(1..=31).contains(&due_day) || amount.is_sign_negative() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            amount,
            due_day,
            category,
            is_recurring: true,
            paid_this_month: false,
        })
    }
}

/// Sum of all bill amounts.
pub fn monthly_total(bills: &[Bill]) -> Decimal {
    bills.iter().map(|b| b.amount).sum()
}

/// Body of `POST /api/bills`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBillRequest {
    pub name: String,
    pub amount: Decimal,
    pub due_day: u8,
    #[serde(default)]
    pub category: BillCategory,
}

/// One line of the budget calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub label: &'static str,
    pub percent: u32,
    pub amount: Decimal,
}

/// Fixed percentage split of a monthly income.
const BUDGET_SPLIT: &[(&str, u32)] = &[
    ("Housing", 30),
    ("Food", 15),
    ("Transportation", 10),
    ("Savings", 20),
    ("Entertainment", 10),
    ("Miscellaneous", 15),
];

/// Split `monthly_income` across the fixed budget categories.
pub fn budget_allocation(monthly_income: Decimal) -> Vec<BudgetLine> {
    BUDGET_SPLIT
        .iter()
        .map(|&(label, percent)| BudgetLine {
            label,
            percent,
            amount: (monthly_income * Decimal::from(percent) / Decimal::ONE_HUNDRED).round_dp(2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn bill_rejects_bad_due_day_and_negative_amount() {
        let user = Uuid::new_v4();
        assert!(Bill::new(user, "Rent", dec!(1200), 0, BillCategory::RentMortgage).is_none());
        assert!(Bill::new(user, "Rent", dec!(1200), 32, BillCategory::RentMortgage).is_none());
        assert!(Bill::new(user, "Rent", dec!(-1), 5, BillCategory::RentMortgage).is_none());
        let bill = Bill::new(user, "Rent", dec!(1200), 1, BillCategory::RentMortgage).unwrap();
        assert!(bill.is_recurring);
        assert!(!bill.paid_this_month);
    }

    #[test]
    fn monthly_total_sums_amounts() {
        let user = Uuid::new_v4();
        let bills = vec![
            Bill::new(user, "Power", dec!(80.50), 10, BillCategory::Utilities).unwrap(),
            Bill::new(user, "Phone", dec!(19.50), 20, BillCategory::Subscriptions).unwrap(),
        ];
        assert_eq!(monthly_total(&bills), dec!(100.00));
        assert_eq!(monthly_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn budget_allocation_sums_to_income() {
        let lines = budget_allocation(dec!(3000));
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0].label, "Housing");
        assert_eq!(lines[0].amount, dec!(900));
        let savings = lines.iter().find(|l| l.label == "Savings").unwrap();
        assert_eq!(savings.amount, dec!(600));
        let total: Decimal = lines.iter().map(|l| l.amount).sum();
        assert_eq!(total, dec!(3000));
        assert_eq!(lines.iter().map(|l| l.percent).sum::<u32>(), 100);
    }

    #[test]
    fn bill_category_roundtrip() {
        assert_eq!(BillCategory::parse("rent_mortgage"), BillCategory::RentMortgage);
        assert_eq!(BillCategory::parse("???"), BillCategory::Other);
        assert_eq!(BillCategory::default(), BillCategory::Utilities);
    }
}
