//! Salary component model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency assumed when none is recorded.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Frequency assumed for an employee's base salary when none is recorded.
pub const DEFAULT_EMPLOYEE_PAY_FREQUENCY: &str = "annually";

/// Frequency assumed for a salary component when none is recorded.
pub const DEFAULT_COMPONENT_FREQUENCY: &str = "Monthly";

/// One line of an employee's compensation (base salary, bonus, allowance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    /// Unique identifier.
    pub id: u64,
    /// The employee being paid.
    pub employee_id: u64,
    /// Kind of component (e.g. "Base Salary").
    #[serde(rename = "type")]
    pub component_type: String,
    /// Amount per period.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Payment frequency.
    pub frequency: Option<String>,
    /// When the component takes effect.
    pub effective_date: NaiveDate,
}

impl SalaryComponent {
    /// Formats the component as `amount currency (frequency)`.
    ///
    /// # Example
    ///
    /// ```
    /// use hcm_assistant::models::SalaryComponent;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let component = SalaryComponent {
    ///     id: 1,
    ///     employee_id: 1,
    ///     component_type: "Base Salary".to_string(),
    ///     amount: Decimal::new(95000, 0),
    ///     currency: None,
    ///     frequency: None,
    ///     effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    /// };
    /// assert_eq!(component.display_amount(), "95000.00 USD (Monthly)");
    /// ```
    pub fn display_amount(&self) -> String {
        format!(
            "{:.2} {} ({})",
            self.amount.round_dp(2),
            self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
            self.frequency
                .as_deref()
                .unwrap_or(DEFAULT_COMPONENT_FREQUENCY)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_serializes_type_field() {
        let component = SalaryComponent {
            id: 3,
            employee_id: 2,
            component_type: "Bonus".to_string(),
            amount: Decimal::new(250050, 2),
            currency: Some("GBP".to_string()),
            frequency: Some("Quarterly".to_string()),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "Bonus");
        assert_eq!(json["amount"], "2500.50");
        assert_eq!(component.display_amount(), "2500.50 GBP (Quarterly)");
    }
}
