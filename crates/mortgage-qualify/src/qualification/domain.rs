use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{QualificationError, QualificationResult};
use super::product::LoanProgram;

const MIN_FICO: u16 = 300;
const MAX_FICO: u16 = 850;

/// Longest amortization accepted by the payment math.
pub const MAX_TERM_YEARS: u32 = 50;

/// Borrower snapshot supplied per calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub annual_income: f64,
    pub monthly_debts: f64,
    pub fico: u16,
    pub ltv: f64,
}

impl FinancialProfile {
    pub fn monthly_income(&self) -> f64 {
        self.annual_income / 12.0
    }

    /// Non-housing debt as a percentage of gross monthly income.
    pub fn non_housing_ratio(&self) -> f64 {
        let income = self.monthly_income();
        if income <= 0.0 {
            return 0.0;
        }
        self.monthly_debts / income * 100.0
    }

    pub fn validate(&self) -> QualificationResult<()> {
        if !self.annual_income.is_finite() || self.annual_income <= 0.0 {
            return Err(QualificationError::invalid(
                "annualIncome",
                format!("must be greater than zero (found {})", self.annual_income),
            ));
        }
        if !self.monthly_debts.is_finite() || self.monthly_debts < 0.0 {
            return Err(QualificationError::invalid(
                "monthlyDebts",
                format!("must not be negative (found {})", self.monthly_debts),
            ));
        }
        validate_fico(self.fico)?;
        validate_ltv(self.ltv)
    }
}

pub(crate) fn validate_fico(fico: u16) -> QualificationResult<()> {
    if (MIN_FICO..=MAX_FICO).contains(&fico) {
        Ok(())
    } else {
        Err(QualificationError::invalid(
            "fico",
            format!("must be between {MIN_FICO} and {MAX_FICO} (found {fico})"),
        ))
    }
}

pub(crate) fn validate_ltv(ltv: f64) -> QualificationResult<()> {
    if ltv.is_finite() && ltv > 0.0 && ltv <= 100.0 {
        Ok(())
    } else {
        Err(QualificationError::invalid(
            "ltv",
            format!("must be within (0, 100] (found {ltv})"),
        ))
    }
}

/// Raw factor selections as captured by the intake wizard.
///
/// Keys and values are kept as strings so stored selections from older
/// releases deserialize untouched; parsing happens in the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompensatingFactorSelection(pub BTreeMap<String, String>);

impl CompensatingFactorSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the selected value, `"none"` when the key was never set.
    pub fn value(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("none")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CompensatingFactorSelection {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Resolved loan terms consumed by the purchase-price inversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// Annual property tax as a percentage of the purchase price.
    pub property_tax_rate: f64,
    pub annual_insurance: f64,
    pub down_payment_percent: f64,
    /// Annual mortgage insurance as a percentage of the loan amount.
    pub pmi_rate: f64,
    pub interest_rate: f64,
    pub term_years: u32,
}

impl LoanTerms {
    pub fn validate(&self) -> QualificationResult<()> {
        non_negative("propertyTaxRate", self.property_tax_rate)?;
        non_negative("annualInsurance", self.annual_insurance)?;
        non_negative("pmiRate", self.pmi_rate)?;
        non_negative("interestRate", self.interest_rate)?;
        if !self.down_payment_percent.is_finite()
            || self.down_payment_percent < 0.0
            || self.down_payment_percent >= 100.0
        {
            return Err(QualificationError::invalid(
                "downPaymentPercent",
                format!("must be within [0, 100) (found {})", self.down_payment_percent),
            ));
        }
        if !(1..=MAX_TERM_YEARS).contains(&self.term_years) {
            return Err(QualificationError::invalid(
                "termYears",
                format!(
                    "must be between 1 and {MAX_TERM_YEARS} years (found {})",
                    self.term_years
                ),
            ));
        }
        Ok(())
    }

    /// Number of monthly payments.
    pub fn term_months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }
}

fn non_negative(field: &'static str, value: f64) -> QualificationResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(QualificationError::invalid(
            field,
            format!("must be a non-negative number (found {value})"),
        ))
    }
}

/// Complete input for one solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtiRequest {
    pub profile: FinancialProfile,
    #[serde(default)]
    pub factors: CompensatingFactorSelection,
    pub program: LoanProgram,
    pub terms: LoanTerms,
    #[serde(default, rename = "proposedPITI", skip_serializing_if = "Option::is_none")]
    pub proposed_piti: Option<f64>,
}

impl DtiRequest {
    pub fn validate(&self) -> QualificationResult<()> {
        self.profile.validate()?;
        self.terms.validate()?;
        if let Some(piti) = self.proposed_piti {
            if !piti.is_finite() || piti < 0.0 {
                return Err(QualificationError::invalid(
                    "proposedPITI",
                    format!("must be a non-negative number (found {piti})"),
                ));
            }
        }
        Ok(())
    }
}

/// Front-end/back-end percentage pair, used for both ceilings and actuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedDti {
    pub front_end: f64,
    pub back_end: f64,
}

pub type ActualDti = AllowedDti;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DtiFlag {
    ExceedsFrontEnd,
    ExceedsBackEnd,
    WithinLimits,
}

/// Audit trail accompanying each solver result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationDetails {
    pub monthly_income: f64,
    pub max_housing_payment: f64,
    pub available_after_debts: f64,
    pub factor_adjustments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtiResult {
    pub allowed: AllowedDti,
    pub actual: ActualDti,
    #[serde(rename = "maxPITI")]
    pub max_piti: f64,
    pub strong_factor_count: u8,
    pub flags: Vec<DtiFlag>,
    pub calculation_details: CalculationDetails,
}

impl DtiResult {
    pub fn has_flag(&self, flag: DtiFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn within_limits(&self) -> bool {
        self.has_flag(DtiFlag::WithinLimits)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePriceResult {
    pub max_purchase_price: u64,
    pub max_loan_amount: u64,
    pub dti_result: DtiResult,
}
