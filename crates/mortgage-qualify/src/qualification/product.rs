use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{AllowedDti, FinancialProfile};
use super::error::QualificationError;
use super::factors::FactorKey;
use super::limits;

/// Loan programs supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LoanProgram {
    Fha,
    Conventional,
}

/// Fixed qualification thresholds for one program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRules {
    pub program: LoanProgram,
    pub min_fico: u16,
    pub min_annual_income: f64,
    /// Ceiling used by the standalone qualification check only.
    pub max_back_end: f64,
    pub min_down_payment: f64,
    pub max_ltv: f64,
    pub default_limits: AllowedDti,
    pub specific_factors: &'static [FactorKey],
}

static FHA_RULES: ProductRules = ProductRules {
    program: LoanProgram::Fha,
    min_fico: 580,
    min_annual_income: 12_000.0,
    max_back_end: 57.0,
    min_down_payment: 3.5,
    max_ltv: 96.5,
    default_limits: AllowedDti {
        front_end: 31.0,
        back_end: 43.0,
    },
    specific_factors: &[
        FactorKey::ResidualIncome,
        FactorKey::HousingPaymentIncrease,
        FactorKey::CashReserves,
        FactorKey::AdditionalIncome,
        FactorKey::CreditHistory,
        FactorKey::NonHousingDti,
    ],
};

static CONVENTIONAL_RULES: ProductRules = ProductRules {
    program: LoanProgram::Conventional,
    min_fico: 620,
    min_annual_income: 18_000.0,
    max_back_end: 50.0,
    min_down_payment: 3.0,
    max_ltv: 97.0,
    default_limits: AllowedDti {
        front_end: 28.0,
        back_end: 36.0,
    },
    specific_factors: &[
        FactorKey::CashReserves,
        FactorKey::DownPayment,
        FactorKey::EmploymentHistory,
        FactorKey::CreditUtilization,
        FactorKey::CreditHistory,
        FactorKey::NonHousingDti,
    ],
};

impl LoanProgram {
    pub const ALL: [LoanProgram; 2] = [LoanProgram::Fha, LoanProgram::Conventional];

    pub fn rules(self) -> &'static ProductRules {
        match self {
            LoanProgram::Fha => &FHA_RULES,
            LoanProgram::Conventional => &CONVENTIONAL_RULES,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            LoanProgram::Fha => "fha",
            LoanProgram::Conventional => "conventional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanProgram::Fha => "FHA",
            LoanProgram::Conventional => "Conventional",
        }
    }

    pub fn default_limits(self) -> AllowedDti {
        self.rules().default_limits
    }

    /// FICO/LTV tiers only; compensating factors are left to the solver.
    pub fn calculate_limits(self, profile: &FinancialProfile) -> AllowedDti {
        limits::resolve(profile.fico, profile.ltv, self, 0).allowed
    }

    pub fn validate_qualification(self, profile: &FinancialProfile) -> ProductQualification {
        let rules = self.rules();
        let mut issues = Vec::new();

        if profile.fico < rules.min_fico {
            issues.push(QualificationIssue::CreditScoreBelowMinimum {
                minimum: rules.min_fico,
                actual: profile.fico,
            });
        }

        if profile.annual_income < rules.min_annual_income {
            issues.push(QualificationIssue::IncomeBelowMinimum {
                minimum: rules.min_annual_income,
                actual: profile.annual_income,
            });
        }

        let debt_ratio = profile.non_housing_ratio();
        if profile.monthly_income() <= 0.0 || debt_ratio > rules.max_back_end {
            issues.push(QualificationIssue::DebtRatioAboveMaximum {
                maximum: rules.max_back_end,
                actual: debt_ratio,
            });
        }

        if profile.ltv > rules.max_ltv {
            issues.push(QualificationIssue::LtvAboveMaximum {
                maximum: rules.max_ltv,
                actual: profile.ltv,
            });
        }

        ProductQualification {
            program: self,
            eligible: issues.is_empty(),
            issues,
        }
    }

    pub fn min_down_payment(self) -> f64 {
        self.rules().min_down_payment
    }

    pub fn max_ltv(self) -> f64 {
        self.rules().max_ltv
    }

    pub fn product_specific_factors(self) -> &'static [FactorKey] {
        self.rules().specific_factors
    }
}

impl FromStr for LoanProgram {
    type Err = QualificationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fha" => Ok(LoanProgram::Fha),
            "conventional" | "conv" => Ok(LoanProgram::Conventional),
            _ => Err(QualificationError::UnsupportedProduct(raw.to_string())),
        }
    }
}

impl TryFrom<String> for LoanProgram {
    type Error = QualificationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LoanProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the standalone program gate check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQualification {
    pub program: LoanProgram,
    pub eligible: bool,
    pub issues: Vec<QualificationIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum QualificationIssue {
    CreditScoreBelowMinimum { minimum: u16, actual: u16 },
    IncomeBelowMinimum { minimum: f64, actual: f64 },
    DebtRatioAboveMaximum { maximum: f64, actual: f64 },
    LtvAboveMaximum { maximum: f64, actual: f64 },
}

impl QualificationIssue {
    pub fn summary(&self) -> String {
        match self {
            QualificationIssue::CreditScoreBelowMinimum { minimum, actual } => {
                format!("credit score {actual} below program minimum {minimum}")
            }
            QualificationIssue::IncomeBelowMinimum { minimum, actual } => {
                format!("annual income ${actual:.0} below program minimum ${minimum:.0}")
            }
            QualificationIssue::DebtRatioAboveMaximum { maximum, actual } => {
                format!("existing debt ratio {actual:.2}% exceeds program maximum {maximum:.2}%")
            }
            QualificationIssue::LtvAboveMaximum { maximum, actual } => {
                format!("LTV {actual:.1} exceeds program maximum {maximum:.1}")
            }
        }
    }
}
