use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::CompensatingFactorSelection;

/// Closed set of compensating factors recognized by the limit resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactorKey {
    #[serde(rename = "cashReserves")]
    CashReserves,
    #[serde(rename = "downPayment")]
    DownPayment,
    #[serde(rename = "residualIncome")]
    ResidualIncome,
    #[serde(rename = "housingPaymentIncrease")]
    HousingPaymentIncrease,
    #[serde(rename = "employmentHistory")]
    EmploymentHistory,
    #[serde(rename = "additionalIncome")]
    AdditionalIncome,
    #[serde(rename = "creditUtilization")]
    CreditUtilization,
    #[serde(rename = "creditHistory")]
    CreditHistory,
    #[serde(rename = "nonHousingDTI")]
    NonHousingDti,
}

impl FactorKey {
    pub const ALL: [FactorKey; 9] = [
        FactorKey::CashReserves,
        FactorKey::DownPayment,
        FactorKey::ResidualIncome,
        FactorKey::HousingPaymentIncrease,
        FactorKey::EmploymentHistory,
        FactorKey::AdditionalIncome,
        FactorKey::CreditUtilization,
        FactorKey::CreditHistory,
        FactorKey::NonHousingDti,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactorKey::CashReserves => "cashReserves",
            FactorKey::DownPayment => "downPayment",
            FactorKey::ResidualIncome => "residualIncome",
            FactorKey::HousingPaymentIncrease => "housingPaymentIncrease",
            FactorKey::EmploymentHistory => "employmentHistory",
            FactorKey::AdditionalIncome => "additionalIncome",
            FactorKey::CreditUtilization => "creditUtilization",
            FactorKey::CreditHistory => "creditHistory",
            FactorKey::NonHousingDti => "nonHousingDTI",
        }
    }

    /// Resolves a stored key, returning whether it was a legacy alias.
    fn lookup(raw: &str) -> Option<(FactorKey, bool)> {
        let canonical = FactorKey::ALL.into_iter().find(|key| key.as_str() == raw);
        if let Some(key) = canonical {
            return Some((key, false));
        }
        match raw {
            "credit_history" => Some((FactorKey::CreditHistory, true)),
            "non_housing_dti" => Some((FactorKey::NonHousingDti, true)),
            _ => None,
        }
    }

    pub fn parse(raw: &str) -> Option<FactorKey> {
        Self::lookup(raw.trim()).map(|(key, _)| key)
    }

    /// True for the keys the classifier derives from the profile.
    pub fn is_derived(self) -> bool {
        matches!(self, FactorKey::CreditHistory | FactorKey::NonHousingDti)
    }
}

impl fmt::Display for FactorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative level of a single factor, parsed from its legacy label.
pub trait FactorLevel: Copy + Default {
    const KEY: FactorKey;

    fn parse(raw: &str) -> Option<Self>;
    fn as_str(self) -> &'static str;
    fn is_strong(self) -> bool;
}

macro_rules! factor_level {
    (
        $(#[$meta:meta])*
        $name:ident for $key:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
        strong: [$($strong:ident),+]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            #[serde(rename = "none")]
            None,
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl FactorLevel for $name {
            const KEY: FactorKey = FactorKey::$key;

            fn parse(raw: &str) -> Option<Self> {
                match raw.trim() {
                    "none" => Some(Self::None),
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_str(self) -> &'static str {
                match self {
                    Self::None => "none",
                    $(Self::$variant => $label,)+
                }
            }

            fn is_strong(self) -> bool {
                matches!(self, $(Self::$strong)|+)
            }
        }
    };
}

factor_level! {
    /// Months of PITI held in verified liquid reserves after closing.
    CashReserves for CashReserves {
        OneToTwoMonths => "1-2 months",
        ThreeToFiveMonths => "3-5 months",
        SixPlusMonths => "6+ months",
        NinePlusMonths => "9+ months",
    }
    strong: [SixPlusMonths, NinePlusMonths]
}

factor_level! {
    DownPayment for DownPayment {
        UnderFive => "<5%",
        FiveToNine => "5-9%",
        TenToNineteen => "10-19%",
        TwentyPlus => "20%+",
    }
    strong: [TwentyPlus]
}

factor_level! {
    /// Residual income against the VA-style regional table.
    ResidualIncome for ResidualIncome {
        Below => "below",
        Meets => "meets",
        Exceeds => "exceeds",
    }
    strong: [Exceeds]
}

factor_level! {
    /// Payment shock: new housing payment relative to the current one.
    HousingPaymentIncrease for HousingPaymentIncrease {
        OverTwenty => ">20%",
        TenToTwenty => "10-20%",
        UnderTen => "<10%",
    }
    strong: [UnderTen]
}

factor_level! {
    EmploymentHistory for EmploymentHistory {
        UnderTwoYears => "<2 years",
        TwoToFiveYears => "2-5 years",
        FivePlusYears => "5+ years",
    }
    strong: [FivePlusYears]
}

factor_level! {
    /// Income not used to qualify (bonus, overtime, part-time).
    AdditionalIncome for AdditionalIncome {
        Documented => "documented",
        Significant => "significant",
    }
    strong: [Significant]
}

factor_level! {
    /// Revolving balance as a share of revolving limits.
    CreditUtilization for CreditUtilization {
        OverThirty => ">30%",
        TenToThirty => "10-30%",
        UnderTen => "<10%",
    }
    strong: [UnderTen]
}

factor_level! {
    CreditHistory for CreditHistory {
        Tier760Plus => "760+",
        Tier720To759 => "720-759",
        Tier680To719 => "680-719",
        Tier640To679 => "640-679",
        Below640 => "<640",
    }
    strong: [Tier760Plus, Tier720To759]
}

factor_level! {
    NonHousingDti for NonHousingDti {
        UnderFive => "<5%",
        FiveToTen => "5-10%",
        OverTen => ">10%",
    }
    strong: [UnderFive]
}

impl CreditHistory {
    pub fn from_fico(fico: u16) -> Self {
        match fico {
            760..=u16::MAX => Self::Tier760Plus,
            720..=759 => Self::Tier720To759,
            680..=719 => Self::Tier680To719,
            640..=679 => Self::Tier640To679,
            _ => Self::Below640,
        }
    }
}

impl NonHousingDti {
    pub fn from_debts(monthly_debts: f64, monthly_income: f64) -> Self {
        if monthly_income <= 0.0 {
            return Self::OverTen;
        }
        let ratio = monthly_debts / monthly_income * 100.0;
        if ratio < 5.0 {
            Self::UnderFive
        } else if ratio <= 10.0 {
            Self::FiveToTen
        } else {
            Self::OverTen
        }
    }
}

/// Parsed selections plus the two profile-derived factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedFactorSet {
    pub cash_reserves: CashReserves,
    pub down_payment: DownPayment,
    pub residual_income: ResidualIncome,
    pub housing_payment_increase: HousingPaymentIncrease,
    pub employment_history: EmploymentHistory,
    pub additional_income: AdditionalIncome,
    pub credit_utilization: CreditUtilization,
    pub credit_history: CreditHistory,
    #[serde(rename = "nonHousingDTI")]
    pub non_housing_dti: NonHousingDti,
}

impl EnhancedFactorSet {
    /// Parses the selection as given. Unknown keys and values fall back to `none`.
    pub fn from_selection(selection: &CompensatingFactorSelection) -> Self {
        let mut set = Self::default();
        let mut entries: Vec<(FactorKey, bool, &str)> = selection
            .iter()
            .filter_map(|(raw_key, value)| {
                FactorKey::lookup(raw_key.trim()).map(|(key, alias)| (key, alias, value))
            })
            .collect();
        // aliases first so a canonical key always wins
        entries.sort_by_key(|(_, alias, _)| !*alias);
        for (key, _, value) in entries {
            set.apply(key, value);
        }
        set
    }

    /// Builds the request's factor set, overwriting the derived entries.
    pub fn classify(
        selection: &CompensatingFactorSelection,
        fico: u16,
        monthly_debts: f64,
        monthly_income: f64,
    ) -> Self {
        let replaced: Vec<FactorKey> = selection
            .iter()
            .filter_map(|(raw_key, _)| FactorKey::parse(raw_key))
            .filter(|key| key.is_derived())
            .collect();
        if !replaced.is_empty() {
            debug!(?replaced, "derived factors replace submitted selections");
        }

        let mut set = Self::from_selection(selection);
        set.credit_history = CreditHistory::from_fico(fico);
        set.non_housing_dti = NonHousingDti::from_debts(monthly_debts, monthly_income);
        set
    }

    fn apply(&mut self, key: FactorKey, raw: &str) {
        fn level<L: FactorLevel>(raw: &str) -> L {
            L::parse(raw).unwrap_or_default()
        }

        match key {
            FactorKey::CashReserves => self.cash_reserves = level(raw),
            FactorKey::DownPayment => self.down_payment = level(raw),
            FactorKey::ResidualIncome => self.residual_income = level(raw),
            FactorKey::HousingPaymentIncrease => self.housing_payment_increase = level(raw),
            FactorKey::EmploymentHistory => self.employment_history = level(raw),
            FactorKey::AdditionalIncome => self.additional_income = level(raw),
            FactorKey::CreditUtilization => self.credit_utilization = level(raw),
            FactorKey::CreditHistory => self.credit_history = level(raw),
            FactorKey::NonHousingDti => self.non_housing_dti = level(raw),
        }
    }

    fn level_of(&self, key: FactorKey) -> (&'static str, bool) {
        fn view<L: FactorLevel>(level: L) -> (&'static str, bool) {
            (level.as_str(), level.is_strong())
        }

        match key {
            FactorKey::CashReserves => view(self.cash_reserves),
            FactorKey::DownPayment => view(self.down_payment),
            FactorKey::ResidualIncome => view(self.residual_income),
            FactorKey::HousingPaymentIncrease => view(self.housing_payment_increase),
            FactorKey::EmploymentHistory => view(self.employment_history),
            FactorKey::AdditionalIncome => view(self.additional_income),
            FactorKey::CreditUtilization => view(self.credit_utilization),
            FactorKey::CreditHistory => view(self.credit_history),
            FactorKey::NonHousingDti => view(self.non_housing_dti),
        }
    }

    pub fn value(&self, key: FactorKey) -> &'static str {
        self.level_of(key).0
    }

    pub fn is_strong(&self, key: FactorKey) -> bool {
        self.level_of(key).1
    }

    pub fn strong_factors(&self) -> Vec<FactorKey> {
        FactorKey::ALL
            .into_iter()
            .filter(|key| self.is_strong(*key))
            .collect()
    }

    pub fn strong_factor_count(&self) -> u8 {
        self.strong_factors().len() as u8
    }

    /// Flattens back to legacy key/label pairs for persistence by callers.
    pub fn to_selection(&self) -> CompensatingFactorSelection {
        FactorKey::ALL
            .into_iter()
            .map(|key| (key.as_str(), self.value(key)))
            .collect()
    }
}

/// Counts strong factors in a raw selection without deriving anything.
pub fn count_strong_factors(selection: &CompensatingFactorSelection) -> u8 {
    EnhancedFactorSet::from_selection(selection).strong_factor_count()
}
