use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything the traveller told us about the trip. Built once per request
/// from the form payload and only ever read after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripContext {
    pub locality: String,
    #[serde(default)]
    pub transport: TransportMode,
    #[serde(default)]
    pub group: GroupType,
    #[serde(default)]
    pub budget: BudgetTier,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default)]
    pub vibes: BTreeSet<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration: TripDuration,
    /// Text of a previous itinerary the traveller wants refined.
    #[serde(default)]
    pub prior_itinerary: Option<String>,
}

impl TripContext {
    pub fn new(locality: impl Into<String>) -> Self {
        Self {
            locality: locality.into(),
            transport: TransportMode::default(),
            group: GroupType::default(),
            budget: BudgetTier::default(),
            pet_friendly: false,
            vibes: BTreeSet::new(),
            notes: None,
            duration: TripDuration::default(),
            prior_itinerary: None,
        }
    }

    /// Leading component of the locality ("Piracicaba, SP" -> "piracicaba"),
    /// lower-cased. This is what resolved addresses get matched against.
    pub fn locality_key(&self) -> String {
        self.locality
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase()
    }

    pub fn has_locality(&self) -> bool {
        !self.locality.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Walking,
    RideHailing,
    PublicTransit,
    Car,
    Motorhome,
    Van,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "on foot",
            TransportMode::RideHailing => "ride-hailing / taxi",
            TransportMode::PublicTransit => "public transit",
            TransportMode::Car => "car",
            TransportMode::Motorhome => "motorhome",
            TransportMode::Van => "van",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    #[default]
    Solo,
    Couple,
    Family,
    Friends,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Solo => "solo traveller",
            GroupType::Couple => "couple",
            GroupType::Family => "family",
            GroupType::Friends => "group of friends",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Economy,
    #[default]
    Moderate,
    Luxury,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Economy => "economy",
            BudgetTier::Moderate => "moderate",
            BudgetTier::Luxury => "luxury",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl Default for TripDuration {
    fn default() -> Self {
        Self {
            amount: 1,
            unit: DurationUnit::Days,
        }
    }
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match (self.unit, self.amount) {
            (DurationUnit::Hours, 1) => "hour",
            (DurationUnit::Hours, _) => "hours",
            (DurationUnit::Days, 1) => "day",
            (DurationUnit::Days, _) => "days",
        };
        write!(f, "{} {}", self.amount, unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Hours,
    Days,
}
