use serde::{Deserialize, Serialize};

use crate::rate::TaxRate;

/// Tax category identifier (e.g. "Standard goods", "Children's clothing").
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxCategoryId(pub i64);

impl core::fmt::Display for TaxCategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Where a rate applies: one country and either every region (empty list) or
/// the listed region codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxZone {
    pub country: String,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl TaxZone {
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            regions: Vec::new(),
        }
    }

    pub fn regions<I, S>(country: impl Into<String>, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            country: country.into(),
            regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    /// Codes are compared case-insensitively.
    pub fn covers(&self, country: &str, region: &str) -> bool {
        if !self.country.trim().eq_ignore_ascii_case(country.trim()) {
            return false;
        }
        self.regions.is_empty()
            || self
                .regions
                .iter()
                .any(|r| r.trim().eq_ignore_ascii_case(region.trim()))
    }
}

/// A rate plus the zones it is valid in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonedRate {
    pub rate: TaxRate,
    pub zones: Vec<TaxZone>,
}

/// A named group of rates that vary by geography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCategory {
    pub id: TaxCategoryId,
    pub title: String,
    /// Rate used when nothing more specific is known (e.g. the product has no rate).
    pub default_rate: Option<TaxRate>,
    pub rates: Vec<ZonedRate>,
}

impl TaxCategory {
    pub fn new(id: TaxCategoryId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            default_rate: None,
            rates: Vec::new(),
        }
    }

    pub fn with_default(mut self, rate: TaxRate) -> Self {
        self.default_rate = Some(rate);
        self
    }

    pub fn with_rate(mut self, rate: TaxRate, zones: Vec<TaxZone>) -> Self {
        self.rates.push(ZonedRate { rate, zones });
        self
    }

    /// First rate (in configured order) whose zones cover `(country, region)`.
    ///
    /// A zone naming specific regions wins over a country-wide zone.
    pub fn valid_tax(&self, country: &str, region: &str) -> Option<&TaxRate> {
        let regional = self.rates.iter().find(|zr| {
            zr.zones
                .iter()
                .any(|z| !z.regions.is_empty() && z.covers(country, region))
        });

        regional
            .or_else(|| {
                self.rates.iter().find(|zr| {
                    zr.zones
                        .iter()
                        .any(|z| z.regions.is_empty() && z.covers(country, region))
                })
            })
            .map(|zr| &zr.rate)
    }
}
