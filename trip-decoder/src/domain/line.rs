//! Line and product types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport mode of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    HighSpeedTrain,
    RegionalTrain,
    SuburbanTrain,
    Subway,
    Tram,
    Bus,
    Ferry,
    Cablecar,
    OnDemand,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Product::HighSpeedTrain => "high-speed train",
            Product::RegionalTrain => "regional train",
            Product::SuburbanTrain => "suburban train",
            Product::Subway => "subway",
            Product::Tram => "tram",
            Product::Bus => "bus",
            Product::Ferry => "ferry",
            Product::Cablecar => "cablecar",
            Product::OnDemand => "on-demand service",
        };
        f.write_str(name)
    }
}

/// Accessibility and carriage flags attached to a line.
///
/// The backend transports these as prefixed free-text annotations; the
/// trip decoder classifies the prefixes and sets the flags here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAttrs {
    /// Vehicle is wheelchair accessible.
    pub wheelchair_access: bool,
    /// Bicycles can be taken on board.
    pub bicycle_carriage: bool,
    /// Service only runs on demand (booking required).
    pub on_demand: bool,
}

impl LineAttrs {
    /// True if any flag is set.
    pub fn any(&self) -> bool {
        self.wheelchair_access || self.bicycle_carriage || self.on_demand
    }
}

/// A named service pattern operated under a label ("ICE 123", "S1", "N7").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Backend-stable line id, when one exists.
    pub id: Option<String>,
    /// Operating network, when known.
    pub network: Option<String>,
    /// Transport mode.
    pub product: Product,
    /// Display label as the backend sent it.
    pub label: String,
    /// Free-text annotation (typically the on-demand booking note).
    pub comment: Option<String>,
    /// Accessibility and carriage flags.
    pub attrs: LineAttrs,
}

impl Line {
    /// Create a line with just a product and label.
    pub fn new(product: Product, label: impl Into<String>) -> Self {
        Self {
            id: None,
            network: None,
            product,
            label: label.into(),
            comment: None,
            attrs: LineAttrs::default(),
        }
    }
}
