use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ScrubError, ScrubResult};

/// Vertical geometry of a trigger region in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionGeometry {
    /// Document offset of the region's top edge.
    pub top: f64,
    /// Region height.
    pub height: f64,
}

/// A two-part scroll marker, e.g. `"20% top"`.
///
/// The first part is a point on the trigger region, the second a point on the viewport. The
/// marker is crossed when both points line up.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Marker {
    /// Fraction of the region height (0 = top, 1 = bottom).
    pub element: f64,
    /// Fraction of the viewport height (0 = top, 1 = bottom).
    pub viewport: f64,
}

impl Marker {
    pub const TOP_TOP: Marker = Marker {
        element: 0.0,
        viewport: 0.0,
    };
    pub const BOTTOM_BOTTOM: Marker = Marker {
        element: 1.0,
        viewport: 1.0,
    };

    /// Scroll offset at which this marker is crossed.
    pub fn resolve(self, region: RegionGeometry, viewport_height: f64) -> f64 {
        region.top + self.element * region.height - self.viewport * viewport_height
    }
}

fn parse_offset(token: &str) -> ScrubResult<f64> {
    match token {
        "top" => Ok(0.0),
        "center" => Ok(0.5),
        "bottom" => Ok(1.0),
        _ => {
            let pct = token.strip_suffix('%').ok_or_else(|| {
                ScrubError::validation(format!("marker offset '{token}' is not a keyword or N%"))
            })?;
            let v: f64 = pct.parse().map_err(|_| {
                ScrubError::validation(format!("marker offset '{token}' is not a number"))
            })?;
            if !v.is_finite() {
                return Err(ScrubError::validation("marker offset must be finite"));
            }
            Ok(v / 100.0)
        }
    }
}

fn format_offset(v: f64) -> String {
    if v == 0.0 {
        "top".to_string()
    } else if v == 0.5 {
        "center".to_string()
    } else if v == 1.0 {
        "bottom".to_string()
    } else {
        format!("{}%", v * 100.0)
    }
}

impl FromStr for Marker {
    type Err = ScrubError;

    fn from_str(s: &str) -> ScrubResult<Self> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ScrubError::validation(format!(
                "marker '{s}' must have exactly two parts"
            )));
        };
        Ok(Self {
            element: parse_offset(element)?,
            viewport: parse_offset(viewport)?,
        })
    }
}

impl TryFrom<String> for Marker {
    type Error = ScrubError;

    fn try_from(s: String) -> ScrubResult<Self> {
        s.parse()
    }
}

impl From<Marker> for String {
    fn from(m: Marker) -> Self {
        m.to_string()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            format_offset(self.element),
            format_offset(self.viewport)
        )
    }
}
