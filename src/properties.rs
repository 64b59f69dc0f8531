//! Collision and terrain semantics derived from a tile's type label.

use crate::ir_map::Properties;
use std::str::FromStr;

/// Known tile kinds. Anything else derives no semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Solid,
    Platform,
    LeftSlope,
    RightSlope,
    Ladder,
    Breakable,
}

/// Returned when a label names none of the [`TileKind`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTileKind(pub String);

impl FromStr for TileKind {
    type Err = UnknownTileKind;

    /// Case-insensitive.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(TileKind::Solid),
            "platform" => Ok(TileKind::Platform),
            "lslope" | "left-slope" => Ok(TileKind::LeftSlope),
            "rslope" | "right-slope" => Ok(TileKind::RightSlope),
            "ladder" => Ok(TileKind::Ladder),
            "breakable" => Ok(TileKind::Breakable),
            _ => Err(UnknownTileKind(label.to_owned())),
        }
    }
}

/// Semantics of one declared tile.
///
/// `slope` is `left_slope || right_slope`, and `collidable` is set whenever
/// any other flag is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileProperties {
    pub collidable: bool,
    pub solid: bool,
    pub platform: bool,
    pub slope: bool,
    pub left_slope: bool,
    pub right_slope: bool,
    pub ladder: bool,
    pub breakable: bool,
    /// The label as declared, if any.
    pub kind_label: Option<String>,
    /// Custom properties, unvalidated.
    pub custom: Properties,
}

impl TileProperties {
    /// Derives the record from a type label and the tile's custom properties.
    pub fn derive(label: Option<&str>, custom: Properties) -> Self {
        let kind = label.and_then(|l| l.parse::<TileKind>().ok());
        let is = |k: TileKind| kind == Some(k);

        let left_slope = is(TileKind::LeftSlope);
        let right_slope = is(TileKind::RightSlope);
        let mut props = TileProperties {
            solid: is(TileKind::Solid),
            platform: is(TileKind::Platform),
            slope: left_slope || right_slope,
            left_slope,
            right_slope,
            ladder: is(TileKind::Ladder),
            breakable: is(TileKind::Breakable),
            kind_label: label.map(str::to_owned),
            custom,
            ..Default::default()
        };
        props.collidable =
            props.solid || props.platform || props.slope || props.ladder || props.breakable;
        props
    }

    /// The recognised kind, if the label named one.
    pub fn kind(&self) -> Option<TileKind> {
        self.kind_label.as_deref().and_then(|l| l.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_map::PropertyValue;

    fn flags(p: &TileProperties) -> [bool; 8] {
        [
            p.collidable,
            p.solid,
            p.platform,
            p.slope,
            p.left_slope,
            p.right_slope,
            p.ladder,
            p.breakable,
        ]
    }

    #[test]
    fn mixed_case_solid() {
        let p = TileProperties::derive(Some("Solid"), Properties::new());
        assert!(p.solid);
        assert!(p.collidable);
        assert!(!p.platform && !p.slope && !p.ladder && !p.breakable);
        assert_eq!(p.kind(), Some(TileKind::Solid));
    }

    #[test]
    fn unknown_and_missing_labels_derive_nothing() {
        let foo = TileProperties::derive(Some("foo"), Properties::new());
        assert_eq!(flags(&foo), [false; 8]);
        assert_eq!(foo.kind_label.as_deref(), Some("foo"));

        let none = TileProperties::derive(None, Properties::new());
        assert_eq!(flags(&none), [false; 8]);
    }

    #[test]
    fn slopes_imply_slope() {
        let l = TileProperties::derive(Some("lslope"), Properties::new());
        assert!(l.left_slope && l.slope && l.collidable && !l.right_slope);

        let r = TileProperties::derive(Some("RIGHT-SLOPE"), Properties::new());
        assert!(r.right_slope && r.slope && r.collidable && !r.left_slope);
    }

    #[test]
    fn exactly_one_kind_flag_per_label() {
        for label in ["solid", "platform", "lslope", "rslope", "ladder", "breakable"] {
            let p = TileProperties::derive(Some(label), Properties::new());
            let set = [
                p.solid,
                p.platform,
                p.left_slope,
                p.right_slope,
                p.ladder,
                p.breakable,
            ]
            .iter()
            .filter(|b| **b)
            .count();
            assert_eq!(set, 1, "{label}");
            assert!(p.collidable, "{label}");
        }
    }

    #[test]
    fn custom_properties_pass_through() {
        let mut custom = Properties::new();
        custom.insert("damage", PropertyValue::I64(3));
        let p = TileProperties::derive(Some("nonsense"), custom.clone());
        assert_eq!(p.custom, custom);

        let again = TileProperties::derive(Some("nonsense"), custom);
        assert_eq!(p, again);
    }
}
