use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Names of the built-in viewer commands.
///
/// Their descriptors are supplied by the host application; layouts refer to
/// them by these names.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr, EnumIter,
)]
pub enum DefaultCommand {
    Select,
    Pan,
    Zoom,
    MapTip,
    ZoomIn,
    ZoomOut,
    RestoreView,
    ZoomExtents,
    SelectRadius,
    SelectPolygon,
    ClearSelection,
    ZoomToSelection,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    RefreshMap,
    PreviousView,
    NextView,
    About,
    Help,
    Measure,
    ViewerOptions,
    Buffer,
    SelectWithin,
    QuickPlot,
    Redline,
    FeatureInfo,
    Theme,
    Query,
    Geolocation,
}

impl DefaultCommand {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Opaque UI components a toolbar item can host in a flyout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr)]
pub enum DefaultComponent {
    MapMenu,
    BaseMapSwitcher,
}

impl DefaultComponent {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip_through_strings() {
        assert_eq!(DefaultCommand::ZoomExtents.name(), "ZoomExtents");
        assert_eq!(DefaultCommand::from_str("RefreshMap"), Ok(DefaultCommand::RefreshMap));
        assert!(DefaultCommand::from_str("Teleport").is_err());
        assert_eq!(DefaultComponent::BaseMapSwitcher.to_string(), "BaseMapSwitcher");
    }

    #[test]
    fn every_name_is_unique() {
        let mut names: Vec<&str> = DefaultCommand::iter().map(|c| c.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
