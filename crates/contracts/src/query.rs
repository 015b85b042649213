//! `QUERYMAPFEATURES` request parameters and response payload.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Parts of the response the server should fill in.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct QueryFeatureFlags: u32 {
        const ATTRIBUTES = 1;
        const INLINE_SELECTION = 2;
        const TOOLTIP = 4;
        const HYPERLINK = 8;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionVariant {
    Intersects,
    Touches,
    Within,
    EnvelopeIntersects,
}

impl SelectionVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionVariant::Intersects => "INTERSECTS",
            SelectionVariant::Touches => "TOUCHES",
            SelectionVariant::Within => "WITHIN",
            SelectionVariant::EnvelopeIntersects => "ENVELOPEINTERSECTS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMapFeaturesRequest {
    pub mapname: String,
    pub session: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layernames: Option<String>,
    pub persist: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectionvariant: Option<SelectionVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectioncolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectionformat: Option<String>,
    pub maxfeatures: i32,
    pub requestdata: QueryFeatureFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featurefilter: Option<String>,
}

impl QueryMapFeaturesRequest {
    pub fn new(mapname: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            mapname: mapname.into(),
            session: session.into(),
            geometry: None,
            layernames: None,
            persist: false,
            selectionvariant: None,
            selectioncolor: None,
            selectionformat: None,
            maxfeatures: -1,
            requestdata: QueryFeatureFlags::empty(),
            featurefilter: None,
        }
    }

    /// Flattens the request into mapagent form parameters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("MAPNAME", self.mapname.clone()),
            ("SESSION", self.session.clone()),
            ("PERSIST", if self.persist { "1" } else { "0" }.to_string()),
            ("MAXFEATURES", self.maxfeatures.to_string()),
            ("REQUESTDATA", self.requestdata.bits().to_string()),
        ];
        if let Some(g) = &self.geometry {
            params.push(("GEOMETRY", g.clone()));
        }
        if let Some(l) = &self.layernames {
            params.push(("LAYERNAMES", l.clone()));
        }
        if let Some(v) = self.selectionvariant {
            params.push(("SELECTIONVARIANT", v.as_str().to_string()));
        }
        if let Some(c) = &self.selectioncolor {
            params.push(("SELECTIONCOLOR", c.clone()));
        }
        if let Some(f) = &self.selectionformat {
            params.push(("SELECTIONFORMAT", f.clone()));
        }
        if let Some(f) = &self.featurefilter {
            params.push(("FEATUREFILTER", f.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryMapFeaturesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_set: Option<FeatureSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_features: Option<SelectedFeatureSet>,
}

impl QueryMapFeaturesResponse {
    pub fn has_selection(&self) -> bool {
        self.selected_features
            .as_ref()
            .is_some_and(|s| !s.selected_layer.is_empty())
    }

    /// Tooltip markup for a hover query, or `None` when the server returned
    /// neither a tooltip nor a hyperlink.
    pub fn tooltip_html(&self) -> Option<String> {
        let mut html = String::new();
        if let Some(tip) = self.tooltip.as_deref().filter(|t| !t.is_empty()) {
            html.push_str("<div class='feature-tooltip-body'>");
            html.push_str(&tip.replace("\\n", "<br/>"));
            html.push_str("</div>");
        }
        if let Some(link) = self.hyperlink.as_deref().filter(|h| !h.is_empty()) {
            html.push_str("<div><a href='");
            html.push_str(link);
            html.push_str("'>Click for more information</a></div>");
        }
        (!html.is_empty()).then_some(html)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureSet {
    #[serde(default)]
    pub layer: Vec<FeatureSetLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSetLayer {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "Class")]
    pub class: FeatureSetClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSetClass {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "ID", default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelectedFeatureSet {
    #[serde(default)]
    pub selected_layer: Vec<SelectedLayer>,
}

impl SelectedFeatureSet {
    pub fn feature_count(&self) -> usize {
        self.selected_layer.iter().map(|l| l.feature.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLayer {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "LayerMetadata", default, skip_serializing_if = "Option::is_none")]
    pub layer_metadata: Option<LayerMetadata>,
    #[serde(rename = "Feature", default)]
    pub feature: Vec<SelectedFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerMetadata {
    #[serde(default)]
    pub property: Vec<LayerPropertyMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerPropertyMetadata {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "Type", default)]
    pub property_type: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelectedFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    #[serde(default)]
    pub property: Vec<FeatureProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureProperty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
