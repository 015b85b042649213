//! Runtime map naming and the pairing of map groups with runtime maps.

use commands::{ExternalBaseLayer, MapInfo, ViewerConfigOverrides, default_base_layer_visibility};
use contracts::fusion::{ApplicationDefinition, MapConfiguration, MapProvider};
use contracts::runtime_map::RuntimeMap;
use contracts::weblayout::InitialView;
use foundation::{MapView, unique_name};
use tracing::warn;

pub const OSM_KIND: &str = "OSM";
pub const STAMEN_KIND: &str = "Stamen";
pub const OSM_CYCLE_MAP_URL: &str = "http://{a-c}.tile.opencyclemap.org/cycle/{z}/{x}/{y}.png";
pub const OSM_TRANSPORT_MAP_URL: &str = "http://tile2.opencyclemap.org/transport/{z}/{x}/{y}.png";

pub fn to_map_view(view: &InitialView) -> Option<MapView> {
    match MapView::new(view.center_x, view.center_y, view.scale) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("ignoring initial view: {e}");
            None
        }
    }
}

/// `<definition basename>_<id>`, or `Map_<id>` when the resource id has no
/// basename.
pub fn target_map_name(map_definition: &str) -> String {
    let slash = map_definition.rfind('/');
    let dot = map_definition.rfind('.');
    match (slash, dot) {
        (Some(s), Some(d)) if d > s => unique_name(&map_definition[s + 1..d]),
        _ => unique_name("Map"),
    }
}

/// Resource ids of every MapGuide map, in document order.
pub fn map_definitions_from_flex(app_def: &ApplicationDefinition) -> Vec<String> {
    app_def
        .mapguide_maps()
        .filter_map(|(_, m)| m.resource_id())
        .collect()
}

fn external_base_layer(map: &MapConfiguration) -> Option<ExternalBaseLayer> {
    let provider = map.provider();
    let kind = match &provider {
        MapProvider::OpenStreetMap => OSM_KIND,
        MapProvider::Stamen => STAMEN_KIND,
        MapProvider::MapGuide | MapProvider::Other(_) => return None,
    };
    let Some(name) = map.option_name() else {
        warn!("{kind} map without a name is ignored");
        return None;
    };
    let kind_option = map.option_type().unwrap_or_default();
    let layer = ExternalBaseLayer::new(name, kind);
    Some(match provider {
        MapProvider::OpenStreetMap => match kind_option.as_str() {
            "CycleMap" => layer.with_option("url", OSM_CYCLE_MAP_URL),
            "TransportMap" => layer.with_option("url", OSM_TRANSPORT_MAP_URL),
            _ => layer,
        },
        _ => layer.with_option("layer", kind_option),
    })
}

fn fill<T: Clone>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Pairs each map group with the first runtime map created from its MapGuide
/// resource and collects the group's external base layers.
///
/// Viewer settings are taken from the first MapGuide map that provides each
/// one. Groups without a matching runtime map are dropped. A group matching a
/// runtime map already claimed by an earlier group replaces that entry.
pub fn setup_maps(
    app_def: &ApplicationDefinition,
    runtime_maps: &[RuntimeMap],
    config: &mut ViewerConfigOverrides,
) -> Vec<MapInfo> {
    let mut infos: Vec<MapInfo> = Vec::new();
    let groups = app_def.map_set.iter().flat_map(|s| s.map_group.iter());
    for group in groups {
        let mut map_name: Option<&str> = None;
        let mut external = Vec::new();
        for map in &group.map {
            if map.provider() != MapProvider::MapGuide {
                external.extend(external_base_layer(map));
                continue;
            }
            fill(&mut config.selection_color, map.selection_color());
            fill(&mut config.image_format, map.image_format());
            fill(&mut config.selection_image_format, map.selection_format());
            let resource_id = map.resource_id();
            if let Some(rt) = runtime_maps
                .iter()
                .find(|rt| Some(&rt.map_definition) == resource_id.as_ref())
            {
                map_name = Some(&rt.name);
            }
        }
        default_base_layer_visibility(&mut external);

        let Some(name) = map_name else {
            continue;
        };
        let Some(runtime_map) = runtime_maps.iter().find(|m| m.name == name) else {
            continue;
        };
        let info = MapInfo {
            name: name.to_string(),
            map_group_id: group.id.clone(),
            map: runtime_map.clone(),
            initial_view: group.initial_view.as_ref().and_then(to_map_view),
            external_base_layers: external,
        };
        match infos.iter_mut().find(|i| i.name == info.name) {
            Some(existing) => *existing = info,
            None => infos.push(info),
        }
    }
    infos
}
