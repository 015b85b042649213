//! Runtime map creation and projection registration.

use client::{CreateRuntimeMapRequest, MapAgent, ProjectionResolver, RuntimeMapFeatureFlags};
use contracts::runtime_map::RuntimeMap;
use foundation::math::ProjectionTable;
use futures_util::future::try_join_all;
use i18n::StringBundles;
use tracing::debug;

use crate::error::InitError;
use crate::maps::target_map_name;

pub fn runtime_map_request(map_definition: &str, session: &str) -> CreateRuntimeMapRequest {
    CreateRuntimeMapRequest {
        map_definition: map_definition.to_string(),
        session: session.to_string(),
        requested_features: RuntimeMapFeatureFlags::LAYER_FEATURE_SOURCES
            | RuntimeMapFeatureFlags::LAYER_ICONS
            | RuntimeMapFeatureFlags::LAYERS_AND_GROUPS,
        target_map_name: target_map_name(map_definition),
    }
}

/// Creates one runtime map per definition, concurrently. Any failure fails
/// the whole batch.
pub async fn create_runtime_maps(
    agent: &dyn MapAgent,
    session: &str,
    map_definitions: &[String],
) -> Result<Vec<RuntimeMap>, InitError> {
    let requests: Vec<_> = map_definitions
        .iter()
        .map(|d| runtime_map_request(d, session))
        .collect();
    let maps = try_join_all(requests.iter().map(|r| agent.create_runtime_map(r))).await?;
    Ok(maps)
}

/// Rejects maps without a usable EPSG code and registers definitions for
/// codes the table does not know yet.
pub async fn ensure_projections(
    maps: &[RuntimeMap],
    resolver: &dyn ProjectionResolver,
    projections: &mut ProjectionTable,
    strings: &StringBundles,
    locale: &str,
) -> Result<(), InitError> {
    let mut pending: Vec<(&str, &str)> = Vec::new();
    for map in maps {
        let cs = &map.coordinate_system;
        if !cs.is_supported() {
            return Err(InitError::UnsupportedCoordinateSystem(strings.tr(
                "INIT_ERROR_UNSUPPORTED_COORD_SYS",
                locale,
                &[("mapDefinition", map.map_definition.as_str())],
            )));
        }
        let epsg = cs.epsg_code.as_str();
        if !projections.is_registered(epsg) && !pending.iter().any(|(e, _)| *e == epsg) {
            pending.push((epsg, map.map_definition.as_str()));
        }
    }

    let resolved = try_join_all(pending.iter().map(|(epsg, _)| resolver.resolve(epsg))).await?;

    for ((epsg, map_definition), proj4) in pending.into_iter().zip(resolved) {
        let Some(proj4) = proj4 else {
            return Err(InitError::UnregisteredEpsgCode(strings.tr(
                "INIT_ERROR_UNREGISTERED_EPSG_CODE",
                locale,
                &[("epsg", epsg), ("mapDefinition", map_definition)],
            )));
        };
        projections.register(epsg, proj4);
        debug!("Registered projection EPSG:{epsg}");
    }
    Ok(())
}
