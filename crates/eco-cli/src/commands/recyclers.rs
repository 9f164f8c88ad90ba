use eco_core::Coordinate;
use eco_session::presentation::{self, MAP_LIST_LIMIT, MapView};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RecyclersArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct RecyclersResponse {
    material: String,
    center: Coordinate,
    map: MapSummary,
    recyclers: Vec<RecyclerRow>,
}

#[derive(Serialize)]
struct MapSummary {
    zoom: u8,
    tile: String,
    open: String,
    attribution: &'static str,
    markers: usize,
}

#[derive(Serialize)]
struct RecyclerRow {
    id: Option<String>,
    name: String,
    distance: String,
    score: String,
    accepts: String,
}

/// Handle `ecosort recyclers`.
pub async fn handle(
    args: &RecyclersArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let weight_kg = args
        .weight_kg
        .unwrap_or(ctx.config.general.default_weight_kg);
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        anyhow::bail!("--weight-kg must be a positive number");
    }

    let spinner = Progress::spinner("finding recyclers");
    let loaded = presentation::load_nearby(
        ctx.gateway(),
        &ctx.store,
        args.material.as_deref(),
        Some(weight_kg),
        ctx.location_wait(),
    )
    .await;
    let nearby = match loaded {
        Ok(nearby) => {
            spinner.finish_clear();
            nearby
        }
        Err(error) => {
            spinner.finish_err(&error.user_message());
            return Err(anyhow::Error::new(error).context("recycler lookup failed"));
        }
    };

    let map = MapView::new(nearby.center, &nearby.recyclers);
    let limit = args.limit.unwrap_or(MAP_LIST_LIMIT);
    let recyclers = nearby
        .recyclers
        .iter()
        .take(limit)
        .map(|recycler| RecyclerRow {
            id: recycler.id.clone(),
            name: recycler.name.clone(),
            distance: format!("{:.1} km", recycler.distance_km),
            score: format!("{:.1}", recycler.score),
            accepts: recycler.materials_accepted.join(", "),
        })
        .collect();

    output(
        &RecyclersResponse {
            material: nearby.material.clone(),
            center: nearby.center,
            map: MapSummary {
                zoom: map.zoom,
                tile: map.center_tile_url(),
                open: map.browse_url(),
                attribution: map.attribution,
                markers: map.markers.len(),
            },
            recyclers,
        },
        flags.format,
    )
}
