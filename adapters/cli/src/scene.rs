//! Translates world queries into rendering descriptors.

use dungeon_crawl_rendering::{
    EntityPresentation, RenderingError, Scene, StatusPresentation, TileGridPresentation,
};
use dungeon_crawl_world::{query, World};

/// Builds a complete scene for the world's current round.
pub(crate) fn build(world: &World, tile_size: f32) -> Result<Scene, RenderingError> {
    let grid = query::grid(world);
    let tile_grid = TileGridPresentation::new(grid.columns(), grid.rows(), tile_size)?;
    let mut scene = Scene::new(
        tile_grid,
        grid.clone(),
        Vec::new(),
        EntityPresentation::player(query::player(world)),
        status(world),
    );
    refresh(world, &mut scene);
    Ok(scene)
}

/// Updates the entity and status portions of an existing scene in place.
///
/// Tiles are copied only when the grid changed, which happens on a new round.
pub(crate) fn refresh(world: &World, scene: &mut Scene) {
    let grid = query::grid(world);
    if &scene.tiles != grid {
        scene.tiles = grid.clone();
        scene.tile_grid.columns = grid.columns();
        scene.tile_grid.rows = grid.rows();
    }

    scene.enemies.clear();
    scene.enemies.extend(
        query::enemy_view(world)
            .iter()
            .map(|enemy| EntityPresentation::enemy(enemy.cell)),
    );
    scene.player = EntityPresentation::player(query::player(world));
    scene.status = status(world);
}

fn status(world: &World) -> StatusPresentation {
    let grid = query::grid(world);
    StatusPresentation {
        columns: grid.columns(),
        rows: grid.rows(),
        enemies_remaining: u32::try_from(query::enemy_count(world)).unwrap_or(u32::MAX),
        message: query::message(world),
    }
}
