// ── API-to-domain conversions ──
//
// Bridges `dexsync_api` wire types into `dexsync_core::model` types.
// Nested `{type: {name}}` / `{ability: {name}}` wrappers are flattened to
// plain name lists in slot order.

use dexsync_api::models::{AbilitySlot, TypeSlot};
use dexsync_api::{PokemonDetail, ResourceRef};

use crate::model::{CatalogItemDetail, CatalogItemSummary};

impl From<ResourceRef> for CatalogItemSummary {
    fn from(r: ResourceRef) -> Self {
        Self {
            id: r.id,
            name: r.name,
            source_url: r.url,
        }
    }
}

fn type_names(mut slots: Vec<TypeSlot>) -> Vec<String> {
    slots.sort_by_key(|s| s.slot.unwrap_or(u32::MAX));
    slots.into_iter().map(|s| s.kind.name).collect()
}

fn ability_names(mut slots: Vec<AbilitySlot>) -> Vec<String> {
    slots.sort_by_key(|s| s.slot.unwrap_or(u32::MAX));
    slots.into_iter().map(|s| s.ability.name).collect()
}

impl From<PokemonDetail> for CatalogItemDetail {
    fn from(d: PokemonDetail) -> Self {
        Self {
            id: d.id,
            name: d.name,
            types: type_names(d.types),
            abilities: ability_names(d.abilities),
            primary_image_url: d.sprites.front_default,
        }
    }
}
