// Catalog API response types
//
// Wire models for the PokeAPI `pokemon` resource. Only the fields the data
// layer consumes are modeled; unknown fields are ignored. Nested lists use
// `#[serde(default)]` because older entries omit some of them.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── List endpoint ────────────────────────────────────────────────────

/// One page of `GET /pokemon?limit=..&offset=..`.
///
/// ```json
/// { "count": 1302, "next": "https://…?offset=20&limit=20", "previous": null,
///   "results": [{ "name": "bulbasaur", "url": "https://…/pokemon/1/" }] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// A `{name, url}` pair as returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

impl NamedResource {
    /// Derive the numeric id encoded in the resource URL.
    pub fn resource_id(&self) -> Result<u32, Error> {
        resource_id(&self.url)
    }
}

/// A list entry with its id already derived from the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: u32,
    pub name: String,
    pub url: String,
}

impl TryFrom<NamedResource> for ResourceRef {
    type Error = Error;

    fn try_from(raw: NamedResource) -> Result<Self, Self::Error> {
        let id = raw.resource_id()?;
        Ok(Self {
            id,
            name: raw.name,
            url: raw.url,
        })
    }
}

/// A decoded page plus the "is there more" signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

// ── Detail endpoint ──────────────────────────────────────────────────

/// `GET /pokemon/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub sprites: Sprites,
}

/// Reference to a named sub-resource; the URL is not always present.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: Option<u32>,
    #[serde(rename = "type")]
    pub kind: NamedRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySlot {
    #[serde(default)]
    pub slot: Option<u32>,
    #[serde(default)]
    pub is_hidden: bool,
    pub ability: NamedRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

// ── Id derivation ────────────────────────────────────────────────────

/// Parse the id from a resource URL: the last non-empty path segment.
///
/// `https://pokeapi.co/api/v2/pokemon/25/` → `25`. Ids start at 1.
pub fn resource_id(url: &str) -> Result<u32, Error> {
    let invalid = || Error::InvalidResourceUrl {
        url: url.to_owned(),
    };

    // Query strings and fragments never carry the id.
    let path = url.split(['?', '#']).next().unwrap_or_default();

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|id| *id >= 1)
        .ok_or_else(invalid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn id_from_trailing_slash_url() {
        assert_eq!(
            resource_id("https://pokeapi.co/api/v2/pokemon/25/").unwrap(),
            25
        );
    }

    #[test]
    fn id_without_trailing_slash() {
        assert_eq!(resource_id("https://pokeapi.co/api/v2/pokemon/151").unwrap(), 151);
    }

    #[test]
    fn id_ignores_repeated_slashes() {
        assert_eq!(resource_id("https://host/pokemon/7//").unwrap(), 7);
    }

    #[test]
    fn non_numeric_segment_is_rejected() {
        let err = resource_id("https://pokeapi.co/api/v2/pokemon/").unwrap_err();
        assert!(matches!(err, Error::InvalidResourceUrl { .. }));
    }

    #[test]
    fn zero_is_not_a_valid_id() {
        assert!(resource_id("https://host/pokemon/0/").is_err());
    }

    #[test]
    fn detail_decodes_nested_names() {
        let body = r#"{
            "id": 4,
            "name": "charmander",
            "types": [{"slot": 1, "type": {"name": "fire", "url": "https://x/type/10/"}}],
            "abilities": [
                {"ability": {"name": "blaze"}, "is_hidden": false, "slot": 1},
                {"ability": {"name": "solar-power"}, "is_hidden": true, "slot": 3}
            ],
            "sprites": {"front_default": "https://img/4.png", "back_default": null},
            "height": 6
        }"#;
        let detail: PokemonDetail = serde_json::from_str(body).unwrap();
        assert_eq!(detail.types[0].kind.name, "fire");
        assert_eq!(detail.abilities.len(), 2);
        assert!(detail.abilities[1].is_hidden);
        assert_eq!(detail.sprites.front_default.as_deref(), Some("https://img/4.png"));
    }
}
