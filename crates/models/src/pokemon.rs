use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Path under which generated pokemon images are served.
pub const IMAGE_PATH_PREFIX: &str = "/assets/pokemons";

/// Localized names of a pokemon.
/// Only `english` is mandatory; the other names fall back to an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonName {
    pub english: String,
    #[serde(default)]
    pub japanese: String,
    #[serde(default)]
    pub chinese: String,
    #[serde(default)]
    pub french: String,
}

/// `type` as sent by clients: a bare string or a list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeInput {
    One(String),
    Many(Vec<String>),
}

impl TypeInput {
    /// Only the scalar empty string counts as absent; any list is present.
    pub fn is_present(&self) -> bool {
        match self {
            TypeInput::One(t) => !t.is_empty(),
            TypeInput::Many(_) => true,
        }
    }
}

/// Ordered list of elemental types (`["Grass", "Poison"]`).
///
/// Accepts a bare string on input and stores it as a one-element list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeList(pub Vec<String>);

impl From<TypeInput> for TypeList {
    fn from(input: TypeInput) -> Self {
        match input {
            TypeInput::One(t) => TypeList(vec![t]),
            TypeInput::Many(ts) => TypeList(ts),
        }
    }
}

impl<'de> Deserialize<'de> for TypeList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        TypeInput::deserialize(deserializer).map(TypeList::from)
    }
}

impl From<Vec<&str>> for TypeList {
    fn from(v: Vec<&str>) -> Self {
        TypeList(v.into_iter().map(str::to_string).collect())
    }
}

/// A catalog record.
///
/// `base` is an opaque stat map and is never inspected. Unknown top-level
/// fields are kept in `extra` so they survive a rewrite of the data file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u64,
    pub name: PokemonName,
    #[serde(rename = "type")]
    pub types: TypeList,
    pub base: Map<String, Value>,
    /// Absent on records that never had one; left absent when rewritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Pokemon {
    /// Case-insensitive exact match on the english or french name.
    pub fn matches_name(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.english.to_lowercase() == needle || self.name.french.to_lowercase() == needle
    }

    /// Shallow merge: every top-level key of `patch` replaces the whole field.
    /// A patched `name` is not merged with the previous one. `id` is never changed.
    pub fn merge_patch(&self, patch: Map<String, Value>) -> Result<Pokemon, ModelError> {
        let mut doc = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ModelError::InvalidPatch("pokemon is not a JSON object".into())),
            Err(e) => return Err(ModelError::InvalidPatch(e.to_string())),
        };
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            doc.insert(key, value);
        }
        doc.insert("id".into(), Value::from(self.id));

        serde_json::from_value(Value::Object(doc))
            .map_err(|e| ModelError::InvalidPatch(e.to_string()))
    }
}

/// Image URL assigned when a new pokemon comes without one.
pub fn default_image_url(public_base_url: &str, id: u64) -> String {
    format!("{}{}/{}.png", public_base_url.trim_end_matches('/'), IMAGE_PATH_PREFIX, id)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPokemonName {
    pub english: Option<String>,
    pub japanese: Option<String>,
    pub chinese: Option<String>,
    pub french: Option<String>,
}

/// Creation input: everything but `id`, which the store assigns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPokemon {
    pub name: Option<NewPokemonName>,
    #[serde(rename = "type")]
    pub types: Option<TypeInput>,
    pub base: Option<Map<String, Value>>,
    pub image: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

impl NewPokemon {
    /// Presence checks only: `name.english`, `type` and `base`.
    pub fn validate(&self) -> Result<(), ModelError> {
        let has_english = self
            .name
            .as_ref()
            .and_then(|n| n.english.as_deref())
            .is_some_and(|e| !e.is_empty());
        let has_types = self.types.as_ref().is_some_and(TypeInput::is_present);
        if !has_english || !has_types || self.base.is_none() {
            return Err(ModelError::Validation("Missing required fields".into()));
        }
        Ok(())
    }

    /// Validate and build the stored record, filling in defaults.
    pub fn into_pokemon(self, id: u64, public_base_url: &str) -> Result<Pokemon, ModelError> {
        self.validate()?;
        let name = self.name.unwrap_or_default();
        let english = name.english.unwrap_or_default();
        let french = non_empty(name.french).unwrap_or_else(|| english.clone());
        Ok(Pokemon {
            id,
            name: PokemonName {
                japanese: name.japanese.unwrap_or_default(),
                chinese: name.chinese.unwrap_or_default(),
                french,
                english,
            },
            types: self.types.map(TypeList::from).unwrap_or_default(),
            base: self.base.unwrap_or_default(),
            image: Some(
                non_empty(self.image).unwrap_or_else(|| default_image_url(public_base_url, id)),
            ),
            extra: Map::new(),
        })
    }
}
