//! Catalog entity definitions shared by the service and server crates.

pub mod errors;
pub mod pokemon;

pub use pokemon::{NewPokemon, NewPokemonName, Pokemon, PokemonName, TypeInput, TypeList};
