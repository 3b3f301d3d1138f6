//! Recipe catalog: item name → ordered components with per-unit quantities.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::Serialize;
use thiserror::Error;

/// Catalog loading/validation error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A per-unit quantity is not a finite number greater than zero.
    #[error("invalid per-unit quantity '{value}' for component '{component}' of '{item}'")]
    InvalidRatio {
        item: String,
        component: String,
        value: String,
    },

    /// The same item is defined by more than one recipe.
    #[error("duplicate recipe for item '{0}'")]
    DuplicateItem(String),

    /// The same component is listed twice within one recipe.
    #[error("duplicate component '{component}' in recipe for '{item}'")]
    DuplicateComponent { item: String, component: String },

    #[error("item and component names cannot be empty")]
    EmptyName,

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One line of a recipe: `per_unit` of `item` per single unit of the parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub item: String,
    pub per_unit: f64,
}

/// Immutable recipe for one craftable item. Components keep declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    item: String,
    components: Vec<Component>,
}

impl Recipe {
    /// Build a recipe, validating names and per-unit ratios.
    pub fn new<I, S>(item: impl Into<String>, components: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let item = item.into().trim().to_string();
        if item.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let mut out: Vec<Component> = Vec::new();
        for (name, per_unit) in components {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !per_unit.is_finite() || per_unit <= 0.0 {
                return Err(CatalogError::InvalidRatio {
                    item,
                    component: name,
                    value: per_unit.to_string(),
                });
            }
            if out.iter().any(|c| c.item == name) {
                return Err(CatalogError::DuplicateComponent { item, component: name });
            }
            out.push(Component { item: name, per_unit });
        }

        Ok(Self { item, components: out })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

/// Read-only recipe lookup. Items without a recipe are leaf materials.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: HashMap<String, Recipe>,
}

impl Catalog {
    /// Empty catalog: every item is a leaf.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for recipe in recipes {
            if map.contains_key(recipe.item()) {
                return Err(CatalogError::DuplicateItem(recipe.item.clone()));
            }
            map.insert(recipe.item.clone(), recipe);
        }
        Ok(Self { recipes: map })
    }

    /// Parse a catalog from JSON.
    ///
    /// Accepts the map shape `{ "Wall": { "Brick": 4, "Mortar": 1 } }` and the row
    /// shape `[ { "item": "Wall", "mat_used": { "Brick": "4" } } ]`. Per-unit values
    /// may be numbers or numeric strings.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let rows = match file {
            CatalogFile::Map(OrderedPairs(pairs)) => pairs,
            CatalogFile::Rows(rows) => rows.into_iter().map(|r| (r.item, r.mat_used)).collect(),
        };

        let mut recipes = Vec::with_capacity(rows.len());
        for (item, OrderedPairs(components)) in rows {
            let mut parsed = Vec::with_capacity(components.len());
            for (component, raw) in components {
                let per_unit = raw.value().ok_or_else(|| CatalogError::InvalidRatio {
                    item: item.clone(),
                    component: component.clone(),
                    value: raw.to_string(),
                })?;
                parsed.push((component, per_unit));
            }
            recipes.push(Recipe::new(item, parsed)?);
        }

        let catalog = Self::from_recipes(recipes)?;
        tracing::debug!(recipes = catalog.len(), "catalog parsed");
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn recipe(&self, item: &str) -> Option<&Recipe> {
        self.recipes.get(item)
    }

    pub fn is_leaf(&self, item: &str) -> bool {
        !self.recipes.contains_key(item)
    }

    /// Craftable item names, ascending.
    pub fn items(&self) -> Vec<&str> {
        let mut items: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        items.sort_unstable();
        items
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Rows(Vec<RecipeRow>),
    Map(OrderedPairs<OrderedPairs<PerUnit>>),
}

#[derive(serde::Deserialize)]
struct RecipeRow {
    item: String,
    mat_used: OrderedPairs<PerUnit>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PerUnit {
    Number(f64),
    Text(String),
}

impl PerUnit {
    fn value(&self) -> Option<f64> {
        match self {
            PerUnit::Number(n) => Some(*n),
            PerUnit::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for PerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerUnit::Number(n) => write!(f, "{n}"),
            PerUnit::Text(s) => f.write_str(s),
        }
    }
}

/// JSON object read as a list of pairs, keeping document order.
struct OrderedPairs<V>(Vec<(String, V)>);

impl<'de, V> Deserialize<'de> for OrderedPairs<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for PairsVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = OrderedPairs<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    pairs.push((key, value));
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_map_shape_in_declaration_order() {
        let catalog =
            Catalog::from_json_str(r#"{ "Wall": { "Mortar": 1, "Brick": 4, "Beam": 0.5 } }"#)
                .unwrap();
        let recipe = catalog.recipe("Wall").unwrap();
        let names: Vec<&str> = recipe.components().iter().map(|c| c.item.as_str()).collect();
        assert_eq!(names, vec!["Mortar", "Brick", "Beam"]);
        assert_eq!(recipe.components()[2].per_unit, 0.5);
        assert!(catalog.is_leaf("Brick"));
    }

    #[test]
    fn parses_row_shape_with_string_quantities() {
        let json = r#"[
            { "item": "Hammer", "mat_used": { "Wood": "1", "Metal": "3" } },
            { "item": "Metal", "mat_used": { "Ore": 2 } }
        ]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.items(), vec!["Hammer", "Metal"]);
        let hammer = catalog.recipe("Hammer").unwrap();
        assert_eq!(hammer.components()[1], Component { item: "Metal".into(), per_unit: 3.0 });
    }

    #[test]
    fn rejects_non_positive_or_non_numeric_ratios() {
        let err = Catalog::from_json_str(r#"{ "Wall": { "Brick": 0 } }"#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRatio { .. }));

        let err = Catalog::from_json_str(r#"{ "Wall": { "Brick": "lots" } }"#).unwrap_err();
        match err {
            CatalogError::InvalidRatio { item, component, value } => {
                assert_eq!(item, "Wall");
                assert_eq!(component, "Brick");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidRatio, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_recipes() {
        let json = r#"[
            { "item": "Wall", "mat_used": { "Brick": 1 } },
            { "item": "Wall", "mat_used": { "Brick": 2 } }
        ]"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CatalogError::DuplicateItem(name)) if name == "Wall"
        ));
    }

    #[test]
    fn rejects_duplicate_components() {
        let err = Recipe::new("Wall", [("Brick", 1.0), ("Brick", 2.0)]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateComponent { .. }));
    }

    #[test]
    fn rejects_empty_names() {
        assert!(matches!(Recipe::new("  ", [("Brick", 1.0)]), Err(CatalogError::EmptyName)));
        assert!(matches!(Recipe::new("Wall", [("", 1.0)]), Err(CatalogError::EmptyName)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(Catalog::from_json_str("[1, 2"), Err(CatalogError::Parse(_))));
    }
}
