use serde::{Deserialize, Serialize};

/// Store-assigned recipe identifier. Ids only ever grow, so a higher id means a newer recipe.
pub type RecipeId = i64;

/// A recipe category (e.g. "Thai" with a "thai-food.jpg" banner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    /// Display label, also the tag recipes are filed under.
    pub name: String,
    /// Filename of a static image under the public directory.
    pub image: String,
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    /// Submitter contact, never validated.
    pub email: String,
    /// One free-text line per ingredient, in submission order.
    pub ingredients: Vec<String>,
    /// Category tag; expected to match a `Category::name` but not enforced.
    pub category: String,
    /// Uploaded image filename, empty when nothing was uploaded.
    pub image: String,
}

/// A recipe that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub email: String,
    pub ingredients: Vec<String>,
    pub category: String,
    pub image: String,
}

/// A category that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub image: String,
}
