//! Embedded document store for categories and recipes.
//!
//! Backed by a single SQLite connection. Every query runs on the blocking thread pool so
//! callers can await it from request handlers without stalling the runtime.
//!
//! Schema:
//! - `categories(id, name, image)`
//! - `recipes(id, name, description, email, ingredients, category, image)` where
//!   `ingredients` is a JSON array of strings
//! - `recipes_fts`: FTS5 index over recipe `name` and `description`, kept in sync by an
//!   insert trigger. Porter stemming, case folded, diacritics preserved.
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::CommonError;
use crate::model::{Category, NewCategory, NewRecipe, Recipe, RecipeId};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL DEFAULT '',
    image TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS recipes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    email       TEXT NOT NULL DEFAULT '',
    ingredients TEXT NOT NULL DEFAULT '[]',
    category    TEXT NOT NULL DEFAULT '',
    image       TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS recipes_category ON recipes (category);

CREATE VIRTUAL TABLE IF NOT EXISTS recipes_fts USING fts5 (
    name,
    description,
    content = 'recipes',
    content_rowid = 'id',
    tokenize = 'porter unicode61 remove_diacritics 0'
);

CREATE TRIGGER IF NOT EXISTS recipes_fts_insert AFTER INSERT ON recipes BEGIN
    INSERT INTO recipes_fts (rowid, name, description)
    VALUES (new.id, new.name, new.description);
END;
"#;

const RECIPE_COLUMNS: &str = "id, name, description, email, ingredients, category, image";

#[derive(Clone)]
pub struct BlogStore {
    conn: Arc<Mutex<Connection>>,
}

impl BlogStore {
    /// Open (or create) the database file at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CommonError> {
        let conn = Connection::open(path.as_ref())?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        info!(path = %path.as_ref().display(), journal_mode = %mode, "store opened");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database. Contents vanish when the store is dropped.
    pub fn open_in_memory() -> Result<Self, CommonError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CommonError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, CommonError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, CommonError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| CommonError::Task("store connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| CommonError::Task(e.to_string()))?
    }

    // --- Categories ---

    /// Up to `limit` categories in insertion order.
    pub async fn list_categories(&self, limit: usize) -> Result<Vec<Category>, CommonError> {
        self.run(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, image FROM categories ORDER BY id LIMIT ?1")?;
            let categories = stmt
                .query_map(params![limit as i64], |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        image: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(categories)
        })
        .await
    }

    pub async fn count_categories(&self) -> Result<u64, CommonError> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    pub async fn insert_categories(&self, categories: Vec<NewCategory>) -> Result<usize, CommonError> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("INSERT INTO categories (name, image) VALUES (?1, ?2)")?;
                for category in &categories {
                    stmt.execute(params![category.name, category.image])?;
                }
            }
            tx.commit()?;
            Ok(categories.len())
        })
        .await
    }

    // --- Recipes ---

    /// Up to `limit` recipes, newest first.
    pub async fn latest_recipes(&self, limit: usize) -> Result<Vec<Recipe>, CommonError> {
        self.run(move |conn| {
            query_recipes(
                conn,
                &format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id DESC LIMIT ?1"),
                params![limit as i64],
            )
        })
        .await
    }

    /// Up to `limit` recipes whose category tag equals `category` exactly (case-sensitive),
    /// in insertion order.
    pub async fn recipes_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<Recipe>, CommonError> {
        let category = category.to_string();
        self.run(move |conn| {
            query_recipes(
                conn,
                &format!(
                    "SELECT {RECIPE_COLUMNS} FROM recipes WHERE category = ?1 ORDER BY id LIMIT ?2"
                ),
                params![category, limit as i64],
            )
        })
        .await
    }

    /// Look up a recipe by its textual id.
    ///
    /// Returns `Err(InvalidId)` when `id` is not a recipe id at all, `Ok(None)` when it is
    /// well-formed but nothing is stored under it.
    pub async fn find_recipe(&self, id: &str) -> Result<Option<Recipe>, CommonError> {
        let id: RecipeId = id
            .trim()
            .parse()
            .map_err(|_| CommonError::InvalidId(id.to_string()))?;
        self.run(move |conn| {
            let recipe = conn
                .query_row(
                    &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
                    params![id],
                    recipe_from_row,
                )
                .optional()?;
            Ok(recipe)
        })
        .await
    }

    /// Full-text search over recipe names and descriptions, best match first.
    ///
    /// Any word of `term` may match. A term without words yields no results.
    pub async fn search_recipes(&self, term: &str) -> Result<Vec<Recipe>, CommonError> {
        let Some(query) = text_query(term) else {
            return Ok(Vec::new());
        };
        self.run(move |conn| {
            query_recipes(
                conn,
                "SELECT r.id, r.name, r.description, r.email, r.ingredients, r.category, r.image
                 FROM recipes_fts
                 JOIN recipes r ON r.id = recipes_fts.rowid
                 WHERE recipes_fts MATCH ?1
                 ORDER BY recipes_fts.rank",
                params![query],
            )
        })
        .await
    }

    /// Up to `size` recipes sampled uniformly at random.
    pub async fn random_recipes(&self, size: usize) -> Result<Vec<Recipe>, CommonError> {
        self.run(move |conn| {
            query_recipes(
                conn,
                &format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY RANDOM() LIMIT ?1"),
                params![size as i64],
            )
        })
        .await
    }

    pub async fn count_recipes(&self) -> Result<u64, CommonError> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    /// Store a new recipe and return its id.
    pub async fn insert_recipe(&self, recipe: NewRecipe) -> Result<RecipeId, CommonError> {
        self.run(move |conn| {
            insert_recipe_row(conn, &recipe)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn insert_recipes(&self, recipes: Vec<NewRecipe>) -> Result<usize, CommonError> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            for recipe in &recipes {
                insert_recipe_row(&tx, recipe)?;
            }
            tx.commit()?;
            Ok(recipes.len())
        })
        .await
    }
}

/// Turn free user input into an FTS5 query that ORs every word as a quoted string.
///
/// Words are runs of alphanumeric characters, the same split the index tokenizer makes, so
/// `chicken's` searches for `chicken` or `s`. Quoting keeps operators such as `NEAR` from
/// being interpreted. Returns `None` when the input contains no words.
pub fn text_query(term: &str) -> Option<String> {
    let words: Vec<String> = term
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{word}\""))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" OR "))
    }
}

fn insert_recipe_row(conn: &Connection, recipe: &NewRecipe) -> Result<(), CommonError> {
    let ingredients = serde_json::to_string(&recipe.ingredients)
        .map_err(|e| CommonError::Sqlite(rusqlite::Error::ToSqlConversionFailure(Box::new(e))))?;
    conn.execute(
        "INSERT INTO recipes (name, description, email, ingredients, category, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            recipe.name,
            recipe.description,
            recipe.email,
            ingredients,
            recipe.category,
            recipe.image
        ],
    )?;
    Ok(())
}

fn query_recipes(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Recipe>, CommonError> {
    let mut stmt = conn.prepare(sql)?;
    let recipes = stmt
        .query_map(params, recipe_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recipes)
}

fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    let raw_ingredients: String = row.get(4)?;
    let ingredients = serde_json::from_str(&raw_ingredients)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        email: row.get(3)?,
        ingredients,
        category: row.get(5)?,
        image: row.get(6)?,
    })
}
