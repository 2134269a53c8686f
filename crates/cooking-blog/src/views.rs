//! HTML views rendered from templates compiled into the binary.
//!
//! Templates use Jinja syntax; values are auto-escaped because every template name ends
//! in `.html`.
use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::error::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("categories.html", include_str!("../templates/categories.html")),
    ("recipe.html", include_str!("../templates/recipe.html")),
    ("search.html", include_str!("../templates/search.html")),
    ("explore-latest.html", include_str!("../templates/explore-latest.html")),
    ("explore-random.html", include_str!("../templates/explore-random.html")),
    ("submit-recipe.html", include_str!("../templates/submit-recipe.html")),
];

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(*name, *source)?;
        }
        Ok(Self { env })
    }

    /// Render the template `name` with `ctx` as its data.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, AppError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}
