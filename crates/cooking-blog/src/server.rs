//! HTTP surface of the cooking blog.
//!
//! Routes:
//! - `GET /`: homepage with category tiles, latest recipes and three featured categories
//! - `GET /categories`, `GET /categories/{id}`: category index and recipes per category
//! - `GET /recipe/{id}`: single recipe
//! - `POST /search`: full-text search on the `searchTerm` form field
//! - `GET /explore-latest`, `GET /explore-random`
//! - `GET|POST /submit-recipe`: submission form and its multipart handler
//!
//! Anything else falls through to the static public directory.
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::FormRejection, DefaultBodyLimit, Multipart,
        Path as UrlPath, State,
    },
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use blog_common::model::{NewRecipe, Recipe};
use blog_common::store::BlogStore;

use crate::error::AppError;
use crate::flash::{ensure_session, FlashKind, FlashStore};
use crate::upload::{is_image_filename, UploadStore};
use crate::views::Views;

const HOME_LIMIT: usize = 5;
const CATEGORY_LIMIT: usize = 20;
const LATEST_LIMIT: usize = 5;
const FEATURED_CATEGORIES: [&str; 3] = ["Thai", "American", "Chinese"];

const SUBMIT_PATH: &str = "/submit-recipe";
const SUBMIT_SUCCESS: &str = "Recipe has been added.";

/// Collaborators shared by every handler. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: BlogStore,
    pub flash: Arc<FlashStore>,
    pub views: Arc<Views>,
    pub uploads: Arc<UploadStore>,
}

pub fn router(state: AppState, public_dir: &Path, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/categories", get(explore_categories))
        .route("/categories/{id}", get(explore_categories_by_id))
        .route("/recipe/{id}", get(explore_recipe))
        .route("/search", post(search_recipe))
        .route("/explore-latest", get(explore_latest))
        .route("/explore-random", get(explore_random))
        .route(SUBMIT_PATH, get(submit_recipe).post(submit_recipe_on_post))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Food {
    latest: Vec<Recipe>,
    thai: Vec<Recipe>,
    american: Vec<Recipe>,
    chinese: Vec<Recipe>,
}

async fn homepage(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let [thai_tag, american_tag, chinese_tag] = FEATURED_CATEGORIES;
    let store = &state.store;

    let (categories, latest, thai, american, chinese) = tokio::try_join!(
        store.list_categories(HOME_LIMIT),
        store.latest_recipes(HOME_LIMIT),
        store.recipes_by_category(thai_tag, HOME_LIMIT),
        store.recipes_by_category(american_tag, HOME_LIMIT),
        store.recipes_by_category(chinese_tag, HOME_LIMIT),
    )?;

    let food = Food {
        latest,
        thai,
        american,
        chinese,
    };
    state.views.render(
        "index.html",
        context! { title => "Cooking Blog - Home", categories => categories, food => food },
    )
}

async fn explore_categories(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let categories = state.store.list_categories(CATEGORY_LIMIT).await?;
    state.views.render(
        "categories.html",
        context! { title => "Cooking Blog - Categories", categories => categories },
    )
}

async fn explore_categories_by_id(
    State(state): State<AppState>,
    UrlPath(category): UrlPath<String>,
) -> Result<Html<String>, AppError> {
    let category_by_id = state
        .store
        .recipes_by_category(&category, CATEGORY_LIMIT)
        .await?;
    state.views.render(
        "categories.html",
        context! {
            title => "Cooking Blog - Categories",
            category => category,
            category_by_id => category_by_id
        },
    )
}

async fn explore_recipe(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Html<String>, AppError> {
    let recipe = state
        .store
        .find_recipe(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("recipe not found: {id}")))?;
    state.views.render(
        "recipe.html",
        context! { title => "Cooking Blog - Recipe", recipe => recipe },
    )
}

#[derive(Debug, Default, Deserialize)]
struct SearchForm {
    #[serde(rename = "searchTerm", default)]
    search_term: String,
}

async fn search_recipe(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let SearchForm { search_term } = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable search form, searching for nothing");
            SearchForm::default()
        }
    };

    let recipes = state.store.search_recipes(&search_term).await?;
    info!(term = %search_term, results = recipes.len(), "search");
    state.views.render(
        "search.html",
        context! { title => "Cooking Blog - Search", recipes => recipes },
    )
}

async fn explore_latest(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let recipes = state.store.latest_recipes(LATEST_LIMIT).await?;
    state.views.render(
        "explore-latest.html",
        context! { title => "Cooking Blog - Explore Latest", recipes => recipes },
    )
}

async fn explore_random(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let recipes = state.store.random_recipes(1).await?;
    state.views.render(
        "explore-random.html",
        context! { title => "Cooking Blog - Explore Random", recipes => recipes },
    )
}

async fn submit_recipe(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let (jar, session) = ensure_session(jar);
    let info_errors = state.flash.drain(&session, FlashKind::InfoErrors).await;
    let info_submits = state.flash.drain(&session, FlashKind::InfoSubmit).await;

    let html = state.views.render(
        "submit-recipe.html",
        context! {
            title => "Cooking Blog - Submit Recipe",
            info_errors => info_errors,
            info_submits => info_submits
        },
    )?;
    Ok((jar, html))
}

/// Store a submitted recipe, then always redirect back to the form with a one-shot notice.
///
/// The image (if any) is fully written before the recipe is stored. If storing fails, the
/// image is removed again. Only a failed image write answers with an error page.
async fn submit_recipe_on_post(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(CookieJar, Redirect), AppError> {
    let (jar, session) = ensure_session(jar);

    let submission = match multipart {
        Ok(multipart) => read_submission(multipart).await,
        Err(rejection) => Err(AppError::Upload(rejection.body_text())),
    };
    let submission = match submission {
        Ok(submission) => submission,
        Err(e) => {
            warn!(error = %e, "unreadable recipe submission");
            state
                .flash
                .push(&session, FlashKind::InfoErrors, &e.to_string())
                .await;
            return Ok((jar, Redirect::to(SUBMIT_PATH)));
        }
    };

    let image = match &submission.image {
        Some(upload) => state.uploads.save(&upload.filename, &upload.bytes).await?,
        None => {
            info!("no image uploaded with submission");
            String::new()
        }
    };

    match state.store.insert_recipe(submission.into_recipe(image.clone())).await {
        Ok(id) => {
            info!(id, image = %image, "recipe submitted");
            state
                .flash
                .push(&session, FlashKind::InfoSubmit, SUBMIT_SUCCESS)
                .await;
        }
        Err(e) => {
            warn!(error = %e, "storing submitted recipe failed");
            if !image.is_empty() {
                state.uploads.remove(&image).await;
            }
            state
                .flash
                .push(&session, FlashKind::InfoErrors, &e.to_string())
                .await;
        }
    }

    Ok((jar, Redirect::to(SUBMIT_PATH)))
}

struct ImageUpload {
    filename: String,
    bytes: Bytes,
}

#[derive(Default)]
struct Submission {
    name: String,
    description: String,
    email: String,
    ingredients: Vec<String>,
    category: String,
    image: Option<ImageUpload>,
}

impl Submission {
    fn into_recipe(self, image: String) -> NewRecipe {
        NewRecipe {
            name: self.name,
            description: self.description,
            email: self.email,
            ingredients: self.ingredients,
            category: self.category,
            image,
        }
    }
}

/// Collect the submission form. Repeated `ingredients` fields keep their order; blank
/// ingredient rows are dropped. A file field without a filename means "no image"; any other
/// file must carry an image extension.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if !filename.is_empty() && !is_image_filename(&filename) {
                    return Err(AppError::Upload(format!("not an image file: {filename}")));
                }
                let bytes = field.bytes().await?;
                if !filename.is_empty() {
                    submission.image = Some(ImageUpload { filename, bytes });
                }
            }
            "ingredients" | "ingredients[]" => {
                let line = field.text().await?;
                let line = line.trim();
                if !line.is_empty() {
                    submission.ingredients.push(line.to_string());
                }
            }
            "name" => submission.name = field.text().await?,
            "description" => submission.description = field.text().await?,
            "email" => submission.email = field.text().await?,
            "category" => submission.category = field.text().await?,
            _ => {}
        }
    }

    Ok(submission)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "cookingblogboundary";

    struct TestApp {
        app: Router,
        store: BlogStore,
        uploads: Arc<UploadStore>,
        public: tempfile::TempDir,
    }

    impl TestApp {
        fn uploaded_files(&self) -> usize {
            std::fs::read_dir(self.public.path().join("uploads"))
                .unwrap()
                .count()
        }
    }

    async fn test_app() -> TestApp {
        let public = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(public.path().join("uploads"));
        uploads.ensure_dir().await.unwrap();
        build_app(public, BlogStore::open_in_memory().unwrap(), uploads)
    }

    fn build_app(public: tempfile::TempDir, store: BlogStore, uploads: UploadStore) -> TestApp {
        let uploads = Arc::new(uploads);
        let state = AppState {
            store: store.clone(),
            flash: Arc::new(FlashStore::in_memory(Duration::from_secs(600))),
            views: Arc::new(Views::new().unwrap()),
            uploads: Arc::clone(&uploads),
        };
        let app = router(state, public.path(), 1024 * 1024);

        TestApp {
            app,
            store,
            uploads,
            public,
        }
    }

    fn recipe(name: &str, description: &str, category: &str) -> NewRecipe {
        NewRecipe {
            name: name.to_string(),
            description: description.to_string(),
            email: "hello@email.com".to_string(),
            ingredients: vec!["1 carrot".to_string()],
            category: category.to_string(),
            image: String::new(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        send(app, builder.body(Body::empty()).unwrap()).await
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
            .expect("session cookie set")
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Body {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    async fn submit(app: &Router, body: Body, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(SUBMIT_PATH)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        send(app, builder.body(body).unwrap()).await
    }

    async fn search(app: &Router, form: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/search")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        send(app, request).await
    }

    const SUBMISSION_FIELDS: &[(&str, &str)] = &[
        ("name", "Stir-fried vegetables"),
        ("description", "Crush the garlic and finely slice the chilli."),
        ("email", "cook@email.com"),
        ("ingredients", "1 clove of garlic"),
        ("ingredients", "   "),
        ("ingredients", "1 fresh red chilli"),
        ("category", "Chinese"),
    ];

    #[tokio::test]
    async fn test_homepage_on_empty_store() {
        let t = test_app().await;
        let response = get(&t.app, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Cooking Blog - Home"));
        assert!(html.contains("No categories yet."));
        assert!(!html.contains("recipe-card"));
    }

    #[tokio::test]
    async fn test_homepage_slots_are_capped() {
        let t = test_app().await;
        let recipes = (0..7)
            .map(|i| recipe(&format!("Thai dish {i}"), "Spicy.", "Thai"))
            .collect();
        t.store.insert_recipes(recipes).await.unwrap();

        let html = body_text(get(&t.app, "/", None).await).await;
        // Five in "latest", five in "Thai", none in the other featured categories.
        assert_eq!(html.matches("class=\"recipe-card\"").count(), 10);
        assert!(html.contains("Thai dish 6"));
    }

    #[tokio::test]
    async fn test_category_without_recipes_renders_empty_listing() {
        let t = test_app().await;
        t.store.insert_recipe(recipe("Spring rolls", "Roll.", "Chinese")).await.unwrap();

        let response = get(&t.app, "/categories/Mexican", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("No recipes in this category yet."));
        assert!(!html.contains("Spring rolls"));
    }

    #[tokio::test]
    async fn test_category_lists_matching_recipes() {
        let t = test_app().await;
        t.store
            .insert_recipes(vec![
                recipe("Spring rolls", "Roll.", "Chinese"),
                recipe("Key lime pie", "Bake.", "American"),
            ])
            .await
            .unwrap();

        let html = body_text(get(&t.app, "/categories/Chinese", None).await).await;
        assert!(html.contains("Spring rolls"));
        assert!(!html.contains("Key lime pie"));
    }

    #[tokio::test]
    async fn test_recipe_detail() {
        let t = test_app().await;
        let id = t
            .store
            .insert_recipe(recipe("Spring rolls", "Soak the mushrooms.", "Chinese"))
            .await
            .unwrap();

        let response = get(&t.app, &format!("/recipe/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Spring rolls"));
        assert!(html.contains("Soak the mushrooms."));
        assert!(html.contains("1 carrot"));
    }

    #[tokio::test]
    async fn test_recipe_detail_failures_share_error_shape() {
        let t = test_app().await;
        for uri in ["/recipe/424242", "/recipe/not-an-id"] {
            let response = get(&t.app, uri, None).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            let body: serde_json::Value =
                serde_json::from_str(&body_text(response).await).unwrap();
            assert!(body["message"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_search_returns_only_matches() {
        let t = test_app().await;
        t.store
            .insert_recipes(vec![
                recipe("Southern fried chicken", "Brine the chicken.", "American"),
                recipe("Spring rolls", "Soak the mushrooms.", "Chinese"),
            ])
            .await
            .unwrap();

        let response = search(&t.app, "searchTerm=chicken").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Southern fried chicken"));
        assert!(!html.contains("Spring rolls"));
    }

    #[tokio::test]
    async fn test_search_without_term_finds_nothing() {
        let t = test_app().await;
        t.store.insert_recipe(recipe("Spring rolls", "Roll.", "Chinese")).await.unwrap();

        for form in ["searchTerm=", "searchTerm=+++", ""] {
            let response = search(&t.app, form).await;
            assert_eq!(response.status(), StatusCode::OK, "{form:?}");
            let html = body_text(response).await;
            assert!(html.contains("No results found"), "{form:?}");
        }

        let response = send(
            &t.app,
            Request::builder()
                .method("POST")
                .uri("/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_explore_latest_is_capped() {
        let t = test_app().await;
        let recipes = (0..8)
            .map(|i| recipe(&format!("Dish {i}"), "Cook.", "Indian"))
            .collect();
        t.store.insert_recipes(recipes).await.unwrap();

        let html = body_text(get(&t.app, "/explore-latest", None).await).await;
        assert_eq!(html.matches("class=\"recipe-card\"").count(), 5);
        assert!(html.contains("Dish 7"));
        assert!(!html.contains("Dish 2"));
    }

    #[tokio::test]
    async fn test_explore_random_varies() {
        let t = test_app().await;
        t.store
            .insert_recipes(vec![
                recipe("Spring rolls", "Roll.", "Chinese"),
                recipe("Key lime pie", "Bake.", "American"),
            ])
            .await
            .unwrap();

        let mut seen = HashSet::new();
        for _ in 0..60 {
            let html = body_text(get(&t.app, "/explore-random", None).await).await;
            assert_eq!(html.matches("class=\"recipe-card\"").count(), 1);
            for name in ["Spring rolls", "Key lime pie"] {
                if html.contains(name) {
                    seen.insert(name);
                }
            }
            if seen.len() == 2 {
                break;
            }
        }
        assert_eq!(seen.len(), 2, "random exploration never varied");
    }

    #[tokio::test]
    async fn test_submit_without_image() {
        let t = test_app().await;

        let response = submit(&t.app, multipart_body(SUBMISSION_FIELDS, None), None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], SUBMIT_PATH);
        let cookie = session_cookie(&response);

        let stored = t.store.latest_recipes(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Stir-fried vegetables");
        assert_eq!(stored[0].email, "cook@email.com");
        assert_eq!(stored[0].category, "Chinese");
        assert_eq!(stored[0].ingredients, vec!["1 clove of garlic", "1 fresh red chilli"]);
        assert_eq!(stored[0].image, "");

        let first = body_text(get(&t.app, SUBMIT_PATH, Some(&cookie)).await).await;
        assert_eq!(first.matches(SUBMIT_SUCCESS).count(), 1);

        let second = body_text(get(&t.app, SUBMIT_PATH, Some(&cookie)).await).await;
        assert!(!second.contains(SUBMIT_SUCCESS));
    }

    #[tokio::test]
    async fn test_submit_with_image() {
        let t = test_app().await;

        let response = submit(
            &t.app,
            multipart_body(SUBMISSION_FIELDS, Some(("veg.jpg", &b"jpeg bytes"[..]))),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let stored = t.store.latest_recipes(1).await.unwrap();
        let image = &stored[0].image;
        assert!(image.ends_with("-veg.jpg"), "unexpected image name {image}");
        assert_eq!(std::fs::read(t.uploads.path_of(image)).unwrap(), b"jpeg bytes");

        let served = get(&t.app, &format!("/uploads/{image}"), None).await;
        assert_eq!(served.status(), StatusCode::OK);
        assert_eq!(body_text(served).await, "jpeg bytes");
    }

    #[tokio::test]
    async fn test_submit_with_empty_file_field_stores_no_image() {
        let t = test_app().await;
        let response = submit(
            &t.app,
            multipart_body(SUBMISSION_FIELDS, Some(("", &b""[..]))),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(t.store.latest_recipes(1).await.unwrap()[0].image, "");
    }

    #[tokio::test]
    async fn test_notices_are_per_session() {
        let t = test_app().await;
        let response = submit(&t.app, multipart_body(SUBMISSION_FIELDS, None), None).await;
        let cookie = session_cookie(&response);

        let other = get(&t.app, SUBMIT_PATH, None).await;
        assert_ne!(session_cookie(&other), cookie);
        assert!(!body_text(other).await.contains(SUBMIT_SUCCESS));

        let mine = body_text(get(&t.app, SUBMIT_PATH, Some(&cookie)).await).await;
        assert!(mine.contains(SUBMIT_SUCCESS));
    }

    #[tokio::test]
    async fn test_malformed_submission_redirects_with_error() {
        let t = test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri(SUBMIT_PATH)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=Pie"))
            .unwrap();
        let response = send(&t.app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = session_cookie(&response);

        assert_eq!(t.store.count_recipes().await.unwrap(), 0);
        let html = body_text(get(&t.app, SUBMIT_PATH, Some(&cookie)).await).await;
        assert!(html.contains("notice-error"));
        assert!(!html.contains(SUBMIT_SUCCESS));
    }

    #[tokio::test]
    async fn test_submit_rejects_non_image_upload() {
        let t = test_app().await;
        for filename in ["page.html", "logo.svg"] {
            let response = submit(
                &t.app,
                multipart_body(SUBMISSION_FIELDS, Some((filename, &b"<script>x</script>"[..]))),
                None,
            )
            .await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{filename}");
            let cookie = session_cookie(&response);

            let html = body_text(get(&t.app, SUBMIT_PATH, Some(&cookie)).await).await;
            assert!(html.contains("not an image file"), "{filename}");
        }
        assert_eq!(t.store.count_recipes().await.unwrap(), 0);
        assert_eq!(t.uploaded_files(), 0);
    }

    #[tokio::test]
    async fn test_failed_image_write_stores_nothing() {
        let public = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(public.path().join("missing"));
        let t = build_app(public, BlogStore::open_in_memory().unwrap(), uploads);

        let response = submit(
            &t.app,
            multipart_body(SUBMISSION_FIELDS, Some(("veg.jpg", &b"jpeg bytes"[..]))),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["message"].is_string());
        assert_eq!(t.store.count_recipes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_image_and_flashes_error() {
        let data = tempfile::tempdir().unwrap();
        let db_path = data.path().join("blog.db");
        let store = BlogStore::open(&db_path).unwrap();
        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER recipes_closed BEFORE INSERT ON recipes BEGIN
                     SELECT RAISE(ABORT, 'recipe book is closed');
                 END;",
            )
            .unwrap();

        let public = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(public.path().join("uploads"));
        uploads.ensure_dir().await.unwrap();
        let t = build_app(public, store, uploads);

        let response = submit(
            &t.app,
            multipart_body(SUBMISSION_FIELDS, Some(("veg.jpg", &b"jpeg bytes"[..]))),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], SUBMIT_PATH);
        let cookie = session_cookie(&response);

        assert_eq!(t.store.count_recipes().await.unwrap(), 0);
        assert_eq!(t.uploaded_files(), 0);

        let html = body_text(get(&t.app, SUBMIT_PATH, Some(&cookie)).await).await;
        assert!(html.contains("notice-error"));
        assert!(html.contains("recipe book is closed"));
        assert!(!html.contains(SUBMIT_SUCCESS));
    }
}
