//! Axum + Askama presentation shell over the analytics engine.

use std::collections::BTreeSet;
use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_core::{
    parse_type_list, AnalyticsBundle, CountRow, ExplorerRow, FilterCriteria, KeyMetrics,
    TitleType, TrendPoint, UnknownTitleType, YearCount,
};
use catalog_engine::{AnalyticsEngine, QueryError};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

pub const CRATE_NAME: &str = "catalog-web";

#[derive(Clone)]
pub struct AppState {
    pub engine: AnalyticsEngine,
}

impl AppState {
    pub fn new(engine: AnalyticsEngine) -> Self {
        Self { engine }
    }
}

/// Filter selection as sent by the dashboard form. Missing values fall back to the defaults.
#[derive(Debug, Deserialize, Default)]
struct AnalyticsQuery {
    types: Option<String>,
    min_year: Option<i32>,
    max_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub types: Vec<TitleType>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub default_criteria: FilterCriteria,
}

#[derive(Debug, Clone)]
struct ViewTable {
    title: &'static str,
    rows: Vec<CountRow>,
}

#[derive(Debug, Clone)]
struct HistogramRow {
    range: String,
    count: usize,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    metrics: KeyMetrics,
    type_options: Vec<TypeOption>,
    min_year: i32,
    max_year: i32,
    ranked_views: Vec<ViewTable>,
    addition_trend: Vec<TrendPoint>,
    duration_bins: Vec<HistogramRow>,
    release_years: Vec<YearCount>,
    explorer: Vec<ExplorerRow>,
}

/// One entry of the type selector; `value` is the comma-joined `types` parameter.
#[derive(Debug, Clone)]
struct TypeOption {
    value: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "explorer_partial.html")]
struct ExplorerPartialTemplate {
    explorer: Vec<ExplorerRow>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/explorer", get(explorer_handler))
        .route("/api/analytics", get(analytics_json_handler))
        .route("/api/filters", get(filters_handler))
        .route("/api/load-report", get(load_report_handler))
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, titles = state.engine.store().len(), "serving catalog dashboard");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    let bundle = match run_query(&state.engine, &query) {
        Ok(bundle) => bundle,
        Err(err) => return query_failure(err),
    };
    let available = state.engine.store().available_types();
    let mut selections = vec![available.clone()];
    if available.len() > 1 {
        selections.extend(available.iter().map(|t| vec![*t]));
    }
    let type_options = selections
        .into_iter()
        .map(|types| TypeOption {
            selected: types.iter().copied().collect::<BTreeSet<_>>() == bundle.criteria.types,
            value: types
                .iter()
                .map(TitleType::as_str)
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect();

    render_html(IndexTemplate {
        metrics: bundle.metrics,
        type_options,
        min_year: bundle.criteria.min_year,
        max_year: bundle.criteria.max_year,
        ranked_views: vec![
            ViewTable {
                title: "Content Type Distribution",
                rows: bundle.type_distribution.rows,
            },
            ViewTable {
                title: "Top Countries",
                rows: bundle.top_countries.rows,
            },
            ViewTable {
                title: "Top Genres",
                rows: bundle.top_genres.rows,
            },
            ViewTable {
                title: "Rating Distribution",
                rows: bundle.rating_distribution.rows,
            },
            ViewTable {
                title: "Top Directors",
                rows: bundle.top_directors.rows,
            },
            ViewTable {
                title: "Top Cast Members",
                rows: bundle.top_cast.rows,
            },
        ],
        addition_trend: bundle.addition_trend.points,
        duration_bins: bundle
            .movie_durations
            .bins
            .iter()
            .map(|bin| HistogramRow {
                range: format!("{:.0}-{:.0}", bin.lower, bin.upper),
                count: bin.count,
            })
            .collect(),
        release_years: bundle.release_years.rows,
        explorer: bundle.explorer,
    })
}

async fn explorer_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    match run_query(&state.engine, &query) {
        Ok(bundle) => render_html(ExplorerPartialTemplate {
            explorer: bundle.explorer,
        }),
        Err(err) => query_failure(err),
    }
}

async fn analytics_json_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    match run_query(&state.engine, &query) {
        Ok(bundle) => Json(bundle).into_response(),
        Err(err) => query_failure(err),
    }
}

async fn filters_handler(State(state): State<Arc<AppState>>) -> Response {
    let store = state.engine.store();
    let bounds = store.release_year_bounds();
    Json(FilterOptions {
        types: store.available_types(),
        min_year: bounds.map(|(lo, _)| lo),
        max_year: bounds.map(|(_, hi)| hi),
        default_criteria: state.engine.default_criteria(),
    })
    .into_response()
}

async fn load_report_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.engine.store().load_report().clone()).into_response()
}

fn run_query(engine: &AnalyticsEngine, query: &AnalyticsQuery) -> anyhow::Result<AnalyticsBundle> {
    let types = query.types.as_deref().map(parse_type_list).transpose()?;
    let criteria = engine.resolve_criteria(types, query.min_year, query.max_year);
    Ok(engine.query(&criteria)?)
}

fn render_html<T: Template>(tpl: T) -> Response {
    match tpl.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => server_error(anyhow::anyhow!(err.to_string())),
    }
}

/// Selection problems are the caller's to fix, so they are reported as 400s.
fn query_failure(err: anyhow::Error) -> Response {
    let user_correctable = err.downcast_ref::<QueryError>().is_some()
        || err.downcast_ref::<UnknownTitleType>().is_some();
    if !user_correctable {
        return server_error(err);
    }
    (StatusCode::BAD_REQUEST, Html(format!("Invalid filter: {err}"))).into_response()
}

fn server_error(err: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("Server error: {}", err)),
    )
        .into_response()
}
