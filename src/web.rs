use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::AnalyzerConfig;
use crate::parser::{load_matches_from_csv_reader, load_matches_from_json};
use crate::schedule::scoring::filter_by_severity;
use crate::schedule::{Analyzer, FixOutcome, Match, Severity};
use crate::store::{InMemoryStore, MatchStore};

// In-memory snapshot of the current schedule (in production, the caller's match store)
pub struct AppState {
    pub store: Mutex<Option<InMemoryStore>>,
    pub analyzer: Analyzer,
}

impl AppState {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            store: Mutex::new(None),
            analyzer: Analyzer::new(config),
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, Option<InMemoryStore>>> {
        self.store
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("match store lock poisoned"))
    }
}

#[derive(Deserialize)]
pub struct AnalysisQuery {
    severity: Option<Severity>,
}

fn error_response(mut builder: actix_web::HttpResponseBuilder, message: impl Into<String>) -> HttpResponse {
    builder.json(serde_json::json!({"success": false, "error": message.into()}))
}

fn no_schedule() -> HttpResponse {
    error_response(HttpResponse::NotFound(), "No schedule loaded")
}

/// Stores a new snapshot and answers with its analysis
fn replace_snapshot(state: &AppState, matches: Vec<Match>) -> Result<HttpResponse> {
    let result = state.analyzer.analyze(&matches);
    info!(matches = matches.len(), score = result.score, "schedule snapshot replaced");
    *state.lock_store()? = Some(InMemoryStore::new(matches));
    Ok(HttpResponse::Ok().json(result))
}

// Stateless analysis of a posted match list
async fn analyze_matches(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_matches_from_json(&body) {
        Ok(matches) => Ok(HttpResponse::Ok().json(state.analyzer.analyze(&matches))),
        Err(e) => Ok(error_response(
            HttpResponse::BadRequest(),
            format!("Failed to parse matches: {}", e),
        )),
    }
}

async fn replace_matches(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_matches_from_json(&body) {
        Ok(matches) => replace_snapshot(&state, matches),
        Err(e) => Ok(error_response(
            HttpResponse::BadRequest(),
            format!("Failed to parse matches: {}", e),
        )),
    }
}

// CSV upload endpoint
async fn upload_csv(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_matches_from_csv_reader(&body[..]) {
        Ok(matches) => replace_snapshot(&state, matches),
        Err(e) => {
            warn!(error = %e, "rejected CSV upload");
            Ok(error_response(
                HttpResponse::BadRequest(),
                format!("Failed to process CSV: {}", e),
            ))
        }
    }
}

async fn get_analysis(query: web::Query<AnalysisQuery>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.lock_store()?;
    let Some(ref store) = *store else {
        return Ok(no_schedule());
    };

    let result = state.analyzer.analyze(store.matches());
    match query.severity {
        Some(severity) => Ok(HttpResponse::Ok().json(filter_by_severity(&result, severity))),
        None => Ok(HttpResponse::Ok().json(result)),
    }
}

async fn get_fix(index: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.lock_store()?;
    let Some(ref store) = *store else {
        return Ok(no_schedule());
    };

    let result = state.analyzer.analyze(store.matches());
    let Some(issue) = result.issues.get(*index) else {
        return Ok(error_response(HttpResponse::NotFound(), "No issue at that index"));
    };

    let outcome = state.analyzer.suggest_fix(store.matches(), issue);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "issue": issue,
        "fix": outcome,
    })))
}

async fn apply_fix(index: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut guard = state.lock_store()?;
    let Some(ref mut store) = *guard else {
        return Ok(no_schedule());
    };

    let before = state.analyzer.analyze(store.matches());
    let Some(issue) = before.issues.get(*index) else {
        return Ok(error_response(HttpResponse::NotFound(), "No issue at that index"));
    };

    let action = match state.analyzer.suggest_fix(store.matches(), issue) {
        FixOutcome::Move { action } => action,
        FixOutcome::Unresolvable { reason } => {
            return Ok(error_response(HttpResponse::Conflict(), reason));
        }
    };

    if !store.apply_fix(issue, &action) {
        return Ok(error_response(
            HttpResponse::Conflict(),
            format!("Match {} could not be updated", action.match_id),
        ));
    }

    let after = state.analyzer.analyze(store.matches());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "action": action,
        "analysis": after,
    })))
}

/// Registers the API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/analyze", web::post().to(analyze_matches))
        .route("/api/matches", web::post().to(replace_matches))
        .route("/api/upload", web::post().to(upload_csv))
        .route("/api/analysis", web::get().to(get_analysis))
        .service(web::resource("/api/issues/{index}/fix").route(web::get().to(get_fix)))
        .service(web::resource("/api/issues/{index}/apply").route(web::post().to(apply_fix)));
}

pub async fn start_server(port: u16, config: AnalyzerConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
