use std::path::PathBuf;

use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use markov_core::{io, TransitionModel, WalkError, DEFAULT_CORPUS};

/// Server configuration, from the command line or the environment.
#[derive(Parser, Debug)]
#[command(name = "markov-server", about = "Serve random walks over a Markov chain")]
struct Config {
	/// Address to bind
	#[arg(long, env = "MARKOV_HOST", default_value = "127.0.0.1")]
	host: String,

	#[arg(long, env = "MARKOV_PORT", default_value_t = 5000)]
	port: u16,

	/// Corpus text
	#[arg(short = 't', long, conflicts_with = "file", default_value = DEFAULT_CORPUS)]
	text: String,

	/// Read the corpus from a file
	#[arg(short = 'f', long)]
	file: Option<PathBuf>,

	/// Walk length used when a request does not give one
	#[arg(long, env = "MARKOV_MAX_LENGTH", default_value_t = 50)]
	default_max_length: usize,

	/// Longest walk a request may ask for
	#[arg(long, env = "MARKOV_MAX_LENGTH_LIMIT", default_value_t = 10_000)]
	max_length_limit: usize,
}

impl Config {
	fn corpus(&self) -> anyhow::Result<String> {
		match &self.file {
			Some(path) => io::read_corpus(path)
				.with_context(|| format!("Failed to read corpus '{}'", path.display())),
			None => Ok(self.text.clone()),
		}
	}
}

/// Query parameters of the `/v1/walk` endpoint
#[derive(Deserialize)]
struct WalkParams {
	start: Option<String>,
	max_length: Option<usize>,
	seed: Option<u64>,
}

/// Read-only state shared by every worker.
struct SharedData {
	model: TransitionModel<char>,
	default_max_length: usize,
	max_length_limit: usize,
}

impl WalkParams {
	/// Resolves the start symbol: a single character, or the first symbol of the corpus.
	fn start_symbol(&self, model: &TransitionModel<char>) -> Result<char, String> {
		match &self.start {
			None => model.symbols().next().copied().ok_or_else(|| "Model is empty".to_owned()),
			Some(s) => {
				let mut chars = s.chars();
				match (chars.next(), chars.next()) {
					(Some(c), None) => Ok(c),
					_ => Err("Start must be a single character".to_owned()),
				}
			}
		}
	}
}

/// HTTP GET endpoint `/v1/walk`
///
/// Generates a walk over the shared model and returns it as plain text.
/// An unknown start symbol answers 404, an invalid length or start 400.
/// Lengths above the configured limit are refused with 400.
#[get("/v1/walk")]
async fn get_walk(data: web::Data<SharedData>, query: web::Query<WalkParams>) -> impl Responder {
	let start = match query.start_symbol(&data.model) {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let max_length = query.max_length.unwrap_or(data.default_max_length);
	if max_length > data.max_length_limit {
		warn!(max_length, limit = data.max_length_limit, "walk rejected");
		return HttpResponse::BadRequest()
			.body(format!("max_length must be <= {}", data.max_length_limit));
	}

	let walker = data.model.walker();
	let result = match query.seed {
		Some(seed) => walker.walk_with_rng(&start, max_length, &mut StdRng::seed_from_u64(seed)),
		None => walker.walk(&start, max_length),
	};

	match result {
		Ok(symbols) => HttpResponse::Ok().body(symbols.into_iter().collect::<String>()),
		Err(e @ WalkError::UnknownStartSymbol(_)) => {
			warn!(error = %e, "walk rejected");
			HttpResponse::NotFound().body(e.to_string())
		}
		Err(e @ WalkError::InvalidLength(_)) => {
			warn!(error = %e, "walk rejected");
			HttpResponse::BadRequest().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/symbols`, one symbol per line in first-seen order.
#[get("/v1/symbols")]
async fn get_symbols(data: web::Data<SharedData>) -> impl Responder {
	let symbols: Vec<String> = data.model.symbols().map(char::to_string).collect();
	HttpResponse::Ok().body(symbols.join("\n"))
}

/// HTTP GET endpoint `/v1/model`, the transition counts as nested JSON maps.
#[get("/v1/model")]
async fn get_model(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(&data.model)
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_walk).service(get_symbols).service(get_model);
}

fn init_logging() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(filter)
		.init();
}

/// Main entry point for the server.
///
/// Builds the model once from the configured corpus and shares it with every
/// worker. The model is never mutated, so no lock is needed.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	init_logging();
	let config = Config::parse();

	let model = TransitionModel::from_text(&config.corpus()?);
	info!(symbols = model.len(), host = %config.host, port = config.port, "starting server");

	let shared_data = web::Data::new(SharedData {
		model,
		default_max_length: config.default_max_length,
		max_length_limit: config.max_length_limit,
	});

	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;

	fn shared(text: &str) -> web::Data<SharedData> {
		web::Data::new(SharedData {
			model: TransitionModel::from_text(text),
			default_max_length: 8,
			max_length_limit: 100,
		})
	}

	#[actix_web::test]
	async fn walk_stays_in_the_cycle() {
		let app = test::init_service(App::new().app_data(shared("AABAAB")).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/walk?start=A&max_length=6").to_request();
		let body = test::call_and_read_body(&app, req).await;
		let walk = String::from_utf8(body.to_vec()).unwrap();

		assert_eq!(walk.chars().count(), 6);
		assert!(walk.starts_with('A'));
		assert!(walk.chars().all(|c| c == 'A' || c == 'B'));
	}

	#[actix_web::test]
	async fn seeded_walks_are_reproducible() {
		let app = test::init_service(App::new().app_data(shared("abracadabra")).configure(routes)).await;

		let mut bodies = Vec::new();
		for _ in 0..2 {
			let req = test::TestRequest::get().uri("/v1/walk?start=a&max_length=30&seed=12").to_request();
			bodies.push(test::call_and_read_body(&app, req).await);
		}
		assert_eq!(bodies[0], bodies[1]);
	}

	#[actix_web::test]
	async fn defaults_to_first_symbol_and_configured_length() {
		let app = test::init_service(App::new().app_data(shared("xyxyxyxy")).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/walk").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(&body[..], b"xyxyxyxy");
	}

	#[actix_web::test]
	async fn length_limit_is_reported() {
		let app = test::init_service(App::new().app_data(shared("abab")).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/walk?start=a&max_length=101").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		assert_eq!(&test::read_body(resp).await[..], b"max_length must be <= 100");

		let req = test::TestRequest::get().uri("/v1/walk?start=a&max_length=100").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body.len(), 100);
	}

	#[::core::prelude::v1::test]
	fn config_defaults() {
		let config = Config::try_parse_from(["markov-server"]).unwrap();
		assert_eq!(config.text, DEFAULT_CORPUS);
		assert_eq!(config.max_length_limit, 10_000);
		assert!(config.default_max_length <= config.max_length_limit);
	}

	#[actix_web::test]
	async fn dead_end_is_not_an_error() {
		let app = test::init_service(App::new().app_data(shared("AB")).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/walk?start=A&max_length=5").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(&test::read_body(resp).await[..], b"AB");
	}

	#[actix_web::test]
	async fn rejects_bad_requests() {
		let app = test::init_service(App::new().app_data(shared("AB")).configure(routes)).await;

		let cases = [
			("/v1/walk?start=Z", StatusCode::NOT_FOUND),
			("/v1/walk?start=A&max_length=0", StatusCode::BAD_REQUEST),
			("/v1/walk?start=AB", StatusCode::BAD_REQUEST),
			("/v1/walk?start=A&max_length=-1", StatusCode::BAD_REQUEST),
			("/v1/walk?start=A&max_length=101", StatusCode::BAD_REQUEST),
			("/v1/walk?start=A&max_length=50000000", StatusCode::BAD_REQUEST),
			("/v1/walk?start=A&max_length=100", StatusCode::OK),
		];
		for (uri, expected) in cases {
			let req = test::TestRequest::get().uri(uri).to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), expected, "{uri}");
		}
	}

	#[actix_web::test]
	async fn empty_model_without_start() {
		let app = test::init_service(App::new().app_data(shared("")).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/walk").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn lists_symbols_and_model() {
		let app = test::init_service(App::new().app_data(shared("AABAAB")).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/symbols").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(&body[..], b"A\nB");

		let req = test::TestRequest::get().uri("/v1/model").to_request();
		let model: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(model["A"]["A"], 2);
		assert_eq!(model["A"]["B"], 2);
		assert_eq!(model["B"]["A"], 2);
		assert!(model["B"].get("B").is_none());
	}
}
