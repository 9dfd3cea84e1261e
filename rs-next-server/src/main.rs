use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use actix_web::{get, middleware, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Deserialize;

use rs_next_core::config::{env_key, env_parsed, env_string};
use rs_next_core::io::list_files;
use rs_next_core::{BackoffModel, PipelineConfig};

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const CORPUS_EXTENSION: &str = "txt";
/// Upper bound for `count` on `/v1/predict`
const MAX_COUNT: usize = 100;

/// Query parameters for the `/v1/predict` endpoint
#[derive(Deserialize)]
struct PredictParams {
	text: Option<String>,
	/// Number of words to generate, 1 when absent
	count: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>
}

struct SharedData {
	model: Option<Arc<BackoffModel>>
}

/// Settings read once at startup
struct Settings {
	data_dir: PathBuf,
	pipeline: PipelineConfig,
}

/// A corpus name must stay inside the data directory.
fn is_valid_name(name: &str) -> bool {
	!name.is_empty()
		&& !name.contains("..")
		&& !name.contains('/')
		&& !name.contains('\\')
}

/// HTTP GET endpoint `/v1/predict`
///
/// Returns the next word for `text`, or the generated continuation when
/// `count > 1`. Answers 204 when nothing can be predicted and 400 when
/// `count` exceeds [`MAX_COUNT`].
#[get("/v1/predict")]
async fn get_prediction(data: web::Data<Mutex<SharedData>>, query: web::Query<PredictParams>) -> impl Responder {
	let text = query.text.as_deref().unwrap_or("");
	let count = query.count.unwrap_or(1).max(1);
	if count > MAX_COUNT {
		return HttpResponse::BadRequest().body(format!("count must be at most {MAX_COUNT}"));
	}

	// The lock only guards the swap; prediction runs on a shared handle
	let model = match data.lock() {
		Ok(shared_data) => shared_data.model.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let Some(model) = model else {
		return HttpResponse::ServiceUnavailable().body("No model loaded");
	};

	let prediction = if count == 1 {
		model.predict(text)
	} else {
		model.generate(text, count).map(|generated| {
			let continuation = generated[text.trim().len()..].trim_start();
			(!continuation.is_empty()).then(|| continuation.to_owned())
		})
	};

	match prediction {
		Ok(Some(words)) => HttpResponse::Ok().body(words),
		Ok(None) => HttpResponse::NoContent().finish(),
		Err(e) => {
			error!("Prediction failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

#[get("/v1/models")]
async fn get_models(settings: web::Data<Settings>) -> impl Responder {
	match list_files(&settings.data_dir, CORPUS_EXTENSION) {
		Ok(files) => {
			let names: Vec<&str> = files
				.iter()
				.filter_map(|file| file.strip_suffix(".txt"))
				.collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models")
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.model {
		Some(model) => HttpResponse::Ok().body(model.name().to_owned()),
		None => HttpResponse::NoContent().finish(),
	}
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Loads `<data>/<name>.txt`, training it first when no cached copy exists.
/// The previous model keeps serving until the new one is ready.
#[put("/v1/load_model")]
async fn put_model(
	data: web::Data<Mutex<SharedData>>,
	settings: web::Data<Settings>,
	query: web::Query<ModelQuery>,
) -> impl Responder {
	let name = match &query.name {
		Some(s) if is_valid_name(s.trim()) => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or invalid model name"),
	};

	let corpus_path = settings.data_dir.join(format!("{name}.{CORPUS_EXTENSION}"));
	if !corpus_path.is_file() {
		return HttpResponse::NotFound().body(format!("Unknown model: {name}"));
	}

	let pipeline = settings.pipeline.clone();
	let loaded = web::block(move || BackoffModel::new(&corpus_path, &pipeline)).await;
	let model = match loaded {
		Ok(Ok(m)) => m,
		Err(e) => {
			error!("Loading worker for {name:?} failed: {e}");
			return HttpResponse::InternalServerError().body("Failed to load model");
		}
		Ok(Err(e)) => {
			error!("Failed to load model {name:?}: {e}");
			return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"));
		}
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.model = Some(Arc::new(model));
	info!("Model {name:?} loaded");

	HttpResponse::Ok().body("Model loaded successfully")
}

fn invalid_input(e: rs_next_core::NextWordError) -> std::io::Error {
	std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

/// Main entry point for the server.
///
/// Starts without a model; `PUT /v1/load_model` selects one.
///
/// # Environment
/// - `RS_NEXT_DATA_DIR`: corpus directory (default `./data`)
/// - `RS_NEXT_HOST` / `RS_NEXT_PORT`: bind address (default `127.0.0.1:5000`)
/// - `RS_NEXT_TEST_FRACTION`, `RS_NEXT_SEED`, `RS_NEXT_MAX_CONTEXT`: training settings
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let data_dir = env_string(&env_key("DATA_DIR"))
		.map_err(invalid_input)?
		.unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned());
	let host = env_string(&env_key("HOST"))
		.map_err(invalid_input)?
		.unwrap_or_else(|| DEFAULT_HOST.to_owned());
	let port = env_parsed::<u16>(&env_key("PORT"))
		.map_err(invalid_input)?
		.unwrap_or(DEFAULT_PORT);
	let pipeline = PipelineConfig::from_env().map_err(invalid_input)?;

	let settings = web::Data::new(Settings { data_dir: PathBuf::from(data_dir), pipeline });
	let shared_model = web::Data::new(Mutex::new(SharedData { model: None }));

	info!("Serving {} on {host}:{port}", settings.data_dir.display());
	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.app_data(shared_model.clone())
			.app_data(settings.clone())
			.service(get_prediction)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_model)
	})
		.bind((host.as_str(), port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test::{TestRequest, call_and_read_body, call_service, init_service};
	use actix_web::web::Bytes;

	fn settings(dir: &tempfile::TempDir) -> web::Data<Settings> {
		web::Data::new(Settings {
			data_dir: dir.path().to_path_buf(),
			pipeline: PipelineConfig { seed: Some(3), ..PipelineConfig::default() },
		})
	}

	fn write_king(dir: &tempfile::TempDir) {
		let corpus = ["the king is dead", "long live the king"].repeat(10).join("\n");
		std::fs::write(dir.path().join("king.txt"), corpus).unwrap();
	}

	#[test]
	fn test_name_validation() {
		assert!(is_valid_name("king"));
		assert!(!is_valid_name(""));
		assert!(!is_valid_name("../etc/passwd"));
		assert!(!is_valid_name("a/b"));
	}

	#[actix_web::test]
	async fn test_predict_without_model_is_unavailable() {
		let dir = tempfile::tempdir().unwrap();
		let app = init_service(
			App::new()
				.app_data(web::Data::new(Mutex::new(SharedData { model: None })))
				.app_data(settings(&dir))
				.service(get_prediction)
				.service(get_loaded_model),
		)
		.await;

		let req = TestRequest::get().uri("/v1/predict?text=the").to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);

		let req = TestRequest::get().uri("/v1/loaded_model").to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
	}

	#[actix_web::test]
	async fn test_load_then_predict() {
		let dir = tempfile::tempdir().unwrap();
		write_king(&dir);
		let app = init_service(
			App::new()
				.app_data(web::Data::new(Mutex::new(SharedData { model: None })))
				.app_data(settings(&dir))
				.service(get_prediction)
				.service(get_models)
				.service(put_model)
				.service(get_loaded_model),
		)
		.await;

		let req = TestRequest::get().uri("/v1/models").to_request();
		assert_eq!(call_and_read_body(&app, req).await, Bytes::from_static(b"king"));

		let req = TestRequest::put().uri("/v1/load_model?name=missing").to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = TestRequest::put().uri("/v1/load_model?name=king").to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

		let req = TestRequest::get().uri("/v1/loaded_model").to_request();
		assert_eq!(call_and_read_body(&app, req).await, Bytes::from_static(b"king"));

		let req = TestRequest::get().uri("/v1/predict?text=the%20king").to_request();
		assert_eq!(call_and_read_body(&app, req).await, Bytes::from_static(b"is"));

		let req = TestRequest::get().uri("/v1/predict?text=long%20live&count=4").to_request();
		assert_eq!(call_and_read_body(&app, req).await, Bytes::from_static(b"the king is dead"));

		let req = TestRequest::get().uri(&format!("/v1/predict?text=the&count={MAX_COUNT}")).to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

		let req = TestRequest::get().uri(&format!("/v1/predict?text=the&count={}", MAX_COUNT + 1)).to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = TestRequest::get().uri("/v1/predict?text=queen").to_request();
		assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
	}
}
