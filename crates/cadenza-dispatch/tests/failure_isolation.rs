//! Integration tests for failure isolation
//!
//! Every stage of the pipeline can fail with an error or a panic; the
//! dispatcher must still produce a well-formed response:
//! - stage failures go through the error handler chain
//! - failing error handlers fall back to the built-in page
//! - a broken renderer falls back to the inline page
//! - a failing timeline never affects the response

use async_trait::async_trait;
use cadenza_conf::Settings;
use cadenza_dispatch::{
	Activity, Controller, ControllerContext, Dispatcher, ErrorHandler, FALLBACK_MESSAGE, Outcome,
	PostHook, PreHook, Timeline, TimelineError,
};
use cadenza_di::ServiceContainer;
use cadenza_http::{Error, HttpException, Request, Response, Result};
use cadenza_template::{TemplateError, TemplateRenderer};
use cadenza_urls::{Route, Router, SimpleRouter};
use http::StatusCode;
use indexmap::IndexMap;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

// ============================================================================
// Fault injection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
	Router,
	Factory,
	Pre,
	Main,
	Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
	Error,
	Panic,
}

fn fail(fault: Fault) -> Result<()> {
	match fault {
		Fault::Error => Err(Error::Internal("stage failed".to_string())),
		Fault::Panic => panic!("stage panicked"),
	}
}

#[derive(Clone, Copy)]
struct Plan(Option<(Stage, Fault)>);

impl Plan {
	fn at(self, stage: Stage) -> Result<()> {
		match self.0 {
			Some((s, fault)) if s == stage => fail(fault),
			_ => Ok(()),
		}
	}
}

struct FaultyRouter {
	plan: Plan,
	inner: SimpleRouter,
}

#[async_trait]
impl Router for FaultyRouter {
	async fn match_request(&self, request: &Request) -> Result<Option<Route>> {
		self.plan.at(Stage::Router)?;
		self.inner.match_request(request).await
	}
}

struct Faulty {
	plan: Plan,
}

#[async_trait]
impl Controller for Faulty {
	async fn invoke(&self, _method: &str, _request: &Request, _response: &Response) -> Result<Outcome> {
		self.plan.at(Stage::Main)?;
		Ok("fine".into())
	}

	fn pre_hook(&self) -> Option<&dyn PreHook> {
		Some(self)
	}

	fn post_hook(&self) -> Option<&dyn PostHook> {
		Some(self)
	}
}

#[async_trait]
impl PreHook for Faulty {
	async fn pre(&self, _request: &Request, _response: &Response) -> Result<Option<Response>> {
		self.plan.at(Stage::Pre)?;
		Ok(None)
	}
}

#[async_trait]
impl PostHook for Faulty {
	async fn post(&self, _request: &Request, _response: &Response) -> Result<Option<Response>> {
		self.plan.at(Stage::Post)?;
		Ok(None)
	}
}

struct BrokenHandler(Fault);

#[async_trait]
impl ErrorHandler for BrokenHandler {
	async fn handle(&self, _request: &Request, _exception: &HttpException) -> Result<Response> {
		fail(self.0)?;
		Ok(Response::ok())
	}
}

struct BrokenRenderer;

impl TemplateRenderer for BrokenRenderer {
	fn render(&self, name: &str, _context: &Value) -> std::result::Result<String, TemplateError> {
		Err(TemplateError::Render {
			name: name.to_string(),
			message: "renderer unavailable".to_string(),
		})
	}

	fn has_template(&self, _name: &str) -> bool {
		true
	}
}

struct CrashingTimeline;

impl Timeline for CrashingTimeline {
	fn record(&self, _activity: Activity) -> std::result::Result<(), TimelineError> {
		panic!("timeline backend crashed")
	}
}

struct FullTimeline;

impl Timeline for FullTimeline {
	fn record(&self, _activity: Activity) -> std::result::Result<(), TimelineError> {
		Err(TimelineError::Full(0))
	}
}

fn settings(entries: Vec<(&str, Value)>) -> Settings {
	Settings::from_map(
		entries
			.into_iter()
			.map(|(k, v)| (k.to_string(), v))
			.collect::<IndexMap<_, _>>(),
	)
}

fn builder(plan: Plan) -> cadenza_dispatch::DispatcherBuilder {
	Dispatcher::builder()
		.router(FaultyRouter {
			plan,
			inner: SimpleRouter::new().route(Route::to("/", "app.faulty", "index")),
		})
		.controller("app.faulty", move |_: &ControllerContext| {
			plan.at(Stage::Factory)?;
			Ok(Box::new(Faulty { plan }) as Box<dyn Controller>)
		})
		.error_handler("app.broken", |_: &ServiceContainer| {
			Ok(Box::new(BrokenHandler(Fault::Error)) as Box<dyn ErrorHandler>)
		})
		.error_handler("app.panicking", |_: &ServiceContainer| {
			Ok(Box::new(BrokenHandler(Fault::Panic)) as Box<dyn ErrorHandler>)
		})
}

fn root() -> Request {
	Request::builder().uri("/").build().unwrap()
}

// ============================================================================
// Stage failures
// ============================================================================

/// **Category**: Happy Path
#[rstest]
#[tokio::test]
async fn test_no_fault_succeeds() {
	let dispatcher = builder(Plan(None)).build().unwrap();

	let response = dispatcher.handle(root()).await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body_text(), "fine");
}

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_stage_failure_yields_error_page(
	#[values(Stage::Router, Stage::Factory, Stage::Pre, Stage::Main, Stage::Post)] stage: Stage,
	#[values(Fault::Error, Fault::Panic)] fault: Fault,
) {
	let dispatcher = builder(Plan(Some((stage, fault)))).build().unwrap();

	let response = dispatcher.handle(root()).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{stage:?} {fault:?}");
	assert_eq!(response.reason_phrase(), "Internal Server Error");
	assert!(response.body_text().contains("Internal Server Error"));
	assert!(!response.body_text().contains("fine"));
}

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_stage_failure_detail_in_debug(
	#[values(Fault::Error, Fault::Panic)] fault: Fault,
) {
	let dispatcher = builder(Plan(Some((Stage::Main, fault))))
		.settings(settings(vec![("debug", json!(true))]))
		.build()
		.unwrap();

	let response = dispatcher.handle(root()).await;
	let body = response.body_text();

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	match fault {
		Fault::Error => assert!(body.contains("Caused by: Internal error: stage failed")),
		Fault::Panic => assert!(body.contains("Caused by: Panic: stage panicked")),
	}
}

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_factory_can_reject_with_status() {
	let dispatcher = Dispatcher::builder()
		.router(SimpleRouter::new().route(Route::to("/", "app.guarded", "index")))
		.controller("app.guarded", |_: &ControllerContext| {
			Err(HttpException::new(StatusCode::FORBIDDEN, "Members only").into())
		})
		.build()
		.unwrap();

	let response = dispatcher.handle(root()).await;

	assert_eq!(response.status, StatusCode::FORBIDDEN);
	assert_eq!(response.reason_phrase(), "Members only");
}

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_controller_error_keeps_http_status() {
	struct Gone;

	#[async_trait]
	impl Controller for Gone {
		async fn invoke(&self, _method: &str, _request: &Request, _response: &Response) -> Result<Outcome> {
			Err(HttpException::from_status(StatusCode::GONE).into())
		}
	}

	let dispatcher = Dispatcher::builder()
		.router(SimpleRouter::new().route(Route::to("/", "app.gone", "index")))
		.controller("app.gone", |_: &ControllerContext| {
			Ok(Box::new(Gone) as Box<dyn Controller>)
		})
		.build()
		.unwrap();

	let response = dispatcher.handle(root()).await;

	assert_eq!(response.status, StatusCode::GONE);
}

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_application_error_is_server_error() {
	struct Ledger;

	#[async_trait]
	impl Controller for Ledger {
		async fn invoke(&self, _method: &str, _request: &Request, _response: &Response) -> Result<Outcome> {
			let balance: i64 = "twelve"
				.parse()
				.map_err(|e| anyhow::anyhow!("ledger corrupted: {e}"))?;
			Ok(balance.to_string().into())
		}
	}

	let dispatcher = Dispatcher::builder()
		.router(SimpleRouter::new().route(Route::to("/", "app.ledger", "balance")))
		.settings(settings(vec![("debug", json!(true))]))
		.controller("app.ledger", |_: &ControllerContext| {
			Ok(Box::new(Ledger) as Box<dyn Controller>)
		})
		.build()
		.unwrap();

	let response = dispatcher.handle(root()).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(response.body_text().contains("Caused by: ledger corrupted"));
}

// ============================================================================
// Error handler failures
// ============================================================================

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_failing_error_handler_falls_back_to_default(
	#[values("app.broken", "app.panicking")] handler: &str,
	#[values(Stage::Router, Stage::Main)] stage: Stage,
) {
	let dispatcher = builder(Plan(Some((stage, Fault::Error))))
		.settings(settings(vec![("errors.default", json!(handler))]))
		.build()
		.unwrap();

	let response = dispatcher.handle(root()).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(response.body_text().contains(r#"<span class="status">500</span>"#));
	assert!(!response.body_text().contains(FALLBACK_MESSAGE));
}

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_not_found_uses_status_specific_handler() {
	let dispatcher = builder(Plan(None))
		.settings(settings(vec![
			("errors.404", json!("app.teapot")),
			("errors.default", json!("app.broken")),
		]))
		.error_handler("app.teapot", |_: &ServiceContainer| {
			struct Teapot;

			#[async_trait]
			impl ErrorHandler for Teapot {
				async fn handle(&self, request: &Request, _exception: &HttpException) -> Result<Response> {
					Ok(Response::new(StatusCode::IM_A_TEAPOT).with_body(format!("no {}", request.path())))
				}
			}

			Ok(Box::new(Teapot) as Box<dyn ErrorHandler>)
		})
		.build()
		.unwrap();

	let response = dispatcher
		.handle(Request::builder().uri("/tea").build().unwrap())
		.await;

	assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
	assert_eq!(response.body_text(), "no /tea");
}

/// **Category**: Error Path
#[rstest]
#[case(json!(false), false)]
#[case(json!(true), true)]
#[tokio::test]
async fn test_broken_renderer_serves_inline_page(#[case] debug: Value, #[case] verbose: bool) {
	let dispatcher = builder(Plan(Some((Stage::Main, Fault::Error))))
		.renderer(BrokenRenderer)
		.settings(settings(vec![("debug", debug), ("errors.default", json!("app.panicking"))]))
		.build()
		.unwrap();

	let response = dispatcher.handle(root()).await;
	let body = response.body_text();

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(body.starts_with("<html lang='en'><body><h1>Internal Server Error</h1>"));
	assert!(body.ends_with("</body></html>"));
	assert_eq!(body.contains(FALLBACK_MESSAGE), !verbose);
	assert_eq!(body.contains("Internal error: stage failed"), verbose);
}

/// **Category**: Edge Case
#[rstest]
#[tokio::test]
async fn test_broken_renderer_on_not_found_is_still_500() {
	let dispatcher = builder(Plan(None)).renderer(BrokenRenderer).build().unwrap();

	let response = dispatcher
		.handle(Request::builder().uri("/missing").build().unwrap())
		.await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(response.body_text().contains(FALLBACK_MESSAGE));
}

// ============================================================================
// Timeline failures
// ============================================================================

/// **Category**: Error Path
#[rstest]
#[tokio::test]
async fn test_panicking_timeline_does_not_escape_dispatch(
	#[values(false, true)] crashing: bool,
) {
	let timeline: Arc<dyn Timeline> = if crashing {
		Arc::new(CrashingTimeline)
	} else {
		Arc::new(FullTimeline)
	};
	let dispatcher = builder(Plan(None)).timeline(timeline).build().unwrap();

	let missing = dispatcher
		.handle(Request::builder().uri("/x").build().unwrap())
		.await;
	let found = dispatcher.handle(root()).await;

	assert_eq!(missing.status, StatusCode::NOT_FOUND);
	assert_eq!(found.status, StatusCode::OK);
	assert_eq!(found.body_text(), "fine");

	let mut out = Vec::new();
	dispatcher.print_response(&found, &mut out).unwrap();
	assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
}
