mod config;
mod handlers;
mod services;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use jobradar_db::repositories::record_repo::SalaryRecordRepository;
use jobradar_db::repositories::report_repo::SalaryReportRepository;
use services::aggregation_service::AggregationService;
use services::estimate_cache::{ESTIMATE_TTL, EstimateCache};
use services::estimation_api::EstimationApiService;
use services::estimator::Estimator;
use services::report_service::ReportService;
use services::scrape_service::ScrapeService;
use services::survey_service::SurveyService;

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: Arc<Config>,
    pub records: Arc<SalaryRecordRepository>,
    pub reports: Arc<SalaryReportRepository>,

    pub survey_service: Arc<SurveyService>,
    pub estimation_api: Arc<EstimationApiService>,
    pub report_service: Arc<ReportService>,
    pub estimator: Arc<Estimator>,
    pub estimate_cache: Arc<EstimateCache>,
}

#[derive(Parser)]
#[command(name = "jobradar")]
#[command(about = "Jobradar job board control plane", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve,
    /// Administrative tools
    Admin {
        #[command(subcommand)]
        subcommand: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Write the static salary survey into the record store
    PopulateSurvey,
    /// Recompute aggregated records from approved reports
    Aggregate,
    /// Show the moderation queue size
    PendingReports,
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        println!("Warning: failed to load .env file: {}", e);
    }

    let cli = Cli::parse();

    let file_appender = tracing_appender::rolling::never(".", "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "jobradar_panel=debug,jobradar_db=info,axum=info,tower_http=info,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    let config = Config::from_env()?;
    let pool = jobradar_db::connect(&config.database_url).await?;
    tracing::info!("Database initialized");

    match cli.command {
        Commands::Serve => run_server(pool, config).await?,
        Commands::Admin { subcommand } => {
            let records = SalaryRecordRepository::new(pool.clone());
            let reports = SalaryReportRepository::new(pool.clone());
            match subcommand {
                AdminCommands::PopulateSurvey => {
                    let written = SurveyService::new(records).populate().await?;
                    println!("Wrote {} survey records", written);
                }
                AdminCommands::Aggregate => {
                    let written = AggregationService::new(reports, records)
                        .aggregate_approved_reports()
                        .await?;
                    println!("Wrote {} aggregated records", written);
                }
                AdminCommands::PendingReports => {
                    let count = reports.pending_count().await?;
                    println!("{} reports awaiting moderation", count);
                }
            }
        }
    }

    Ok(())
}

async fn run_server(pool: sqlx::PgPool, config: Config) -> Result<()> {
    let config = Arc::new(config);

    let records = Arc::new(SalaryRecordRepository::new(pool.clone()));
    let reports = Arc::new(SalaryReportRepository::new(pool.clone()));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let survey_service = Arc::new(SurveyService::new((*records).clone()));
    let scrape_service = Arc::new(ScrapeService::new(http.clone(), (*records).clone()));
    let estimation_api = Arc::new(EstimationApiService::new(
        http,
        (*records).clone(),
        scrape_service,
        config.estimation_api_url.clone(),
        config.estimation_api_key.clone(),
    ));
    let aggregation_service = Arc::new(AggregationService::new(
        (*reports).clone(),
        (*records).clone(),
    ));
    let report_service = Arc::new(ReportService::new(
        (*reports).clone(),
        aggregation_service,
        config.report_ip_salt.clone(),
    ));
    let estimator = Arc::new(Estimator::new((*records).clone()));
    let estimate_cache = Arc::new(EstimateCache::new(ESTIMATE_TTL));

    let state = AppState {
        pool,
        config: config.clone(),
        records,
        reports,
        survey_service: survey_service.clone(),
        estimation_api,
        report_service,
        estimator,
        estimate_cache,
    };

    if state.config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY not set; admin endpoints are disabled");
    }

    // First-boot seeding runs in the background so an empty store still has
    // survey data shortly after startup.
    tokio::spawn(async move {
        if let Err(e) = survey_service.populate_if_empty().await {
            tracing::error!("Survey seed failed: {:#}", e);
        }
    });

    let admin_routes = axum::Router::new()
        .route("/populate-survey", post(handlers::admin::populate_survey))
        .route("/fetch-external", post(handlers::admin::fetch_external))
        .route("/reports/pending", get(handlers::admin::pending_reports))
        .route("/reports/{id}/moderate", post(handlers::admin::moderate_report))
        .route("/stats", get(handlers::admin::stats))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::admin::require_admin_key,
        ));

    let app = axum::Router::new()
        .route("/healthz", get(healthz))
        .route("/api/salary/company/{company}", get(handlers::salary::company_records))
        .route("/api/salary/lookup", get(handlers::salary::lookup))
        .route("/api/salary/estimate", post(handlers::salary::estimate))
        .route("/api/salary/estimate/batch", post(handlers::salary::estimate_batch))
        .route("/api/salary/report", post(handlers::salary::submit_report))
        .nest("/api/admin/salary", admin_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
