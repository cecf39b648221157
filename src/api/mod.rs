use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CalculationParams, CalculationResult, DEFAULT_INFLATION_RATE, DEFAULT_TAX_RATE, Mode,
    RealTerms, format_currency, format_number_with_units, format_years_fraction,
    parse_formatted_value, project,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMode {
    Sip,
    Swp,
}

impl From<CliMode> for Mode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Sip => Mode::Sip,
            CliMode::Swp => Mode::Swp,
        }
    }
}

impl From<Mode> for CliMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Sip => CliMode::Sip,
            Mode::Swp => CliMode::Swp,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Json,
    Report,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    mode: Option<Mode>,
    initial_investment: Option<f64>,
    monthly_amount: Option<f64>,
    expected_return_rate: Option<f64>,
    yearly_change_percentage: Option<f64>,
    years_to_project: Option<u32>,
    real_mode: Option<bool>,
    inflation_rate: Option<f64>,
    tax_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DefaultsQuery {
    mode: Option<Mode>,
}

#[derive(Parser, Debug)]
#[command(
    name = "finflow",
    about = "SIP/SWP projection with crore milestones and optional real-value restatement",
    after_help = "Run `finflow serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(long, value_enum, default_value_t = CliMode::Sip)]
    mode: CliMode,
    #[arg(
        long,
        value_parser = parse_amount,
        help = "Starting lump sum, e.g. 10,00,000; defaults depend on --mode"
    )]
    initial: Option<f64>,
    #[arg(
        long,
        value_parser = parse_amount,
        help = "Monthly contribution (sip) or withdrawal (swp); defaults depend on --mode"
    )]
    monthly: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Expected annual return in percent, compounded monthly"
    )]
    return_rate: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Yearly step-up of the monthly amount in percent"
    )]
    yearly_change: Option<f64>,
    #[arg(long, help = "Projection horizon in whole years (max 50)")]
    years: Option<u32>,
    #[arg(long, help = "Restate figures in present-value, after-tax terms")]
    real: bool,
    #[arg(
        long,
        default_value_t = DEFAULT_INFLATION_RATE,
        help = "Annual inflation rate in percent, used with --real"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_TAX_RATE,
        help = "Flat tax rate in percent, used with --real"
    )]
    tax_rate: f64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    parse_formatted_value(raw).ok_or_else(|| format!("'{raw}' is not an amount"))
}

#[derive(Debug)]
struct ProjectRequest {
    params: CalculationParams,
    real: Option<RealTerms>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    mode: Mode,
    real_mode: bool,
    real_terms: Option<RealTerms>,
    params: CalculationParams,
    result: CalculationResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: &Cli) -> ProjectRequest {
    let mode = Mode::from(cli.mode);
    let defaults = CalculationParams::defaults_for(mode);
    let params = CalculationParams {
        initial_investment: cli.initial.unwrap_or(defaults.initial_investment),
        monthly_amount: cli.monthly.unwrap_or(defaults.monthly_amount),
        expected_return_rate: cli.return_rate.unwrap_or(defaults.expected_return_rate),
        yearly_change_percentage: cli
            .yearly_change
            .unwrap_or(defaults.yearly_change_percentage),
        years_to_project: cli.years.unwrap_or(defaults.years_to_project),
        mode,
    };

    let real = cli.real.then_some(RealTerms {
        inflation_rate: cli.inflation_rate,
        tax_rate: cli.tax_rate,
    });

    ProjectRequest { params, real }
}

fn execute(request: &ProjectRequest) -> Result<ProjectResponse, String> {
    let result = project(&request.params, request.real).map_err(|e| e.to_string())?;
    Ok(ProjectResponse {
        mode: request.params.mode,
        real_mode: request.real.is_some(),
        real_terms: request.real,
        params: request.params,
        result,
    })
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let request = build_request(&cli);
    let response = execute(&request)?;

    match cli.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| format!("Failed to serialize projection: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Report => print!("{}", render_report(&response)),
    }
    Ok(())
}

fn render_report(response: &ProjectResponse) -> String {
    let params = &response.params;
    let result = &response.result;
    let mode_label = match response.mode {
        Mode::Sip => "SIP",
        Mode::Swp => "SWP",
    };
    let basis = match response.real_terms {
        Some(terms) => format!(
            "today's money, {}% inflation, {}% tax",
            terms.inflation_rate, terms.tax_rate
        ),
        None => "nominal".to_string(),
    };

    let mut lines = vec![
        format!(
            "{mode_label} projection over {} years ({basis})",
            params.years_to_project
        ),
        format!(
            "Initial {}  monthly {}  return {}%  yearly change {}%",
            format_currency(params.initial_investment),
            format_currency(params.monthly_amount),
            params.expected_return_rate,
            params.yearly_change_percentage
        ),
        String::new(),
        "Year  Value".to_string(),
    ];
    lines.extend(result.chart_data.iter().map(|point| {
        format!(
            "{:>4}  {} ({})",
            point.year,
            format_currency(point.value),
            format_number_with_units(point.value)
        )
    }));
    if result.chart_data.len() < params.years_to_project as usize {
        lines.push(format!(
            "Balance exhausted after {} year(s)",
            result.chart_data.len()
        ));
    }

    lines.push(String::new());
    lines.push("Breakdown".to_string());
    lines.extend(
        result
            .breakdown
            .iter()
            .map(|slice| format!("  {:<10} {}", slice.label, format_currency(slice.value))),
    );

    if !result.milestones.is_empty() {
        lines.push(String::new());
        lines.push("Milestones".to_string());
        lines.extend(result.milestones.iter().map(|milestone| {
            format!(
                "  {:>3} Cr  after {} (+{})",
                milestone.unit_count,
                format_years_fraction(milestone.cumulative_years),
                format_years_fraction(milestone.years_since_previous)
            )
        }));
    }

    lines.push(String::new());
    lines.join("\n")
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("FinFlow HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler(query: Result<Query<DefaultsQuery>, QueryRejection>) -> Response {
    match query {
        Ok(Query(query)) => {
            let mode = query.mode.unwrap_or(Mode::Sip);
            json_response(StatusCode::OK, CalculationParams::defaults_for(mode))
        }
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn project_get_handler(query: Result<Query<ProjectPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn project_post_handler(body: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

fn rejected_payload(msg: &str) -> Response {
    warn!("malformed request: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = api_request_from_payload(payload);
    match execute(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!("rejected projection request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ProjectRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload))
}

fn api_request_from_payload(payload: ProjectPayload) -> ProjectRequest {
    let mut cli = default_cli_for_api(payload.mode.unwrap_or(Mode::Sip));

    if let Some(v) = payload.initial_investment {
        cli.initial = Some(v);
    }
    if let Some(v) = payload.monthly_amount {
        cli.monthly = Some(v);
    }
    if let Some(v) = payload.expected_return_rate {
        cli.return_rate = Some(v);
    }
    if let Some(v) = payload.yearly_change_percentage {
        cli.yearly_change = Some(v);
    }
    if let Some(v) = payload.years_to_project {
        cli.years = Some(v);
    }
    if let Some(v) = payload.real_mode {
        cli.real = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.tax_rate {
        cli.tax_rate = v;
    }

    build_request(&cli)
}

fn default_cli_for_api(mode: Mode) -> Cli {
    Cli {
        mode: mode.into(),
        initial: None,
        monthly: None,
        return_rate: None,
        yearly_change: None,
        years: None,
        real: false,
        inflation_rate: DEFAULT_INFLATION_RATE,
        tax_rate: DEFAULT_TAX_RATE,
        output: OutputFormat::Json,
    }
}
