use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use credit_sim_core::amortization::product::ProductParameters;
use credit_sim_core::amortization::rates::select_guarantee_tier;
use credit_sim_core::amortization::schedule::{self, QuoteRequest, ScheduleRequest};
use credit_sim_core::Money;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Product parameters from an optional JSON override; defaults otherwise.
fn product_parameters(params_json: Option<String>) -> NapiResult<ProductParameters> {
    let params = match params_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => ProductParameters::default(),
    };
    params.validate().map_err(to_napi_error)?;
    Ok(params)
}

#[derive(Deserialize)]
struct RateSelectionInput {
    principal: Money,
    #[serde(default)]
    product_type: Option<String>,
    #[serde(default)]
    person_type: Option<String>,
}

#[napi]
pub fn simulate_schedule(input_json: String, params_json: Option<String>) -> NapiResult<String> {
    let params = product_parameters(params_json)?;
    let input: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::simulate(&input, &params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_monthly_payment(
    input_json: String,
    params_json: Option<String>,
) -> NapiResult<String> {
    let params = product_parameters(params_json)?;
    let input: QuoteRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::quote_payment(&input, &params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn select_guarantee_rate(
    input_json: String,
    params_json: Option<String>,
) -> NapiResult<String> {
    let params = product_parameters(params_json)?;
    let input: RateSelectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tier = select_guarantee_tier(
        input.principal,
        input.product_type.as_deref(),
        input.person_type.as_deref(),
        &params,
    );
    let output = serde_json::json!({
        "guarantee_tier": tier,
        "guarantee_rate": tier.rate(&params),
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}
