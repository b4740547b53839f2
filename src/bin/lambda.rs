//! Serverless entry point.
//!
//! Runs the same router as the server binary behind API Gateway / Lambda
//! function URLs. Configuration is loaded at cold start; a missing required
//! value fails the init phase instead of individual invocations.

use fillout_attio_relay::{app, config::Config, obs};
use lambda_http::{run, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    obs::init_tracing();

    let config = Config::from_env().map_err(|e| Error::from(e.to_string()))?;
    let state = app::build_state(config).map_err(|e| Error::from(e.to_string()))?;

    tracing::info!("Starting Fillout → Attio relay on Lambda");
    run(app::build_router(state)).await
}
