//! Binary entrypoint that launches the capture gateway.

use std::process::ExitCode;

use crucial_gateway::start_gateway;

/// Load configuration and serve until Ctrl-C.
fn main() -> ExitCode {
    start_gateway::run()
}
