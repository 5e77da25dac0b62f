//! `gocoax check`: single-request reachability and credential test.

use serde::Serialize;

use gocoax_core::{AdapterClient, MacAddress};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct CheckResult<'a> {
    host: &'a str,
    mac: MacAddress,
    authenticated: bool,
}

pub async fn handle(client: &AdapterClient, global: &GlobalOpts) -> Result<(), CliError> {
    let mac = client.probe().await?;
    let result = CheckResult {
        host: client.host(),
        mac,
        authenticated: true,
    };

    let rendered = output::render_single(global.output, &result, |r| {
        format!("{}: adapter {} reachable, credentials accepted", r.host, r.mac)
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
