//! `gocoax status`: one poll, rendered.

use gocoax_core::AdapterClient;

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output::{self, RenderOpts};

pub async fn handle(
    client: &AdapterClient,
    args: &StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = client.poll().await?;
    if report.is_partial() {
        tracing::warn!(
            failed = report.errors.len(),
            "some endpoints failed, showing partial status"
        );
    }

    let rendered = output::render_report(
        &report,
        RenderOpts {
            format: global.output,
            redact: args.redact,
            color: output::should_color(global.color),
        },
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
