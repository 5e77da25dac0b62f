//! Output formatting: table, JSON, YAML, status document.
//!
//! Table view is a field/value list plus a topology table built with
//! `tabled`; every other format serializes the report through serde.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use gocoax_core::snapshot::{REDACTED, redact};
use gocoax_core::{AdapterStatus, Counters, LinkStatus, MacAddress, StatusReport};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Options shared by every report rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderOpts {
    pub format: OutputFormat,
    pub redact: bool,
    pub color: bool,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one poll result in the chosen format.
pub fn render_report(report: &StatusReport, opts: RenderOpts) -> Result<String, CliError> {
    match opts.format {
        OutputFormat::Table => Ok(render_status_table(report, opts)),
        OutputFormat::Json => render_json(&report_value(report, opts.redact)?, false),
        OutputFormat::JsonCompact => render_json(&report_value(report, opts.redact)?, true),
        OutputFormat::Yaml => render_yaml(&report_value(report, opts.redact)?),
        OutputFormat::Document => {
            let mut value = to_value(&report.document())?;
            if opts.redact {
                redact(&mut value);
            }
            render_json(&value, false)
        }
    }
}

/// The report as a JSON value, MACs blanked when asked.
pub fn report_value(report: &StatusReport, redacted: bool) -> Result<Value, CliError> {
    if redacted {
        Ok(report.redacted())
    } else {
        to_value(report)
    }
}

/// Render any serializable value; `Table` falls back to `detail`.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    detail: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(detail(data)),
        OutputFormat::Json | OutputFormat::Document => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
    let _ = stdout.flush();
}

// ── Format-specific renderers ────────────────────────────────────────

fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value, CliError> {
    serde_json::to_value(data).map_err(|e| CliError::Render(e.to_string()))
}

pub(crate) fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

// ── Table view ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct PeerRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "MoCA")]
    moca: String,
    #[tabled(rename = "TX Mbps")]
    tx: String,
    #[tabled(rename = "RX Mbps")]
    rx: String,
}

const ABSENT: &str = "-";

fn or_absent<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| ABSENT.to_owned(), |v| v.to_string())
}

fn show_mac(mac: Option<MacAddress>, redacted: bool) -> String {
    match mac {
        Some(_) if redacted => REDACTED.to_owned(),
        other => or_absent(other),
    }
}

fn show_counters(counters: Option<Counters>) -> String {
    or_absent(counters.map(|c| format!("{} ok / {} bad / {} dropped", c.ok, c.bad, c.dropped)))
}

fn show_link(link: Option<LinkStatus>, color: bool) -> String {
    match link {
        Some(LinkStatus::Up) if color => "up".green().to_string(),
        Some(LinkStatus::Down) if color => "down".red().to_string(),
        other => or_absent(other),
    }
}

fn show_model(status: &AdapterStatus) -> String {
    match (status.model_name(), status.known_model()) {
        (_, Some(known)) => format!(
            "{} ({}, MoCA {}, {} Ethernet)",
            known.name, known.manufacturer, known.moca_version, known.ethernet
        ),
        (Some(name), None) => name.to_owned(),
        (None, None) => ABSENT.to_owned(),
    }
}

fn show_frequency(status: &AdapterStatus) -> String {
    match (status.lowest_operating_frequency_mhz(), status.frequency_band()) {
        (Some(mhz), Some(band)) => format!("{mhz} MHz ({band})"),
        (Some(mhz), None) => format!("{mhz} MHz"),
        (None, _) => ABSENT.to_owned(),
    }
}

fn field_rows(status: &AdapterStatus, opts: RenderOpts) -> Vec<FieldRow> {
    let nc = status.network_controller_node().map(|node| {
        if status.is_network_controller() == Some(true) {
            format!("{node} (this adapter)")
        } else {
            node.to_string()
        }
    });
    let counters = status.packet_counters().unwrap_or_default();

    vec![
        FieldRow { field: "MAC", value: show_mac(status.mac(), opts.redact) },
        FieldRow { field: "IP", value: or_absent(status.ip()) },
        FieldRow { field: "Model", value: show_model(status) },
        FieldRow { field: "Firmware", value: or_absent(status.firmware_version()) },
        FieldRow { field: "MoCA version", value: or_absent(status.moca_version()) },
        FieldRow { field: "Link", value: show_link(status.link_status(), opts.color) },
        FieldRow { field: "Node ID", value: or_absent(status.node_id()) },
        FieldRow { field: "NC node", value: or_absent(nc) },
        FieldRow { field: "Encryption", value: or_absent(status.encryption_enabled().map(|on| if on { "on" } else { "off" })) },
        FieldRow { field: "Peers", value: or_absent(status.peer_count()) },
        FieldRow { field: "Frequency", value: show_frequency(status) },
        FieldRow { field: "Channels", value: or_absent(status.channel_count()) },
        FieldRow { field: "TX packets", value: show_counters(counters.tx) },
        FieldRow { field: "RX packets", value: show_counters(counters.rx) },
    ]
}

fn peer_rows(status: &AdapterStatus, redacted: bool) -> Vec<PeerRow> {
    let network = status.network();
    let rates = status.phy_rates();
    let nodes: BTreeSet<_> = network
        .into_iter()
        .flat_map(|n| n.keys())
        .chain(rates.into_iter().flat_map(|r| r.keys()))
        .copied()
        .collect();

    nodes
        .into_iter()
        .map(|node| {
            let peer = network.and_then(|n| n.get(&node));
            let rate = rates.and_then(|r| r.get(&node));
            PeerRow {
                node: node.to_string(),
                mac: show_mac(peer.map(|p| p.mac), redacted),
                moca: or_absent(peer.and_then(|p| p.moca_version)),
                tx: or_absent(rate.map(|r| format!("{:.1}", r.tx_mbps))),
                rx: or_absent(rate.map(|r| format!("{:.1}", r.rx_mbps))),
            }
        })
        .collect()
}

fn render_status_table(report: &StatusReport, opts: RenderOpts) -> String {
    let mut out = Table::new(field_rows(&report.status, opts))
        .with(Style::rounded())
        .to_string();

    let peers = peer_rows(&report.status, opts.redact);
    if !peers.is_empty() {
        out.push_str("\n\n");
        out.push_str(&Table::new(peers).with(Style::rounded()).to_string());
    }

    if report.is_partial() {
        let heading = format!("Partial result: {} endpoint(s) failed", report.errors.len());
        out.push_str("\n\n");
        if opts.color {
            out.push_str(&heading.yellow().to_string());
        } else {
            out.push_str(&heading);
        }
        for err in &report.errors {
            out.push_str(&format!("\n  {err}"));
        }
    }
    if !report.warnings.is_empty() {
        out.push_str("\n\nWarnings:");
        for warning in &report.warnings {
            out.push_str(&format!("\n  {warning}"));
        }
    }
    out
}
