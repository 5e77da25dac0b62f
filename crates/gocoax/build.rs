use std::fs;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{Shell, generate_to};

// cli.rs depends on clap and clap_complete only, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        panic!("OUT_DIR not set by Cargo");
    };
    let out_dir = Path::new(&out_dir);

    let man_dir = out_dir.join("man");
    let completion_dir = out_dir.join("completions");
    for dir in [&man_dir, &completion_dir] {
        fs::create_dir_all(dir)
            .unwrap_or_else(|e| panic!("failed to create {}: {e}", dir.display()));
    }

    let mut cmd = cli::Cli::command();
    write_manpages(&cmd, "gocoax", &man_dir);
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        generate_to(shell, &mut cmd, "gocoax", &completion_dir)
            .unwrap_or_else(|e| panic!("failed to write {shell} completions: {e}"));
    }
}

/// One page for the binary and one per visible subcommand, `gocoax-<sub>.1`.
fn write_manpages(cmd: &clap::Command, page: &str, dir: &Path) {
    let mut roff = Vec::new();
    clap_mangen::Man::new(cmd.clone().name(page.to_owned()))
        .render(&mut roff)
        .unwrap_or_else(|e| panic!("failed to render {page}.1: {e}"));
    let path = dir.join(format!("{page}.1"));
    fs::write(&path, roff).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        write_manpages(sub, &format!("{page}-{}", sub.get_name()), dir);
    }
}
