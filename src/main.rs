use std::io;

use anyhow::Context;
use appointment_desk::{logging, Desk, Shell, StoragePaths};

fn main() -> anyhow::Result<()> {
    logging::init();

    let paths = StoragePaths::resolve().context("failed to prepare the storage directory")?;
    tracing::info!(root = %paths.root().display(), "storage resolved");
    let desk = Desk::open(paths);

    let stdin = io::stdin();
    let mut shell = Shell::new(desk, stdin.lock(), io::stdout());
    shell.run().context("terminal input/output failed")?;
    Ok(())
}
