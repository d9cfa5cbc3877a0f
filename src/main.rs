//! Host-side helper: `cargo run` builds the wasm bundle into `static/pkg`
//! and serves `static/` locally.

use std::io;
use std::process::{Command, ExitCode, Stdio};

const PORT: &str = "8000";

fn wasm_pack() -> io::Result<bool> {
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()?;
    Ok(status.success())
}

fn serve() -> io::Result<()> {
    println!("Serving static/ at http://127.0.0.1:{PORT} (Ctrl-C to stop)");
    let mut server = Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()?;
    server.wait()?;
    Ok(())
}

fn main() -> ExitCode {
    println!("Building wasm pkg …");
    match wasm_pack() {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("wasm-pack finished with errors");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("wasm-pack not runnable ({e}); serving whatever is already in static/pkg");
        }
    }

    if let Err(e) = serve() {
        eprintln!("could not start http server: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
