//! taskforge CLI binary
//!
//! Minimal entrypoint: all logic is in the library; main.rs only maps
//! cli::run() to a process exit.

fn main() {
    if let Err(code) = taskforge::cli::run() {
        std::process::exit(code.as_i32());
    }
}
