//! finroll-check - Check a balance snapshot for data-quality problems.

fn main() -> std::process::ExitCode {
    finroll::cmd::check_cmd::main()
}
