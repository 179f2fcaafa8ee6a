//! finroll-report - Render financial reports from a balance snapshot.

fn main() -> std::process::ExitCode {
    finroll::cmd::report_cmd::main()
}
