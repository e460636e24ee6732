use std::process::ExitCode;

fn main() -> ExitCode {
    shell_host::run()
}
