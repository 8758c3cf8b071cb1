use std::process::ExitCode;

fn main() -> ExitCode {
  plan_dash_lib::run()
}
