use harbor_ops::cli::{Args, Runner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse_args().from_env();
    let runner = Runner::new(args);

    match runner.run().await {
        Ok(code) => code,
        Err(e) => {
            runner.output().error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
