// ==========================================
// SIGLAB Aviário - 命令行主入口
// ==========================================
// 输出: 成功结果写 stdout，错误以 JSON 写 stderr
// ==========================================

use std::process::ExitCode;

use siglab_aviario::api::ErrorResponse;
use siglab_aviario::app::{dispatch, get_default_db_path, wants_help, AppState, CliArgs, USAGE};
use siglab_aviario::logging;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args = CliArgs::parse(std::env::args().skip(1));
    if wants_help(&args) {
        println!("{} {}\n\n{}", siglab_aviario::APP_NAME, siglab_aviario::VERSION, USAGE);
        return ExitCode::SUCCESS;
    }

    let db_path = args
        .option("db")
        .map(str::to_string)
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(message) => {
            print_error(&ErrorResponse {
                code: "DATABASE_CONNECTION_ERROR".to_string(),
                message,
            });
            return ExitCode::from(2);
        }
    };

    match dispatch(&state, &args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err.to_response());
            ExitCode::FAILURE
        }
    }
}

fn print_error(response: &ErrorResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}: {}", response.code, response.message),
    }
}
