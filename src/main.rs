use std::fmt::{Debug, Display};

use hbnb_web::core::{get_subscriber, init_subscriber, AppConfig};
use hbnb_web::hbnb_web_server::HbnbWebServer;
use tokio::task::JoinError;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use colored::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let file_appender = tracing_appender::rolling::daily("/var/tmp/log/hbnb_web", "app");

    let subscriber = get_subscriber(
        "hbnb_web".into(),
        "info".into(),
        std::io::stdout.and(file_appender),
    );
    init_subscriber(subscriber);

    let config = AppConfig::new()?;

    let hbnb_web_server = HbnbWebServer::build(config.clone()).await?;
    let port = hbnb_web_server.port();

    let server_task = tokio::spawn(hbnb_web_server.run_until_stopped());

    println!("{}", "-----------------------------------------".green());
    println!("🚀 Server started on Addr: {}:{}", config.server.host, port);
    println!("{}", "-----------------------------------------".green());

    tokio::select! {
        o = server_task => {report_exit("HBNB web server", o);}
    }
    Ok(())
}

fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name)
        }
        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} failed",
                task_name
            )
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{}' task failed to complete",
                task_name
            )
        }
    }
}
