#[macro_use]
extern crate tracing;

mod api;
mod command;
mod config;
mod proxy;
mod store;
mod task;
mod utils;
mod view;
mod workflow;
mod youtube;

use std::process::exit;

use tokio_util::sync::CancellationToken;

use crate::config::{ARGS, load_config};
use crate::utils::init_logger;
use crate::utils::signal::cancel_on_terminate;

#[tokio::main]
async fn main() {
    init_logger(&ARGS.log_level);
    let config = match load_config(&ARGS) {
        Ok(config) => config,
        Err(e) => {
            error!("加载配置失败：{:#}", e);
            exit(1);
        }
    };
    let token = CancellationToken::new();
    cancel_on_terminate(token.clone());
    if let Err(e) = command::run(&ARGS.command, &config, token).await {
        error!("{:#}", e);
        exit(1);
    }
}
