mod auth;
mod backend;
mod config;
mod context;
mod error;
mod notification;
mod permission;
mod property;
mod registry;
mod rpc;
mod session;
mod task;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use auth::AcceptAllAuthProvider;
use backend::NullBackendModule;
use config::Config;
use context::Context;
use notification::{NotificationEmitter, NotificationSink, RecordingEmitter};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn build_notification_sink(runtime: &tokio::runtime::Runtime) -> Box<dyn NotificationSink> {
    match runtime.block_on(NotificationEmitter::connect()) {
        Ok(emitter) => Box::new(notification::DbusNotificationSink::new(emitter, runtime.handle().clone())),
        Err(err) => {
            error!(%err, "failed to connect to DBus session bus, notifications will be dropped");
            Box::new(RecordingEmitter::new())
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args);
    info!(?config, "starting ogon-sessionmanager");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let notifications = build_notification_sink(&runtime);
    let ctx = Context::init(
        &config,
        notifications,
        Box::new(AcceptAllAuthProvider),
        Box::new(NullBackendModule),
    )?;

    let icp_ctx = ctx.clone();
    let icp_config = config.clone();
    std::thread::Builder::new()
        .name("smgr-icp-listener".into())
        .spawn(move || {
            if let Err(err) = rpc::icp::listener::run(icp_ctx, icp_config) {
                error!(%err, "ICP listener stopped");
            }
        })
        .expect("failed to spawn ICP listener thread");

    runtime.block_on(rpc::admin::server::run(ctx.clone(), config.clone()))?;

    ctx.shutdown();
    Ok(())
}
