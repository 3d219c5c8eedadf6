use anyhow::Context as _;
use clap::Parser;
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use stackrouter::config::RouterOptions;
use stackrouter::ids::RequestId;
use stackrouter::{handler, param_handler, Context, Dispatcher, Router};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Dispatch sample requests through a nested demo router
#[derive(Parser)]
#[command(name = "stackrouter", version)]
#[command(about = "Run requests through the stackrouter demo routers", long_about = None)]
struct Cli {
    /// Request to dispatch as "METHOD /path" (repeatable)
    #[arg(
        short,
        long = "request",
        value_parser = parse_request,
        default_values = [
            "GET /api/user/list",
            "GET /api/user/lists",
            "GET /api/user/42/info",
            "POST /api/user/list",
            "GET /elsewhere",
        ]
    )]
    requests: Vec<(Method, String)>,

    /// YAML file with options for the api router
    #[arg(short, long, env = "STACKROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Coroutine stack size in bytes
    #[arg(long, default_value_t = 0x8000)]
    stack_size: usize,
}

fn parse_request(raw: &str) -> Result<(Method, String), String> {
    let (method, path) = raw
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("expected \"METHOD /path\", got {raw:?}"))?;
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid method {method:?}: {e}"))?;
    Ok((method, path.trim().to_string()))
}

/// One line of output per dispatched request
#[derive(Serialize)]
struct Outcome {
    request_id: RequestId,
    method: String,
    path: String,
    routed: bool,
    status: u16,
    body: Option<Value>,
}

#[derive(Clone, Debug)]
struct UserId(String);

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// The api router with its mounted user router
fn build_api(options: &RouterOptions) -> anyhow::Result<Router> {
    let mut api = Router::with_options(options);
    api.use_middleware([handler(|ctx, next| {
        info!(request_id = %ctx.request_id, "common use api");
        next.run(ctx)
    })])?;
    api.param(
        "id",
        param_handler(|id, ctx, next| {
            ctx.extensions.insert(UserId(id.to_string()));
            next.run(ctx)
        }),
    );

    let mut user = Router::new();
    user.prefix("/user/")?;
    user.get(
        ["/list", "/lists"],
        [
            handler(|ctx, next| {
                info!(request_id = %ctx.request_id, "pre user list");
                next.run(ctx)
            }),
            handler(|ctx, _next| {
                ctx.json(json!([]));
                Ok(())
            }),
        ],
    )?;
    user.get(
        "/:id/info",
        [handler(|ctx, _next| {
            let id = ctx.extensions.get::<UserId>().map(|u| u.0.clone());
            info!(request_id = %ctx.request_id, user_id = ?id, "query user");
            ctx.json(json!(id));
            Ok(())
        })],
    )?;

    api.use_middleware([user.routes()])?;
    Ok(api)
}

fn dispatch(dispatcher: &Dispatcher, method: Method, path: String) -> anyhow::Result<Outcome> {
    let routed = dispatcher
        .router()
        .match_route(&path, &method.as_str().to_ascii_lowercase())
        .routed;
    let mut ctx = Context::new(method, path);
    dispatcher.handle(&mut ctx)?;
    Ok(Outcome {
        request_id: ctx.request_id,
        method: ctx.method.to_string(),
        path: ctx.path,
        routed,
        status: ctx.status,
        body: ctx.body,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);
    may::config().set_stack_size(cli.stack_size);

    let options = match &cli.config {
        Some(path) => RouterOptions::from_yaml_file(path)?,
        None => RouterOptions::with_prefix("/api"),
    }
    .merge_env();

    let dispatcher = build_api(&options)?.routes();
    info!(?dispatcher, requests = cli.requests.len(), "Dispatching requests");

    let handles: Vec<_> = cli
        .requests
        .into_iter()
        .map(|(method, path)| {
            let dispatcher = dispatcher.clone();
            may::go!(move || dispatch(&dispatcher, method, path))
        })
        .collect();

    for handle in handles {
        let outcome = handle
            .join()
            .map_err(|_| anyhow::anyhow!("dispatch coroutine panicked"))??;
        println!(
            "{}",
            serde_json::to_string(&outcome).context("failed to encode outcome")?
        );
    }
    Ok(())
}
