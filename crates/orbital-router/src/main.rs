//! orbital-router CLI
//!
//! Inspect a JSON route manifest and dry-run requests against it.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use orbital_router::{
    create_uri, Argument, DispatchError, HandlerError, Invoker, Method, Request,
    RequestDispatcher, Response, RouteManifest,
};

/// Rule-based request routing, from the command line.
#[derive(Parser)]
#[command(name = "orbital-router")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route manifest (JSON).
    #[arg(short, long, env = "ORBITAL_ROUTES", default_value = "routes.json")]
    manifest: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes in lookup order.
    Routes,

    /// Dispatch a request against the manifest and show the outcome.
    Resolve {
        /// Request method.
        method: String,

        /// Request target, e.g. `/users/42?tab=posts`.
        target: String,

        /// Script path reported by the server.
        #[arg(long, default_value = "/index.php")]
        script: String,

        /// Make the named handler fail (repeatable).
        #[arg(long = "fail")]
        failing: Vec<String>,
    },

    /// Turn text into a URL slug.
    Slug {
        /// Text to slugify.
        text: String,
    },

    /// Build an application URL from the manifest's base URL.
    Url {
        /// Location below the base URL.
        #[arg(default_value = "")]
        location: String,

        /// Query string to append.
        #[arg(short, long)]
        query: Option<String>,

        /// Insert the route prefix after the base URL.
        #[arg(long)]
        with_prefix: bool,
    },
}

/// Stands in for real handlers: reports the call, or fails on request.
struct DryRunInvoker {
    failing: HashSet<String>,
}

impl Invoker<String> for DryRunInvoker {
    type Output = String;

    fn invoke(&mut self, handler: &String, args: &[Argument]) -> Result<String, HandlerError> {
        if self.failing.contains(handler) {
            return Err(HandlerError::msg(format!("{handler} failed")));
        }

        let args: Vec<String> = args
            .iter()
            .map(|arg| match arg {
                Argument::Segment(s) => format!("{s:?}"),
                Argument::Failure(Some(e)) => format!("<error: {e}>"),
                Argument::Failure(None) => "<none>".to_string(),
            })
            .collect();
        Ok(format!("{handler}({})", args.join(", ")))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Slug { text } => {
            println!("{}", create_uri(&text));
        }

        Commands::Url {
            location,
            query,
            with_prefix,
        } => {
            let manifest = RouteManifest::from_path(&cli.manifest)?;
            let urls = manifest.config.url_builder();
            println!("{}", urls.url(&location, query.as_deref(), !with_prefix));
        }

        Commands::Routes => {
            let manifest = RouteManifest::from_path(&cli.manifest)?;
            let table = manifest.build()?;

            if table.is_empty() {
                info!("No routes registered.");
            }

            for method in Method::ALL {
                for route in table.routes(method) {
                    let mut line = format!(
                        "{:<10} {:<40} -> {}",
                        method.as_str(),
                        route.rule(),
                        route.handler
                    );
                    if let Some(content_type) = &route.options.content_type {
                        line.push_str(&format!(" [{content_type}]"));
                    }
                    if let Some(status) = route.options.status {
                        line.push_str(&format!(" [{status}]"));
                    }
                    println!("{line}");
                }
            }

            for (code, handler) in table.error_routes().iter() {
                println!("{:<10} {:<40} -> {}", "ERROR", code, handler);
            }
        }

        Commands::Resolve {
            method,
            target,
            script,
            failing,
        } => {
            let manifest = RouteManifest::from_path(&cli.manifest)?;
            let table = manifest.build()?;

            let request = Request::new(method, target).script(script);
            let mut dispatcher = RequestDispatcher::new(&table, request)
                .script_name(manifest.config.script_name.clone());
            let mut invoker = DryRunInvoker {
                failing: failing.into_iter().collect(),
            };
            let mut response = Response::default();

            info!("Lookup path: {}", dispatcher.active_query());

            match dispatcher.dispatch(&mut invoker, &mut response) {
                Ok(output) => {
                    if let Some(route) = dispatcher.active_route() {
                        println!("route:   {} {}", route.method, route.rule);
                    }
                    println!("status:  {} {}", response.status, response.status_text());
                    if let Some(content_type) = response.get_content_type() {
                        println!("type:    {content_type}");
                    }
                    println!("handler: {output}");
                }
                Err(DispatchError::Terminated { code }) => {
                    println!("Router error {code}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
