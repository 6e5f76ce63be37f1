use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use actix_files::Files;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{bail, Context, Result};
use folios::config::{load_site_configuration, SiteConfig};
use folios::error::{PageError, RouteError};
use folios::github::RawContentClient;
use folios::layout::{render_error, Assets};
use folios::notebook::write_notebook;
use folios::render_route;
use folios::route::Route;
use folios::source::{LocalSite, SiteSource};
use folios::template::{join_base, strip_base};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    Render {
        class: String,
        id: String,
        site: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    Serve(Option<PathBuf>),
    Build {
        site: PathBuf,
        output_dir: PathBuf,
    },
}

#[derive(Clone)]
struct AppState {
    config: SiteConfig,
    assets: Assets,
    source: SiteSource,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    class: Option<String>,
    id: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    init_tracing();

    let raw_args: Vec<String> = env::args().skip(1).collect();
    let (config_path, command) = match parse_args(&raw_args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(command, config_path).await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOLIOS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_command(command: CliCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        CliCommand::Render {
            class,
            id,
            site,
            output,
        } => run_render(&class, &id, site, output, config_path).await,
        CliCommand::Serve(site) => run_server(site, config_path).await,
        CliCommand::Build { site, output_dir } => {
            let config = load_site_configuration(Some(&site), config_path.as_deref());
            let html_path = write_notebook(&site, &output_dir, &config).await?;
            println!("Notebook written to {}", html_path.display());
            Ok(())
        }
    }
}

fn parse_args(args: &[String]) -> Result<(Option<PathBuf>, CliCommand)> {
    let mut iter = args.iter().peekable();
    let mut config_path: Option<PathBuf> = None;

    while let Some(flag) = iter.peek() {
        match flag.as_str() {
            "-c" | "--config" => {
                iter.next();
                let Some(path) = iter.next() else {
                    bail!("Missing value for --config");
                };
                config_path = Some(PathBuf::from(path));
            }
            _ => break,
        }
    }

    let remaining: Vec<String> = iter.cloned().collect();
    let command = parse_command(&remaining)?;
    Ok((config_path, command))
}

fn parse_command(args: &[String]) -> Result<CliCommand> {
    let mut args = args.iter().cloned();
    let Some(command) = args.next() else {
        bail!("Missing command");
    };

    match command.as_str() {
        "render" => {
            let mut positional = Vec::new();
            let mut site = None;
            let mut output = None;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--site" => {
                        let path = args
                            .next()
                            .ok_or_else(|| anyhow::anyhow!("Missing value for --site"))?;
                        site = Some(validate_path(path)?);
                    }
                    "-o" | "--output" => {
                        let path = args
                            .next()
                            .ok_or_else(|| anyhow::anyhow!("Missing value for --output"))?;
                        output = Some(PathBuf::from(path));
                    }
                    _ if positional.len() < 2 => positional.push(arg),
                    _ => bail!("Unexpected argument for render: {arg}"),
                }
            }

            let mut positional = positional.into_iter();
            let (Some(class), Some(id)) = (positional.next(), positional.next()) else {
                bail!("render needs a class and an id");
            };
            Ok(CliCommand::Render {
                class,
                id,
                site,
                output,
            })
        }
        "serve" => {
            let site = args.next().map(validate_path).transpose()?;
            if args.next().is_some() {
                bail!("Unexpected argument for serve");
            }
            Ok(CliCommand::Serve(site))
        }
        "build" => {
            let mut site = None;
            let mut output_dir = None;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "-o" | "--output" => {
                        let path = args
                            .next()
                            .ok_or_else(|| anyhow::anyhow!("Missing value for --output"))?;
                        output_dir = Some(PathBuf::from(path));
                    }
                    _ if site.is_none() => site = Some(arg),
                    _ => bail!("Unexpected argument for build: {arg}"),
                }
            }

            let site = site
                .ok_or_else(|| anyhow::anyhow!("Missing path for build"))
                .and_then(validate_path)?;
            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("output"));
            Ok(CliCommand::Build { site, output_dir })
        }
        _ => bail!("Unknown command: {command}"),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  folios [-c <config-file>] render <class> <id> [--site <site-dir>] [-o <file>]");
    eprintln!("  folios [-c <config-file>] serve [<site-dir>]");
    eprintln!("  folios [-c <config-file>] build <site-dir> [-o <output-dir>]");
}

fn validate_path(path: String) -> Result<PathBuf> {
    let site = PathBuf::from(path);
    if !site.is_dir() {
        bail!("Site directory not found: {}", site.display());
    }
    Ok(site)
}

/// Local checkout when a site directory is given, the configured repository
/// otherwise.
fn site_source(config: &SiteConfig, site: Option<&Path>) -> Result<SiteSource> {
    match site {
        Some(root) => Ok(SiteSource::Local(LocalSite::new(root, config))),
        None => Ok(SiteSource::Remote(RawContentClient::from_config(config)?)),
    }
}

fn site_assets(site: Option<&Path>) -> Assets {
    site.map(|root| Assets::from_assets_dir(root.join("assets")))
        .unwrap_or_else(Assets::embedded)
}

async fn run_render(
    class: &str,
    id: &str,
    site: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_site_configuration(site.as_deref(), config_path.as_deref());
    let route = Route::new(class, id, &config)?;
    let source = site_source(&config, site.as_deref())?;
    let assets = site_assets(site.as_deref());

    let markup = render_route(&config, &assets, &source, &route, std::future::pending()).await?;
    let html = markup.into_string();

    match output {
        Some(path) => {
            fs::write(&path, html).with_context(|| format!("Writing {}", path.display()))?;
            println!("Page written to {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

async fn run_server(site: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_site_configuration(site.as_deref(), config_path.as_deref());
    let state = AppState {
        source: site_source(&config, site.as_deref())?,
        assets: site_assets(site.as_deref()),
        config,
    };
    let resources = site.as_ref().map(|root| {
        (
            join_base(&state.config.base_path, "resources"),
            root.join("resources"),
        )
    });

    println!("Serving notebook on http://localhost:8080");
    HttpServer::new(move || {
        let mut app = App::new().app_data(web::Data::new(state.clone()));
        if let Some((mount, path)) = &resources {
            app = app.service(Files::new(mount, path.clone()).prefer_utf8(true));
        }
        app.default_service(web::get().to(page))
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await?;

    Ok(())
}

/// `/?class=..&id=..` at the base path, `/<base>/<class>/<id...>` below it.
async fn page(
    req: HttpRequest,
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let route = route_for(req.path(), &query, &state.config);
    let result = match route {
        Ok(route) => render_route(
            &state.config,
            &state.assets,
            &state.source,
            &route,
            std::future::pending(),
        )
        .await
        .map_err(PageError::from),
        Err(err) => Err(PageError::from(err)),
    };

    match result {
        Ok(markup) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(markup.into_string()),
        Err(err) => {
            tracing::warn!(path = %req.path(), error = %err, "Failed to render page");
            HttpResponse::build(error_status(&err))
                .content_type("text/html; charset=utf-8")
                .body(render_error(&err.to_string(), &state.config, &state.assets).into_string())
        }
    }
}

fn route_for(path: &str, query: &PageQuery, config: &SiteConfig) -> Result<Route, RouteError> {
    let at_base = strip_base(path, &config.base_path)
        .is_some_and(|rest| rest.trim_matches('/').is_empty());
    if at_base {
        Route::from_params(query.class.as_deref(), query.id.as_deref(), config)
    } else {
        Route::from_path(path, config)
    }
}

fn error_status(err: &PageError) -> StatusCode {
    match err {
        PageError::Route(_) => StatusCode::NOT_FOUND,
        PageError::Fetch(_) => StatusCode::BAD_GATEWAY,
    }
}
