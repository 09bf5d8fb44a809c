//! TileVision - Entry Point
//!
//! Catalog lookups, prompt parsing, renders, the admin views and an
//! interactive visualizer session.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tile_vision::admin::{self, CreditLedger, DashboardStats};
use tile_vision::catalog::{TileCatalog, TileCategory};
use tile_vision::command::{SynonymTable, TileResolver};
use tile_vision::core::{config, set_config, Result, VisionConfig, VisionError};
use tile_vision::llm::{unmatched_tile_message, IntentExtractor, LlmClient, ParsedPromptResult};
use tile_vision::render::{
    get_render_options, visualize_tile_in_room, DataUri, GeminiImageClient, ImageSource,
    Orientation, RenderParams, RenderRequest,
};
use tile_vision::ui::state::{NEED_BOTH_TILES, NO_VALID_IMAGE};
use tile_vision::ui::{Action, ChatRole, Outcome, RenderTarget, Visualizer};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Balances below this are flagged on the dashboard
const LOW_BALANCE_THRESHOLD: i64 = 100;

/// TileVision - see catalog tiles in your own room
#[derive(Parser, Debug)]
#[command(name = "tile-vision")]
#[command(about = "Visualize catalog tiles in a room photo from natural language requests")]
struct Args {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tile catalog file (TOML); overrides the config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog tiles
    Catalog,
    /// Resolve a tile reference (SKU, name or description)
    Resolve { text: String },
    /// Turn a prompt into an apply_textures intent (needs LLM_API_KEY)
    Parse { prompt: String },
    /// Render tiles into a room photo (needs IMAGE_API_KEY, or LLM_API_KEY for a Gemini LLM)
    Render(RenderCmd),
    /// Interactive visualizer session
    Chat {
        /// Room photo to start with: file path, data URI or http(s) URL
        #[arg(long)]
        room: Option<String>,
    },
    /// Show the credit ledger
    Ledger {
        /// Only this user's entries
        #[arg(long)]
        user: Option<String>,
    },
    /// Show render job statistics
    Dashboard,
}

#[derive(clap::Args, Debug)]
struct RenderCmd {
    /// Room photo: file path, data URI or http(s) URL
    #[arg(long)]
    room: String,

    /// Floor tile SKU or name
    #[arg(long)]
    floor: String,

    /// Wall tile SKU or name
    #[arg(long)]
    wall: String,

    /// Grout width in pixels (0 to 10)
    #[arg(long)]
    grout_width: Option<f32>,

    /// Tile scale (0.5 to 2)
    #[arg(long)]
    tile_scale: Option<f32>,

    /// Lay tiles vertically
    #[arg(long)]
    vertical: bool,

    /// One render with the given parameters instead of three options
    #[arg(long)]
    single: bool,

    /// Write the render to this file instead of printing its data URI
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tile_vision=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut loaded = VisionConfig::load(args.config.as_deref())?;
    if let Some(path) = &args.catalog {
        loaded.catalog_path = Some(path.clone());
    }
    if set_config(loaded).is_err() {
        tracing::warn!("config was already initialized");
    }
    let config = config();

    let catalog = Arc::new(TileCatalog::load(config.catalog_path.as_deref())?);
    let synonyms = Arc::new(config.synonym_table());
    tracing::debug!(tiles = catalog.len(), synonyms = synonyms.len(), "catalog loaded");

    match args.command {
        Command::Catalog => list_catalog(&catalog, args.json),
        Command::Resolve { text } => resolve(&catalog, &synonyms, &text, args.json),
        Command::Parse { prompt } => {
            let rt = Runtime::new()?;
            let extractor = intent_extractor(config, catalog, synonyms)?;
            let result = rt.block_on(extractor.parse_prompt(&prompt))?;
            print_parse_result(&result, args.json)
        }
        Command::Render(cmd) => render(config, &catalog, &synonyms, cmd),
        Command::Chat { room } => chat(config, catalog, synonyms, room.as_deref()),
        Command::Ledger { user } => show_ledger(user.as_deref(), args.json),
        Command::Dashboard => show_dashboard(args.json),
    }
}

fn intent_extractor(
    config: &VisionConfig,
    catalog: Arc<TileCatalog>,
    synonyms: Arc<SynonymTable>,
) -> Result<IntentExtractor> {
    let client = LlmClient::from_config(config)?;
    tracing::info!(model = client.model(), format = ?client.api_format(), "LLM client ready");
    Ok(IntentExtractor::new(Arc::new(client), catalog, synonyms))
}

/// Accept a data URI, an http(s) URL or a local image file
fn load_image(source: &str) -> Result<ImageSource> {
    if source.starts_with("data:") || source.starts_with("http://") || source.starts_with("https://")
    {
        ImageSource::parse(source)
    } else {
        Ok(ImageSource::Inline(DataUri::from_image_file(Path::new(source))?))
    }
}

fn save_render(render: &DataUri, path: &Path) -> Result<()> {
    std::fs::write(path, render.decode()?)?;
    Ok(())
}

fn list_catalog(catalog: &TileCatalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.all())?);
        return Ok(());
    }

    for (title, category) in [
        ("Floor tiles", TileCategory::Floor),
        ("Wall tiles", TileCategory::Wall),
        ("Other tiles", TileCategory::Unknown),
    ] {
        let tiles: Vec<_> = catalog.by_category(category).collect();
        if tiles.is_empty() {
            continue;
        }
        println!("{}:", title);
        for tile in tiles {
            println!("  {:<26} {}", tile.id, tile.name);
        }
    }
    Ok(())
}

fn resolve(catalog: &TileCatalog, synonyms: &SynonymTable, text: &str, json: bool) -> Result<()> {
    let resolver = TileResolver::new(catalog, synonyms);
    match resolver.resolve(text) {
        Some(found) if json => println!(
            "{}",
            serde_json::json!({
                "id": found.tile.id,
                "name": found.tile.name,
                "reason": format!("{:?}", found.reason),
            })
        ),
        Some(found) => println!(
            "{} ({}) matched by {:?}",
            found.tile.id, found.tile.name, found.reason
        ),
        None if json => println!("{}", serde_json::json!({ "error": unmatched_tile_message(text) })),
        None => println!("{}", unmatched_tile_message(text)),
    }
    Ok(())
}

fn print_parse_result(result: &ParsedPromptResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    match result {
        ParsedPromptResult::ParsedIntent(intent) => {
            let args = &intent.args;
            println!("Parsed Intent: apply_textures");
            if let Some(floor) = &args.floor_tile_sku {
                println!("  Floor: {}", floor);
            }
            if let Some(wall) = &args.wall_tile_sku {
                println!("  Wall: {}", wall);
            }
            if let Some(grout) = args.grout_width_mm {
                println!("  Grout width: {} mm", grout);
            }
            if let Some(deg) = args.orientation_deg {
                println!("  Orientation: {} deg", deg);
            }
            if let Some(scale) = args.scale_meters_per_repeat {
                println!("  Scale: {} m per repeat", scale);
            }
        }
        ParsedPromptResult::Error(message) => println!("{}", message),
    }
    Ok(())
}

fn render(
    config: &VisionConfig,
    catalog: &TileCatalog,
    synonyms: &SynonymTable,
    cmd: RenderCmd,
) -> Result<()> {
    let resolver = TileResolver::new(catalog, synonyms);
    let floor = resolver
        .find_tile(&cmd.floor)
        .ok_or_else(|| VisionError::TileNotFound(cmd.floor.clone()))?;
    let wall = resolver
        .find_tile(&cmd.wall)
        .ok_or_else(|| VisionError::TileNotFound(cmd.wall.clone()))?;

    let mut request = RenderRequest::new(
        load_image(&cmd.room)?,
        ImageSource::parse(&floor.image_url)?,
        ImageSource::parse(&wall.image_url)?,
    );
    request.grout_width = cmd.grout_width;
    request.tile_scale = cmd.tile_scale;
    if cmd.vertical {
        request.orientation = Some(Orientation::Vertical);
    }

    let generator = GeminiImageClient::from_config(config)?;
    let rt = Runtime::new()?;
    tracing::info!(floor = %floor.id, wall = %wall.id, single = cmd.single, "rendering");

    let image = if cmd.single {
        let params = request.params_or(RenderParams::from(&config.render));
        rt.block_on(visualize_tile_in_room(&generator, &request, &params))?
    } else {
        let options = rt.block_on(get_render_options(&generator, &request))?;
        for (i, option) in options.options.iter().enumerate() {
            let status = if option.is_empty() { "no image" } else { "ok" };
            eprintln!("option {}: {}", i + 1, status);
        }
        let first = options
            .first_valid()
            .ok_or_else(|| VisionError::ImageGenerationError(NO_VALID_IMAGE.into()))?;
        DataUri::parse(first)?
    };

    match cmd.out {
        Some(path) => {
            save_render(&image, &path)?;
            println!("Saved render to {}", path.display());
        }
        None => println!("{}", image),
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Rendered(render) => println!(
            "Render ready ({} KB). Use 'save [path]' to write it, 'back' to return to the photo.",
            render.len() / 1024
        ),
        Outcome::Failed(message) => println!("{}", message),
    }
}

fn chat(
    config: &VisionConfig,
    catalog: Arc<TileCatalog>,
    synonyms: Arc<SynonymTable>,
    room: Option<&str>,
) -> Result<()> {
    let rt = Runtime::new()?;
    let extractor = intent_extractor(config, Arc::clone(&catalog), Arc::clone(&synonyms))?;
    let generator = Arc::new(GeminiImageClient::from_config(config)?);
    let mut visualizer = Visualizer::new(extractor, generator, Arc::clone(&catalog));
    let resolver = TileResolver::new(&catalog, &synonyms);

    if let Some(room) = room {
        visualizer.upload_room_photo(load_image(room)?);
    }

    println!("\n=== TILEVISION ===");
    println!("Describe the tiles you want, e.g. \"calacatta gold floor with carrara walls\"");
    println!();
    println!("Commands:");
    println!("  photo <path|url>  - Set the room photo");
    println!("  tiles             - List catalog tiles");
    println!("  select <tile>     - Pick a tile and add it to the prompt");
    println!("  render            - Render the selected floor and wall tiles");
    println!("  save [path]       - Write the current render to a file");
    println!("  back              - Return to the room photo");
    println!("  history           - Show the conversation");
    println!("  quit / q          - Exit");
    println!("  <any text>        - Tile request (parsed by LLM)");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tiles" {
            list_catalog(&catalog, false)?;
            continue;
        }

        if input == "history" {
            for message in &visualizer.state().messages {
                let who = match message.role {
                    ChatRole::User => "you",
                    ChatRole::System => "system",
                };
                println!("  [{}] {}", who, message.content);
            }
            continue;
        }

        if input == "back" {
            visualizer.dispatch(Action::ResetView);
            println!("Showing the room photo.");
            continue;
        }

        if input == "render" {
            let state = visualizer.state();
            let selection = (state.selected_floor.clone(), state.selected_wall.clone());
            let outcome = match selection {
                (Some(floor), Some(wall)) => {
                    rt.block_on(visualizer.visualize(RenderTarget::new(floor, wall)))
                }
                _ => Outcome::Failed(NEED_BOTH_TILES.to_string()),
            };
            print_outcome(&outcome);
            continue;
        }

        if let Some(source) = input.strip_prefix("photo ") {
            match load_image(source.trim()) {
                Ok(photo) => {
                    visualizer.upload_room_photo(photo);
                    println!("Room photo set.");
                }
                Err(e) => println!("Could not load photo: {}", e),
            }
            continue;
        }

        if let Some(text) = input.strip_prefix("select ") {
            match resolver.find_tile(text.trim()) {
                Some(tile) => {
                    visualizer.select_tile(&tile.id);
                    println!(
                        "Selected {}. Prompt: {}",
                        tile.name,
                        visualizer.state().current_prompt().unwrap_or_default()
                    );
                }
                None => println!("{}", unmatched_tile_message(text.trim())),
            }
            continue;
        }

        if input == "save" || input.starts_with("save ") {
            let Some(render) = visualizer.state().selected_render.clone() else {
                println!("Nothing rendered yet.");
                continue;
            };
            let saved = DataUri::parse(&render).and_then(|uri| {
                let path = match input["save".len()..].trim() {
                    "" => PathBuf::from(format!("tilevision-render.{}", uri.extension())),
                    path => PathBuf::from(path),
                };
                save_render(&uri, &path).map(|()| path)
            });
            match saved {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => println!("Could not save render: {}", e),
            }
            continue;
        }

        let outcome = rt.block_on(visualizer.submit_prompt(input));
        print_outcome(&outcome);
    }

    println!(
        "\nGoodbye! {} messages this session.",
        visualizer.state().messages.len()
    );
    Ok(())
}

fn show_ledger(user: Option<&str>, json: bool) -> Result<()> {
    let ledger = CreditLedger::mock();
    let entries: Vec<_> = match user {
        Some(user) => ledger.entries_for(user).collect(),
        None => ledger.entries().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<6} {:<34} {:>6} {:>6}",
        "ID", "USER", "REASON", "DEBIT", "CREDIT"
    );
    for entry in &entries {
        println!(
            "{:<8} {:<6} {:<34} {:>6} {:>6}",
            entry.id, entry.user_id, entry.reason, entry.debit, entry.credit
        );
    }
    match user {
        Some(user) => println!("\nBalance for {}: {}", user, ledger.balance_for(user)),
        None => {
            let totals = ledger.totals();
            println!(
                "\nTotal debit {}, total credit {}, net {}",
                totals.debit,
                totals.credit,
                totals.net()
            );
        }
    }
    Ok(())
}

fn show_dashboard(json: bool) -> Result<()> {
    let jobs = admin::mock_jobs();
    let users = admin::mock_users();
    let stats = DashboardStats::from_jobs(&jobs);
    let low: Vec<_> = admin::low_balance(&users, LOW_BALANCE_THRESHOLD).collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "stats": stats,
                "lowBalance": low,
            }))?
        );
        return Ok(());
    }

    println!("=== DASHBOARD ===");
    println!("Total renders: {}", stats.total);
    println!(
        "Completed: {}  Failed: {}  Pending: {}",
        stats.completed, stats.failed, stats.pending
    );
    match stats.success_rate {
        Some(rate) => println!("Success rate: {:.1}%", rate * 100.0),
        None => println!("Success rate: n/a"),
    }
    if let Some(latency) = stats.mean_latency_ms {
        println!("Mean latency: {:.1} s", latency / 1000.0);
    }

    println!("\nCredit balance alerts (< {}):", LOW_BALANCE_THRESHOLD);
    for user in low {
        println!("  {:<14} {:<22} {}", user.name, user.email, user.credits);
    }
    Ok(())
}
