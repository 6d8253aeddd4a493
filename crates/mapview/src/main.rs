// mapview - headless inspection tool for the world data of the 3D map viewer
//
// Subcommands:
// - locate:   world tile coordinate -> sector address
// - sector:   open a sector and print tile/wall/model statistics
// - geometry: dump the primitives of one tile as JSON
// - model:    decode one model file and print its counts

mod report;
mod settings;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use mapview_shared::config::get_config;
use mapview_shared::log::{initialize_logging, map_log_level};
use mapview_shared::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG, basic_log, debug_log, detail_log, error_log};
use mapview_world::{ModelDefinition, SECTOR_TILES, SectorAddress, WorldView};

use report::{GeometryReport, LocateReport, ModelReport, SectorReport};
use settings::{Settings, sector_from};

#[derive(Parser, Debug)]
#[command(name = "mapview")]
#[command(about = "Inspect sector, model and placement data of the map viewer")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Data directory override (sectors/, models/, textures/, model_locs.csv)
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Console log level override (0=Minimum, 1=Error, 2=Detail, 3=Full/Debug, 4=Trace)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve an absolute world tile coordinate to its sector
    Locate {
        x: u16,
        y: u16,
    },
    /// Open a sector and print statistics
    Sector(SectorArgs),
    /// Print the primitives of one tile of a sector
    Geometry {
        #[command(flatten)]
        sector: SectorArgs,

        /// Tile inside the sector (format: X,Z)
        #[arg(long = "tile", value_parser = parse_tile)]
        tile: TileArg,
    },
    /// Decode `<data_dir>/models/<name>.ob3`
    Model {
        name: String,
    },
}

/// Sector selection; anything left out comes from the configured start sector
#[derive(Args, Debug)]
struct SectorArgs {
    #[arg(long)]
    x: Option<i32>,

    #[arg(long)]
    y: Option<i32>,

    /// 0 = ground, 1-2 = upper floors, 3 = underground
    #[arg(long)]
    plane: Option<i32>,
}

#[derive(Clone, Debug)]
struct TileArg {
    x: usize,
    z: usize,
}

fn parse_tile(input: &str) -> Result<TileArg, String> {
    let mut parts = input.split(',');
    let x = parts
        .next()
        .ok_or_else(|| "Missing tile X".to_string())?
        .trim()
        .parse::<usize>()
        .map_err(|_| "Invalid tile X".to_string())?;
    let z = parts
        .next()
        .ok_or_else(|| "Missing tile Z".to_string())?
        .trim()
        .parse::<usize>()
        .map_err(|_| "Invalid tile Z".to_string())?;
    if parts.next().is_some() {
        return Err("Expected X,Z".to_string());
    }
    if x >= SECTOR_TILES || z >= SECTOR_TILES {
        return Err(format!("Tile must lie in 0..{SECTOR_TILES}"));
    }
    Ok(TileArg { x, z })
}

fn load_settings(cli: &Cli) -> Settings {
    let mut config = get_config().lock();
    let found = config.set_source(&cli.config, CONFIG_ENV_PREFIX);
    let mut settings = Settings::from_config(&config);
    drop(config);

    let level = cli.log_level.unwrap_or(settings.log_level);
    if let Err(err) = initialize_logging(settings.logs_dir.as_deref(), map_log_level(level), None) {
        eprintln!("Failed to initialize logging: {err}");
    }

    if found {
        detail_log!("Using configuration file: {}", cli.config);
    } else {
        detail_log!("No configuration file {}, using defaults", cli.config);
    }
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.into();
    }
    settings
}

fn resolve_sector(args: &SectorArgs, settings: &Settings) -> anyhow::Result<SectorAddress> {
    if args.x.is_none() && args.y.is_none() && args.plane.is_none() {
        return settings.start_sector().context("invalid start sector in configuration");
    }
    let x = args.x.unwrap_or(settings.start_x);
    let y = args.y.unwrap_or(settings.start_y);
    let plane = args.plane.unwrap_or(settings.start_plane);
    sector_from(x, y, plane).with_context(|| format!("invalid sector {x},{y} plane {plane}"))
}

fn open_view(args: &SectorArgs, settings: &Settings) -> anyhow::Result<WorldView> {
    let address = resolve_sector(args, settings)?;
    let mut view = WorldView::load(&settings.data_dir)
        .with_context(|| format!("loading world data from {}", settings.data_dir.display()))?;
    view.open_sector(address)
        .with_context(|| format!("opening sector {address}"))?;
    Ok(view)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing report")?;
    println!("{text}");
    Ok(())
}

fn run_locate(x: u16, y: u16) -> anyhow::Result<()> {
    let report = LocateReport::new(x, y);
    debug_log!("({}, {}) -> {}", x, y, report.sector);
    print_json(&report)
}

fn run_sector(args: &SectorArgs, settings: &Settings) -> anyhow::Result<()> {
    let view = open_view(args, settings)?;
    print_json(&SectorReport::new(&view))
}

fn run_geometry(args: &SectorArgs, tile: &TileArg, settings: &Settings) -> anyhow::Result<()> {
    let view = open_view(args, settings)?;
    let report = GeometryReport::new(
        &view,
        settings.geometry_params(),
        &settings.options,
        tile.x,
        tile.z,
    );
    print_json(&report)
}

fn run_model(name: &str, settings: &Settings) -> anyhow::Result<()> {
    let path = settings.data_dir.join("models").join(format!("{name}.ob3"));
    let model = ModelDefinition::load(&path).with_context(|| format!("loading model {name}"))?;
    print_json(&ModelReport::new(name, &model))
}

fn run(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    match &cli.command {
        Command::Locate { x, y } => run_locate(*x, *y),
        Command::Sector(args) => run_sector(args, settings),
        Command::Geometry { sector, tile } => run_geometry(sector, tile, settings),
        Command::Model { name } => run_model(name, settings),
    }
}

fn main() {
    let cli = Cli::parse();
    let settings = load_settings(&cli);

    basic_log!("mapview v{}", env!("CARGO_PKG_VERSION"));
    detail_log!("Data directory: {}", settings.data_dir.display());

    if let Err(err) = run(&cli, &settings) {
        error_log!("{:#}", err);
        std::process::exit(1);
    }
}
