use anyhow::{Context, Result};
use rpg_xref::{
    cli::{Cli, Commands, LogLevel},
    data::{Database, DirMapSource},
    filter::resolve_types,
    ui::{browser::Browser, Phase, StderrUi, Ui, UiApp},
    writer::export_references,
    EntityType, XrefManager,
};
use std::io;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.global.log_level);

    let data_dir = cli.global.data_dir();
    let start = Instant::now();

    let db = Database::load(&data_dir)
        .with_context(|| format!("Failed to load project database from {:?}", data_dir))?;
    let mut manager = XrefManager::new(db, DirMapSource::new(&data_dir));

    match cli.command {
        Commands::Types => {
            manager.ensure_built(&mut StderrUi)?;
            println!("Referenced entity types:\n");
            for kind in manager.referenced_types() {
                let count: usize = manager
                    .referenced_ids(kind)
                    .into_iter()
                    .map(|id| manager.references(kind, id).len())
                    .sum();
                println!("  {:<14} {:>6} references", kind.plural(), count);
            }
        }

        Commands::Ids { entity_type } => {
            let kind = parse_type(&entity_type)?;
            manager.ensure_built(&mut StderrUi)?;
            for id in manager.referenced_ids(kind) {
                println!(
                    "  {}  ({} references)",
                    manager.entry_label(kind, id),
                    manager.references(kind, id).len()
                );
            }
        }

        Commands::Refs {
            entity_type,
            id,
            json,
        } => {
            let kind = parse_type(&entity_type)?;
            manager.ensure_built(&mut StderrUi)?;
            let refs = manager.references(kind, id);

            if json {
                println!("{}", serde_json::to_string_pretty(refs)?);
            } else {
                println!("{} {}\n", kind.title(), manager.entry_label(kind, id));
                if refs.is_empty() {
                    println!("  No references found");
                }
                for record in refs {
                    println!("  {}", manager.describe(record));
                }
            }
        }

        Commands::Browse => {
            let mut ui = UiApp::new()?;
            ui.set_phase(Phase::Loading);
            manager.ensure_built(&mut ui)?;

            let mut browser = Browser::new(&manager);
            browser.run(ui.terminal_mut())?;
            ui.restore()?;
        }

        Commands::Export {
            output_db,
            include,
            exclude,
        } => {
            let types = resolve_types(include, exclude)?;

            let mut ui = UiApp::new()?;
            ui.set_info(format!("{:?} -> {:?}", cli.global.project, output_db));
            manager.ensure_built(&mut ui)?;
            let record_count = export_references(&manager, &output_db, &types, &mut ui)?;

            let elapsed = start.elapsed();
            ui.finish(&format!(
                "Created {:?} ({} references) in {:.1}s",
                output_db,
                record_count,
                elapsed.as_secs_f64()
            ))?;
        }
    }

    Ok(())
}

fn parse_type(name: &str) -> Result<EntityType> {
    name.parse::<EntityType>().map_err(anyhow::Error::msg)
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
