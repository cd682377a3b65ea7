//! Binary entry point: open the store, load the CSV files, then either run the
//! terminal menu or a single subcommand.
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use log::error;

use inventory_manager::catalog::{add_product, NewProductInput};
use inventory_manager::config::{AddArgs, Cli, Command};
use inventory_manager::export::export;
use inventory_manager::loader::parse_price;
use inventory_manager::logging::{self, LogTarget};
use inventory_manager::report::{analyze, describe_product, view_product};
use inventory_manager::{load_all, run_app, App, Schema, Store};

/// Startup failures (store cannot be opened, initial load aborted) end the
/// process with an error; everything after that is reported and survived.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let target = if cli.is_interactive() {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    if logging::init(target).is_err() {
        // No home directory: fall back to stderr so records are not lost.
        logging::init(LogTarget::Stderr).ok();
    }

    let mut store = Store::open(&cli.db, &Schema::inventory())?;

    let mut startup_status = String::from("Ready.");
    if !cli.skip_load {
        let (brands, products) = load_all(&mut store, &cli.brands, &cli.inventory, cli.on_error)
            .inspect_err(|err| error!("startup load failed: {err}"))?;
        startup_status = format!(
            "Loaded {} brands and {} products ({} skipped: unknown brand, {} skipped: malformed).",
            brands.inserted,
            products.inserted,
            products.skipped_missing_brand,
            brands.skipped_malformed + products.skipped_malformed
        );
        if products.skipped_missing_brand > 0 {
            eprintln!("warning: {startup_status}");
        }
    }

    match &cli.command {
        None => {
            let mut app = App::new(store, cli.backup_dir.clone()).with_status(startup_status);
            run_app(&mut app)
        }
        Some(command) => run_command(&mut store, &cli, command),
    }
}

fn run_command(store: &mut Store, cli: &Cli, command: &Command) -> Result<()> {
    match command {
        Command::View { id } => match view_product(store, *id)? {
            Some(product) => {
                for line in describe_product(&product) {
                    println!("{line}");
                }
                Ok(())
            }
            None => {
                println!("No product found with ID {id}.");
                Ok(())
            }
        },
        Command::Add(args) => run_add(store, args),
        Command::Analyze => {
            for line in analyze(store)?.lines() {
                println!("{line}");
            }
            Ok(())
        }
        Command::Backup => {
            let summary = export(store, &cli.brands_backup_path(), &cli.products_backup_path())?;
            println!(
                "Backed up {} brands to {} and {} products to {}.",
                summary.brands,
                summary.brands_path.display(),
                summary.products,
                summary.products_path.display()
            );
            Ok(())
        }
    }
}

fn run_add(store: &mut Store, args: &AddArgs) -> Result<()> {
    let input = NewProductInput {
        name: args.name.clone(),
        quantity: args.quantity,
        price: parse_price(&args.price)?,
        brand_name: args.brand.clone(),
    };
    let added = add_product(store, input, Local::now().date_naive())?;
    if added.brand_created {
        println!("Created brand '{}'.", added.brand.brand_name);
    }
    println!(
        "Product '{}' added successfully with ID {}.",
        added.product.product_name, added.product.product_id
    );
    Ok(())
}
