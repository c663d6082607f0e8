use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gbmapper::{config, persist, report, script::BusWrite};
use gbmapper_core::Cartridge;
use log::info;

#[derive(Parser)]
#[command(version, about = "Load a Game Boy ROM and inspect its bank mapping")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Force DMG mode
    #[arg(long)]
    dmg: bool,

    /// Emulate the MBC1 64-bank multicart wiring when the header fits
    #[arg(long)]
    multicart: bool,

    /// Game Genie codes, separated by `;`
    #[arg(long)]
    cheats: Option<String>,

    /// Bus write to replay after loading, as ADDR=DATA in hex (repeatable)
    #[arg(long = "write", value_name = "ADDR=DATA")]
    writes: Vec<BusWrite>,

    /// Write the (cheat-patched) ROM image to this path
    #[arg(long)]
    patched_out: Option<PathBuf>,

    /// Write battery RAM and RTC data back next to the ROM
    #[arg(long)]
    persist: bool,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let cfg_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = config::load_from_file(&cfg_path);
    let force_dmg = args.dmg || cfg.force_dmg;
    let multicart = args.multicart || cfg.multicart_compat;
    let cheats = args.cheats.clone().or(cfg.cheats);

    let mut cart = Cartridge::new();
    let file = match std::fs::File::open(&args.rom) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {e}", args.rom.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = cart.load_rom_from(file, force_dmg, multicart) {
        eprintln!("Failed to load {}: {e}", args.rom.display());
        return ExitCode::FAILURE;
    }

    if let Err(e) = persist::load_save(&mut cart, &args.rom) {
        eprintln!("Failed to read save data: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = persist::load_rtc(&mut cart, &args.rom) {
        eprintln!("Failed to read RTC data: {e}");
        return ExitCode::FAILURE;
    }

    if let Some(codes) = cheats.as_deref() {
        cart.set_cheat_codes(codes);
        info!("{} ROM byte(s) patched by cheats", cart.cheat_patch_count());
    }

    for w in &args.writes {
        info!("write {w}");
        cart.write(w.addr, w.data);
    }

    print!("{}", report::summary(&cart));

    if let Some(path) = &args.patched_out {
        if let Err(e) = std::fs::write(path, cart.banks().rom()) {
            eprintln!("Failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        info!("Patched ROM written to {}", path.display());
    }

    if args.persist
        && let Err(e) = persist::store(&cart, &args.rom)
    {
        eprintln!("Failed to write save data: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
