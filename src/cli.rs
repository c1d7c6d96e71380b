use anyhow::{Context, Result, anyhow};
use pico_args::Arguments;
use std::{env, path::PathBuf};

use slidepad::config::{Profile, ProfileStore};
use slidepad::replay::{CycleRecord, Replay};
use slidepad::trace::{self, Cycle, TouchReading};
use slidepad::gamepad::GPIO_IDLE;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("replay") => {
            let opts = OutputOpts::parse(&mut pargs)?;
            let path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: slidepad replay <trace> [--profile <name>]"))?;
            let cycles =
                trace::read(&path).with_context(|| format!("reading trace {}", path.display()))?;
            let profile = opts.profile()?;
            log::info!(
                "replaying {} cycle(s) from {} ({} electrodes)",
                cycles.len(),
                path.display(),
                profile.board.touch_width
            );
            print_records(&Replay::new(&profile).run(&cycles), opts.pretty)
        }

        Some("step") => {
            let opts = OutputOpts::parse(&mut pargs)?;
            let mut cycles = Vec::new();
            while let Some(tok) = pargs.opt_free_from_str::<String>()? {
                let touch = trace::parse_value(&tok).map_err(|e| anyhow!(e))?;
                cycles.push(Cycle {
                    line: cycles.len() + 1,
                    touch: TouchReading::Mask(touch),
                    gpio: GPIO_IDLE,
                });
            }
            if cycles.is_empty() {
                return Err(anyhow!("usage: slidepad step <touch>..."));
            }
            let profile = opts.profile()?;
            print_records(&Replay::new(&profile).run(&cycles), opts.pretty)
        }

        Some("profile") => {
            let action: Option<String> = pargs.opt_free_from_str()?;
            let mut store = ProfileStore::load_or_install_default()?;
            match action.as_deref() {
                None | Some("show") => {
                    let name: Option<String> = pargs.opt_free_from_str()?;
                    let profile = match name {
                        Some(n) => store.load(&n)?,
                        None => store.profile.clone(),
                    };
                    print!("{}", toml::to_string_pretty(&profile)?);
                }
                Some("list") => {
                    for name in store.list_profiles() {
                        let mark = if name == store.active_name { '*' } else { ' ' };
                        println!("{mark} {name}");
                    }
                }
                Some("use") => {
                    let name: String = pargs
                        .free_from_str()
                        .map_err(|_| anyhow!("usage: slidepad profile use <name>"))?;
                    store.set_active(&name)?;
                    println!("ok: active profile is now {name}");
                }
                Some("path") => println!("{}", store.profiles_dir.display()),
                Some(other) => return Err(anyhow!("unknown profile action: {other}")),
            }
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

struct OutputOpts {
    profile_name: Option<String>,
    config_path: Option<PathBuf>,
    pretty: bool,
}

impl OutputOpts {
    fn parse(pargs: &mut Arguments) -> Result<Self> {
        Ok(Self {
            profile_name: pargs.opt_value_from_str("--profile")?,
            config_path: pargs.opt_value_from_str("--config")?,
            pretty: pargs.contains("--pretty"),
        })
    }

    /// `--config` wins over `--profile`; otherwise the active profile.
    fn profile(&self) -> Result<Profile> {
        if let Some(path) = &self.config_path {
            return Ok(Profile::load_file(path)?);
        }
        let store = ProfileStore::load_or_install_default()?;
        match &self.profile_name {
            Some(name) => Ok(store.load(name)?),
            None => Ok(store.profile),
        }
    }
}

fn print_records(records: &[CycleRecord], pretty: bool) -> Result<()> {
    for r in records {
        let line = if pretty {
            serde_json::to_string_pretty(r)?
        } else {
            serde_json::to_string(r)?
        };
        println!("{line}");
    }
    Ok(())
}

fn print_help() {
    println!(
        r#"slidepad — touch-slider controller input core

USAGE:
  slidepad help [command]                 Show general or command-specific help
  slidepad replay <trace> [options]       Run a recorded trace through the pipeline
  slidepad step <touch>... [options]      Run touch masks given on the command line
  slidepad profile [show [name]]          Print a profile (active by default)
  slidepad profile list                   List profiles
  slidepad profile use <name>             Switch active profile
  slidepad profile path                   Print the profiles directory

OPTIONS:
  --profile <name>                        Use a named profile instead of the active one
  --config <path>                         Use a profile file directly
  --pretty                                Pretty-print JSON records

TIPS:
  - Profiles: ~/.config/slidepad/profiles
  - Active profile pointer: ~/.config/slidepad/active
  - RUST_LOG=debug shows slider phase changes
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "replay" => println!(
            "usage: slidepad replay <trace> [--profile <name>] [--config <path>] [--pretty]\n\
             Each trace line is `<touch> [gpio]`; `!` as touch marks a failed sensor read.\n\
             Prints one JSON record per cycle."
        ),
        "step" => println!(
            "usage: slidepad step <touch>... [--profile <name>] [--config <path>] [--pretty]\n\
             Feeds each mask (hex, binary or decimal) to a fresh tracker, buttons released."
        ),
        "profile" => println!(
            "usage: slidepad profile [show [name] | list | use <name> | path]\n\
             Manages board profiles; `use` only switches if the profile validates."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
