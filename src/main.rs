//! Variant resolver CLI
//!
//! Entry point for the `variant-resolve` command-line tool.

use android_variants::plugin::Registration;
use android_variants::{
    register_plugins, BuildVariant, EffectivePolicy, ProjectLayout,
    PropertyResolver, RecordingRegistry, VariantDescriptor, VariantDescriptorBuilder,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "variant-resolve")]
#[command(about = "Resolve Android build-variant configuration", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the descriptor for one variant and print it as JSON
    Resolve {
        /// Variant to resolve (debug or release)
        #[arg(long)]
        variant: String,

        /// Android project root (default: android)
        #[arg(long, short = 'p', default_value = "android")]
        project_root: PathBuf,

        /// Policy file (default: <project-root>/variants.toml if present)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Environment overriding the policy (development or production)
        #[arg(long, short = 'e')]
        environment: Option<String>,

        /// Policy override, e.g. --set app.min_sdk=28 (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Also print the plugins a registry would receive
        #[arg(long)]
        register: bool,
    },

    /// Resolve a single overlay property
    Property {
        /// Property key, e.g. flutter.versionCode
        key: String,

        /// Value returned when the key is absent
        #[arg(long, short = 'd', default_value = "")]
        default: String,

        /// Android project root (default: android)
        #[arg(long, short = 'p', default_value = "android")]
        project_root: PathBuf,
    },

    /// Print the effective build policy with provenance (secrets redacted)
    Policy {
        /// Android project root (default: android)
        #[arg(long, short = 'p', default_value = "android")]
        project_root: PathBuf,

        /// Policy file (default: <project-root>/variants.toml if present)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Policy override (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            variant,
            project_root,
            policy,
            environment,
            overrides,
            register,
        } => {
            run_resolve(&variant, project_root, policy, environment, overrides, register);
        }
        Commands::Property {
            key,
            default,
            project_root,
        } => {
            run_property(&key, &default, project_root);
        }
        Commands::Policy {
            project_root,
            policy,
            overrides,
        } => {
            run_policy(project_root, policy, overrides);
        }
    }
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    descriptor: &'a VariantDescriptor,
    registrations: &'a [Registration],
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    process::exit(1);
}

fn run_resolve(
    variant: &str,
    project_root: PathBuf,
    policy_path: Option<PathBuf>,
    environment: Option<String>,
    overrides: Vec<String>,
    register: bool,
) {
    let layout = ProjectLayout::new(project_root);

    let variant: BuildVariant = match variant.parse() {
        Ok(v) => v,
        Err(e) => fail("Configuration error", e),
    };

    let effective = match EffectivePolicy::for_layout(
        &layout,
        policy_path.as_deref(),
        &overrides,
        environment.as_deref(),
    ) {
        Ok(p) => p,
        Err(e) => fail("Error loading policy", e),
    };

    let properties = PropertyResolver::new(layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(effective.policy(), &properties, layout.app_dir());

    let descriptor = match builder.build(variant) {
        Ok(d) => d,
        Err(e) => fail("Configuration error", e),
    };

    let json = if register {
        let mut registry = RecordingRegistry::new();
        register_plugins(&descriptor, &mut registry);
        serde_json::to_string_pretty(&ResolveOutput {
            descriptor: &descriptor,
            registrations: registry.registrations(),
        })
    } else {
        descriptor.to_json()
    };

    match json {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Error serializing output", e),
    }
}

fn run_property(key: &str, default: &str, project_root: PathBuf) {
    let layout = ProjectLayout::new(project_root);
    let properties = PropertyResolver::new(layout.overlay_path());

    match properties.resolve(key, default) {
        Ok(value) => println!("{}", value),
        Err(e) => fail("Error reading overlay", e),
    }
}

fn run_policy(project_root: PathBuf, policy_path: Option<PathBuf>, overrides: Vec<String>) {
    let layout = ProjectLayout::new(project_root);

    let effective = match EffectivePolicy::for_layout(&layout, policy_path.as_deref(), &overrides, None)
    {
        Ok(p) => p,
        Err(e) => fail("Error loading policy", e),
    };

    match effective.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Error serializing output", e),
    }
}
