//! Generates or blends one airfoil, writes it as a coordinate listing and prints a JSON report.

use aeroshape_rs::airfoil::blend::BlendConfig;
use aeroshape_rs::airfoil::catalog::embedded;
use aeroshape_rs::airfoil::dat::write_dat;
use aeroshape_rs::airfoil::params::Spacing;
use aeroshape_rs::airfoil::validate::validate_geometry;
use aeroshape_rs::{AirfoilFamily, DesignSession, Result, ShapeParameters};
use clap::Parser;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aeroshape")]
#[command(about = "Generate, blend and validate airfoil coordinates")]
struct Args {
    /// Airfoil family, by slug ("naca4", "wortmann-fx") or label ("NACA 4-digit"). Overrides the
    /// parameter file; NACA 4-digit when neither names one
    #[arg(long)]
    family: Option<AirfoilFamily>,

    /// JSON file with shape parameters; flags given on the command line take precedence
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    thickness: Option<f64>,

    #[arg(long)]
    camber: Option<f64>,

    #[arg(long)]
    temperature: Option<f64>,

    #[arg(long)]
    smoothness: Option<f64>,

    /// Number of coordinate points
    #[arg(long)]
    points: Option<usize>,

    /// Cluster stations near the leading and trailing edges
    #[arg(long)]
    cosine: bool,

    /// Blend the built in reference sections instead of using a family generator
    #[arg(long, conflicts_with = "random")]
    blend: bool,

    /// Pick the family, its parameters and the resolution at random, ignoring shape flags
    #[arg(long)]
    random: bool,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Coordinate listing to write
    #[arg(long, default_value = "airfoil.dat")]
    output: PathBuf,
}

fn load_parameters(args: &Args) -> Result<ShapeParameters> {
    let mut params = match &args.params {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => ShapeParameters::default(),
    };

    if let Some(family) = args.family {
        params.family = family;
    }
    if let Some(v) = args.thickness {
        params.thickness_ratio = v;
    }
    if let Some(v) = args.camber {
        params.camber = v;
    }
    if let Some(v) = args.temperature {
        params.temperature = v;
    }
    if let Some(v) = args.smoothness {
        params.smoothness = v;
    }
    if let Some(v) = args.points {
        params.complexity = v;
    }
    if args.cosine {
        params.spacing = Spacing::Cosine;
    }

    Ok(params)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aeroshape_rs=info")),
        )
        .init();

    let args = Args::parse();
    let params = load_parameters(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut session = DesignSession::seeded(seed);

    let report = if args.blend {
        let references = embedded()?;
        let config = BlendConfig::from(&params.clamped().parameters);
        let blended = session.blend(&references, &config)?;
        let validation = validate_geometry(&blended.coordinates);

        let mut writer = BufWriter::new(File::create(&args.output)?);
        write_dat(&mut writer, &blended.coordinates, &[blended.name.as_str()])?;
        writer.flush()?;

        json!({
            "seed": seed,
            "name": blended.name,
            "sources": blended.sources,
            "weights": blended.weights,
            "usedFallback": blended.used_fallback,
            "validation": validation,
        })
    } else {
        let shape = if args.random {
            session.generate_random()?
        } else {
            session.generate(&params)?
        };
        let headers = shape.dat_headers();
        let headers: Vec<&str> = headers.iter().map(|h| h.as_str()).collect();

        let mut writer = BufWriter::new(File::create(&args.output)?);
        write_dat(&mut writer, &shape.coordinates, &headers)?;
        writer.flush()?;

        json!({
            "seed": seed,
            "name": shape.name,
            "family": shape.family,
            "parameters": shape.parameters,
            "latent": shape.latent_summary,
            "similarity": shape.similarity,
            "attempts": shape.attempts,
            "warnings": shape.warnings,
            "validation": shape.validation,
        })
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn params_file(name: &str, text: &str) -> PathBuf {
        let file_name = format!("aeroshape-{}-{}.json", name, std::process::id());
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_family_flag_overrides_file() {
        let path = params_file("override", r#"{"family": "selig", "camber": 0.03}"#);
        let file = path.to_str().unwrap();

        let args = Args::parse_from(["aeroshape", "--params", file, "--family", "naca4"]);
        let params = load_parameters(&args).unwrap();
        assert_eq!(AirfoilFamily::Naca4Digit, params.family);
        assert_eq!(0.03, params.camber);

        let args = Args::parse_from(["aeroshape", "--params", file]);
        assert_eq!(AirfoilFamily::Selig, load_parameters(&args).unwrap().family);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_defaults_without_file() {
        let args = Args::parse_from(["aeroshape", "--thickness", "0.1"]);
        let params = load_parameters(&args).unwrap();
        assert_eq!(AirfoilFamily::Naca4Digit, params.family);
        assert_eq!(0.1, params.thickness_ratio);
    }

    #[test]
    fn test_blend_and_random_conflict() {
        assert!(Args::try_parse_from(["aeroshape", "--blend", "--random"]).is_err());
    }
}
