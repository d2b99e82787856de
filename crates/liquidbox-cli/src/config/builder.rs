use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use liquidbox::engine::config::{BuildConfigBuilder, ConstraintConfig, PackingConfig};
use std::str::FromStr;

pub fn build_config(args: &BuildArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let file_config = apply_set_values(file_config, &args.set_values)?;
    let boxes_file = file_config.boxes.unwrap_or_default();
    let packing_file = file_config.packing.unwrap_or_default();
    let constraint_file = file_config.constraint.unwrap_or_default();

    let scale_liquid = args
        .scale_liquid
        .or(boxes_file.scale_liquid)
        .unwrap_or(defaults.scale_liquid);
    let scale_vapor = args
        .scale_vapor
        .or(boxes_file.scale_vapor)
        .unwrap_or(defaults.scale_vapor);
    let residue_name = args
        .residue_name
        .clone()
        .or(boxes_file.residue_name)
        .unwrap_or(defaults.residue_name);

    let fix_orientation = args.fix_orientation
        || packing_file
            .fix_orientation
            .unwrap_or(defaults.fix_orientation);
    let packing = PackingConfig {
        overlap: packing_file.overlap.unwrap_or(defaults.overlap),
        edge: packing_file.edge.unwrap_or(defaults.edge),
        seed: args.seed.or(packing_file.seed).unwrap_or(defaults.seed),
        max_attempts: packing_file.max_attempts.unwrap_or(defaults.max_attempts),
        fix_orientation,
    };

    let constrain = args.constrain || constraint_file.enabled.unwrap_or(defaults.constrain);
    let constraint = ConstraintConfig {
        tolerance: constraint_file.tolerance.unwrap_or(defaults.tolerance),
        max_iterations: constraint_file
            .max_iterations
            .unwrap_or(defaults.max_iterations),
    };

    let core_config = BuildConfigBuilder::new()
        .scale_liq_box(scale_liquid)
        .scale_vap_box(scale_vapor)
        .residue_name(residue_name)
        .fix_orientation(fix_orientation)
        .constrain(constrain)
        .packing(packing)
        .constraint(constraint)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        statepoint_path: args.statepoint.clone(),
        output_prefix: args.output.clone(),
        format: args.format,
        core_config,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "boxes.scale-liquid" => {
                config.boxes.get_or_insert_with(Default::default).scale_liquid =
                    Some(parse_value(key, value_str, "float")?);
            }
            "boxes.scale-vapor" => {
                config.boxes.get_or_insert_with(Default::default).scale_vapor =
                    Some(parse_value(key, value_str, "float")?);
            }
            "boxes.residue-name" => {
                config.boxes.get_or_insert_with(Default::default).residue_name =
                    Some(value_str.to_string());
            }
            "packing.overlap" => {
                config.packing.get_or_insert_with(Default::default).overlap =
                    Some(parse_value(key, value_str, "float")?);
            }
            "packing.edge" => {
                config.packing.get_or_insert_with(Default::default).edge =
                    Some(parse_value(key, value_str, "float")?);
            }
            "packing.seed" => {
                config.packing.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "packing.max-attempts" => {
                config.packing.get_or_insert_with(Default::default).max_attempts =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "packing.fix-orientation" => {
                config.packing.get_or_insert_with(Default::default).fix_orientation =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "constraint.enabled" => {
                config.constraint.get_or_insert_with(Default::default).enabled =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "constraint.tolerance" => {
                config.constraint.get_or_insert_with(Default::default).tolerance =
                    Some(parse_value(key, value_str, "float")?);
            }
            "constraint.max-iterations" => {
                config.constraint.get_or_insert_with(Default::default).max_iterations =
                    Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_build_args() -> BuildArgs {
        BuildArgs {
            statepoint: PathBuf::from("signac_statepoint.json"),
            output: PathBuf::from("out/box"),
            format: OutputFormat::Pdb,
            config: None,
            scale_liquid: None,
            scale_vapor: None,
            residue_name: None,
            seed: None,
            fix_orientation: false,
            constrain: false,
            set_values: vec![],
        }
    }

    #[test]
    fn build_config_uses_defaults_without_file() {
        let app = build_config(&base_build_args()).expect("build ok");
        let cfg = app.core_config;
        let defaults = DefaultsConfig::default();

        assert_eq!(cfg.scale_liq_box, defaults.scale_liquid);
        assert_eq!(cfg.scale_vap_box, defaults.scale_vapor);
        assert_eq!(cfg.residue_name, defaults.residue_name);
        assert_eq!(cfg.packing.seed, defaults.seed);
        assert_eq!(cfg.packing.max_attempts, defaults.max_attempts);
        assert!(!cfg.constrain);
        assert!(!cfg.fix_orientation);
        assert_eq!(cfg.constraint.max_iterations, defaults.max_iterations);
        assert_eq!(app.output_prefix, PathBuf::from("out/box"));
    }

    #[test]
    fn build_config_reads_file_and_merges() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        let toml = r#"
            [boxes]
            scale-liquid = 1.2
            scale-vapor = 2.0
            residue-name = "SOL"

            [packing]
            overlap = 0.22
            edge = 0.1
            seed = 42
            max-attempts = 2000
            fix-orientation = true

            [constraint]
            enabled = true
            tolerance = 1e-9
            max-iterations = 250
            "#;
        fs::write(&cfg_path, toml).unwrap();

        let mut args = base_build_args();
        args.config = Some(cfg_path);

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.scale_liq_box, 1.2);
        assert_eq!(cfg.scale_vap_box, 2.0);
        assert_eq!(cfg.residue_name, "SOL");
        assert_eq!(cfg.packing.overlap, 0.22);
        assert_eq!(cfg.packing.edge, 0.1);
        assert_eq!(cfg.packing.seed, 42);
        assert_eq!(cfg.packing.max_attempts, 2000);
        assert!(cfg.fix_orientation);
        assert!(cfg.packing.fix_orientation);
        assert!(cfg.constrain);
        assert_eq!(cfg.constraint.tolerance, 1e-9);
        assert_eq!(cfg.constraint.max_iterations, 250);
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(
            &cfg_path,
            "[boxes]\nscale-liquid = 1.2\n[packing]\nseed = 42\n",
        )
        .unwrap();

        let mut args = base_build_args();
        args.config = Some(cfg_path);
        args.scale_liquid = Some(1.5);
        args.seed = Some(7);
        args.constrain = true;

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.scale_liq_box, 1.5);
        assert_eq!(cfg.packing.seed, 7);
        assert!(cfg.constrain);
    }

    #[test]
    fn set_values_override_file() {
        let mut args = base_build_args();
        args.set_values = vec![
            "packing.overlap=0.3".to_string(),
            "packing.max-attempts=77".to_string(),
            "boxes.residue-name=HOH".to_string(),
            "constraint.enabled=true".to_string(),
            "constraint.tolerance=1e-6".to_string(),
        ];

        let cfg = build_config(&args).expect("build ok").core_config;
        assert!((cfg.packing.overlap - 0.3).abs() < 1e-12);
        assert_eq!(cfg.packing.max_attempts, 77);
        assert_eq!(cfg.residue_name, "HOH");
        assert!(cfg.constrain);
        assert!((cfg.constraint.tolerance - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let mut args = base_build_args();
        args.set_values = vec!["packing.overlap".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["packing.unknown=1".to_string()];
        let err = build_config(&args).unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration key"));

        args.set_values = vec!["packing.seed=abc".to_string()];
        let err = build_config(&args).unwrap_err();
        assert!(err.to_string().contains("Invalid integer value"));
    }

    #[test]
    fn invalid_values_are_reported_as_config_errors() {
        let mut args = base_build_args();
        args.set_values = vec!["packing.overlap=-1.0".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }
}
